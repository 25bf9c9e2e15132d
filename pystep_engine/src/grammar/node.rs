//! Syntax tree nodes
//!
//! Nodes own their children; the engine addresses in-flight nodes by
//! index paths from the root so that suspended derivations never hold
//! references into the tree.

use serde::Serialize;

/// Node attributes. Terminal leaves carry the consumed lexeme; structural
/// nodes that gate indentation carry the block threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
}

impl NodeAttrs {
    pub fn lexval(lexeme: impl Into<String>) -> Self {
        Self {
            lexval: Some(lexeme.into()),
            indent: None,
        }
    }

    pub fn indent(indent: usize) -> Self {
        Self {
            lexval: None,
            indent: Some(indent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
    pub attributes: NodeAttrs,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>, attributes: NodeAttrs) -> Self {
        Self {
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Terminal leaf with the consumed lexeme.
    pub fn leaf(name: impl Into<String>, lexeme: impl Into<String>) -> Self {
        Self::new(name, NodeAttrs::lexval(lexeme))
    }

    /// Append a child, returning its index.
    pub fn push_child(&mut self, child: Node) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    /// Resolve an index path relative to this node.
    pub fn get(&self, path: &[usize]) -> Option<&Node> {
        let mut node = self;
        for &index in path {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// Resolve an index path relative to this node, mutably.
    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for &index in path {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Total node count, this node included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_addressing() {
        let mut root = Node::new("START", NodeAttrs::indent(0));
        let statement = root.push_child(Node::new("STATEMENT", NodeAttrs::indent(0)));
        let simple = root.children[statement].push_child(Node::new("SIMPLE", NodeAttrs::default()));
        root.children[statement].children[simple].push_child(Node::leaf("identifier", "x"));

        let leaf = root.get(&[statement, simple, 0]).unwrap();
        assert_eq!(leaf.name, "identifier");
        assert_eq!(leaf.attributes.lexval.as_deref(), Some("x"));

        assert!(root.get(&[5]).is_none());
        assert_eq!(root.size(), 4);
    }

    #[test]
    fn test_empty_attributes_serialize_to_empty_object() {
        let node = Node::new("SIMPLE", NodeAttrs::default());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["attributes"], serde_json::json!({}));
    }

    #[test]
    fn test_leaf_serialization() {
        let node = Node::leaf("int", "42");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["attributes"]["lexval"], "42");
        assert_eq!(json["children"], serde_json::json!([]));
    }
}
