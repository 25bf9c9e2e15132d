pub mod compile_time {
    pub mod file_processing {
        /// Maximum source size allowed for processing (1MB)
        /// SECURITY: Prevents DoS via enormous input files
        pub const MAX_SOURCE_LENGTH: u64 = 1024 * 1024;

        /// Threshold for considering a source "large" (64KB)
        /// PERFORMANCE: Large sources are flagged in diagnostics
        pub const LARGE_SOURCE_THRESHOLD: u64 = 64 * 1024;
    }

    pub mod lexical {
        /// Maximum number of tokens produced from a single source
        /// SECURITY: Prevents DoS via token explosion
        pub const MAX_TOKEN_COUNT: usize = 1_000_000;
    }

    pub mod syntax {
        /// Columns each nested block adds to the indentation threshold
        pub const INDENT_STEP: usize = 4;

        /// Token lookahead limit for parsing decisions
        /// PERFORMANCE: Dispatch never examines more than this many tokens
        pub const MAX_LOOKAHEAD_TOKENS: usize = 2;

        /// Maximum continuation depth to prevent unbounded growth
        /// SECURITY: Statement chains and operator chains grow the
        /// continuation linearly, so the bound is generous
        pub const MAX_STACK_DEPTH: usize = 10_000;
    }

    pub mod logging {
        /// Log buffer size for in-memory capture
        /// RESOURCE: Controls memory usage for logging
        pub const LOG_BUFFER_SIZE: usize = 1_000;

        /// Maximum log message length
        /// RESOURCE: Prevents memory attacks via huge messages
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;
    }
}

/// Cross-checks the compile-time limits for internal consistency.
pub fn validate() -> Result<(), String> {
    use compile_time::*;

    if file_processing::LARGE_SOURCE_THRESHOLD >= file_processing::MAX_SOURCE_LENGTH {
        return Err("LARGE_SOURCE_THRESHOLD must be below MAX_SOURCE_LENGTH".to_string());
    }
    if lexical::MAX_TOKEN_COUNT == 0 {
        return Err("MAX_TOKEN_COUNT must be positive".to_string());
    }
    if syntax::INDENT_STEP == 0 {
        return Err("INDENT_STEP must be positive".to_string());
    }
    if syntax::MAX_LOOKAHEAD_TOKENS < 2 {
        return Err("dispatch peeks up to two tokens ahead".to_string());
    }
    if syntax::MAX_STACK_DEPTH < 100 {
        return Err("MAX_STACK_DEPTH too small for nested statements".to_string());
    }
    if logging::LOG_BUFFER_SIZE == 0 || logging::MAX_LOG_MESSAGE_LENGTH == 0 {
        return Err("logging limits must be positive".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_consistent() {
        assert!(validate().is_ok());
    }
}
