//! Configuration module for logging
//!
//! Runtime preferences come from environment variables and are cached on
//! first read; buffer limits are compile-time constants and cannot be
//! modified at runtime.

use crate::config::constants::compile_time::logging::*;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

/// Environment variable selecting the minimum log level
/// (`error`, `warn`, `info`, `debug`)
pub const LOG_LEVEL_ENV: &str = "PYSTEP_LOG";

/// Environment variable enabling JSON output (`1` or `true`)
pub const LOG_JSON_ENV: &str = "PYSTEP_LOG_JSON";

static MIN_LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();
static STRUCTURED: OnceLock<bool> = OnceLock::new();

fn parse_level(value: &str) -> Option<LogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warning),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Get minimum log level (environment preference, cached on first read)
pub fn get_min_log_level() -> LogLevel {
    *MIN_LOG_LEVEL.get_or_init(|| {
        std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|value| parse_level(&value))
            .unwrap_or(LogLevel::Warning)
    })
}

/// Check if structured (JSON) logging is enabled
pub fn use_structured_logging() -> bool {
    *STRUCTURED.get_or_init(|| {
        std::env::var(LOG_JSON_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// Get error buffer size (compile-time constant)
pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Get maximum log message length (compile-time constant)
pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Validate current configuration settings
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE > 100_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }

    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_MESSAGE_LENGTH == 0 {
        return Err("Max log message length must be non-zero".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_buffer_limits_accessible() {
        assert!(get_error_buffer_size() > 0);
        assert!(get_max_log_message_length() > 0);
    }
}
