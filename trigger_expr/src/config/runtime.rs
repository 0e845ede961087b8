// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerPreferences {
    /// Whether to count linkage operator usage per symbol
    pub track_operator_usage: bool,

    /// Whether to log every completed reference at debug level
    pub log_reference_details: bool,
}

impl Default for ScannerPreferences {
    fn default() -> Self {
        Self {
            track_operator_usage: env_flag(env_vars::SCANNER_TRACK_OPERATORS, false),
            log_reference_details: env_flag(env_vars::SCANNER_LOG_REFERENCES, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticPreferences {
    /// Whether user macros embedded in item/function parameters are collected
    pub collect_embedded_user_macros: bool,

    /// Whether to log each reference check at debug level
    pub log_validation_details: bool,
}

impl Default for SemanticPreferences {
    fn default() -> Self {
        Self {
            collect_embedded_user_macros: env_flag(env_vars::SEMANTIC_COLLECT_USER_MACROS, true),
            log_validation_details: env_flag(env_vars::SEMANTIC_LOG_DETAILS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether failures are always reported at warning level or higher
    pub log_security_metrics: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_security_metrics: env_flag(env_vars::LOGGING_LOG_SECURITY, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub scanner: ScannerPreferences,
    pub semantic: SemanticPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Scanner
    pub const SCANNER_TRACK_OPERATORS: &str = "TRIGGER_EXPR_SCANNER_TRACK_OPERATORS";
    pub const SCANNER_LOG_REFERENCES: &str = "TRIGGER_EXPR_SCANNER_LOG_REFERENCES";

    // Semantic
    pub const SEMANTIC_COLLECT_USER_MACROS: &str = "TRIGGER_EXPR_SEMANTIC_COLLECT_USER_MACROS";
    pub const SEMANTIC_LOG_DETAILS: &str = "TRIGGER_EXPR_SEMANTIC_LOG_DETAILS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "TRIGGER_EXPR_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "TRIGGER_EXPR_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "TRIGGER_EXPR_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_SECURITY: &str = "TRIGGER_EXPR_LOGGING_LOG_SECURITY";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_preferences_roundtrip_through_json() {
        let config = RuntimeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            restored.semantic.collect_embedded_user_macros,
            config.semantic.collect_embedded_user_macros
        );
        assert_eq!(restored.logging.min_log_level, config.logging.min_log_level);
    }
}
