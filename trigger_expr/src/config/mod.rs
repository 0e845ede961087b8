//! Configuration module for the trigger expression validator
//! Automatically uses generated constants from TOML configuration

// Include generated constants from build.rs
// This file is generated at compile time from the TOML configuration
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("TRIGGER_EXPR_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("TRIGGER_EXPR_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::scanner::MAX_EXPRESSION_LENGTH > 0);
        assert!(compile_time::scanner::MAX_REFERENCES > 0);
        assert!(compile_time::scanner::MAX_ITEM_KEY_NESTING_DEPTH > 0);
        assert!(compile_time::grammar::MAX_REDUCTION_PASSES > 0);
        assert!(compile_time::semantic::MAX_SEMANTIC_ERRORS > 0);
        assert!(compile_time::logging::SECURITY_MIN_LOG_LEVEL <= 2);
    }

    #[test]
    fn test_source_info_names_profile() {
        assert!(super::build_info::source_info().contains(super::build_info::profile()));
    }
}
