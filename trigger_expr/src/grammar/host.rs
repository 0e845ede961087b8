use super::cached_regex;
use regex::Regex;
use std::sync::OnceLock;

/// Decides whether a host name is well formed
pub trait HostNameGrammar: Send + Sync {
    fn validate(&self, host: &str) -> bool;
}

/// Letters, digits, spaces, `.`, `_` and `-`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHostNameGrammar;

static HOST_NAME: OnceLock<Regex> = OnceLock::new();

impl HostNameGrammar for StandardHostNameGrammar {
    fn validate(&self, host: &str) -> bool {
        cached_regex(&HOST_NAME, r"^[0-9a-zA-Z_. \-]+$").is_match(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_names() {
        let grammar = StandardHostNameGrammar;
        assert!(grammar.validate("srv1"));
        assert!(grammar.validate("Zabbix server"));
        assert!(grammar.validate("web-01.example_net"));
        assert!(!grammar.validate(""));
        assert!(!grammar.validate("srv:1"));
        assert!(!grammar.validate("{$HOST}"));
    }
}
