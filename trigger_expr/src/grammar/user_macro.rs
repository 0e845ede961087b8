//! User macro grammar: `{$NAME}` or `{$NAME:context}`
//!
//! The context is either a quoted string or unquoted text; unquoted text may
//! itself hold further user macros.

use super::cached_regex;
use crate::scanner::unquote_param;
use regex::Regex;
use std::sync::OnceLock;

pub trait UserMacroGrammar: Send + Sync {
    fn validate(&self, text: &str) -> bool;
    fn parse_context(&self, text: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardUserMacroGrammar;

static MACRO_NAME: OnceLock<Regex> = OnceLock::new();
static EMBEDDED_MACRO: OnceLock<Regex> = OnceLock::new();

impl UserMacroGrammar for StandardUserMacroGrammar {
    fn validate(&self, text: &str) -> bool {
        let Some(inner) = strip_delimiters(text) else {
            return false;
        };
        let (name, context) = match inner.split_once(':') {
            Some((name, context)) => (name, Some(context)),
            None => (inner, None),
        };

        if !cached_regex(&MACRO_NAME, r"^[A-Z0-9_.]+$").is_match(name) {
            return false;
        }
        match context {
            None => true,
            Some(context) => self.validate_context(context),
        }
    }

    fn parse_context(&self, text: &str) -> Option<String> {
        split_user_macro(text).1
    }
}

impl StandardUserMacroGrammar {
    fn validate_context(&self, context: &str) -> bool {
        let context = context.trim_start();
        if let Some(quoted) = context.strip_prefix('"') {
            return match closing_quote(quoted) {
                Some(end) => quoted[end + 1..].trim().is_empty(),
                None => false,
            };
        }

        // Unquoted: braces are only allowed as part of nested user macros
        let mut rest = String::with_capacity(context.len());
        let mut last = 0;
        for found in find_user_macros(context) {
            if !self.validate(found.as_str()) {
                return false;
            }
            rest.push_str(&context[last..found.start()]);
            last = found.end();
        }
        rest.push_str(&context[last..]);
        !rest.contains(['{', '}', '"'])
    }
}

fn strip_delimiters(text: &str) -> Option<&str> {
    text.strip_prefix("{$").and_then(|t| t.strip_suffix('}'))
}

/// Byte index of the unescaped closing quote in the text after an opening quote
fn closing_quote(quoted: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, ch) in quoted.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(index),
            _ => {}
        }
    }
    None
}

/// Split `{$NAME:context}` into its name and unquoted context
pub fn split_user_macro(text: &str) -> (String, Option<String>) {
    let inner = strip_delimiters(text).unwrap_or(text);
    match inner.split_once(':') {
        Some((name, context)) => (name.to_string(), Some(unquote_param(context))),
        None => (inner.to_string(), None),
    }
}

/// Innermost `{$...}` occurrences in free text, in order
pub fn find_user_macros(text: &str) -> Vec<regex::Match<'_>> {
    cached_regex(&EMBEDDED_MACRO, r"\{\$[^{}]*\}")
        .find_iter(text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_macros() {
        let grammar = StandardUserMacroGrammar;
        assert!(grammar.validate("{$TIME_WINDOW}"));
        assert!(grammar.validate("{$LIMIT.HIGH:eth0}"));
        assert!(grammar.validate(r#"{$LIMIT:"a:b \"c\""}"#));
        assert!(grammar.validate("{$LIMIT:}"));
        assert!(grammar.validate("{$LIMIT:{$IFACE}}"));
    }

    #[test]
    fn test_invalid_macros() {
        let grammar = StandardUserMacroGrammar;
        assert!(!grammar.validate("{$}"));
        assert!(!grammar.validate("{$lower}"));
        assert!(!grammar.validate("{TRIGGER.VALUE}"));
        assert!(!grammar.validate("{$A"));
        assert!(!grammar.validate(r#"{$A:"open}"#));
        assert!(!grammar.validate(r#"{$A:"x"y}"#));
        assert!(!grammar.validate("{$A:{$bad}}"));
        assert!(!grammar.validate("{$A:x}y}"));
    }

    #[test]
    fn test_context_parsing() {
        let grammar = StandardUserMacroGrammar;
        assert_eq!(grammar.parse_context("{$A}"), None);
        assert_eq!(grammar.parse_context("{$A:eth0}"), Some("eth0".to_string()));
        assert_eq!(
            grammar.parse_context(r#"{$A:"x:y"}"#),
            Some("x:y".to_string())
        );
        assert_eq!(
            split_user_macro("{$A:{$B}}"),
            ("A".to_string(), Some("{$B}".to_string()))
        );
    }

    #[test]
    fn test_find_user_macros() {
        let found: Vec<&str> = find_user_macros("a{$X}b{$Y:1}{c}")
            .iter()
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["{$X}", "{$Y:1}"]);
        assert!(find_user_macros("no macros").is_empty());
    }
}
