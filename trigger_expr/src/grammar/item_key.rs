//! Item key grammar: `name` followed by zero or more `[param, ...]` lists
//!
//! A parameter is empty, a quoted string (`\"` and `\\` escapes), an unquoted
//! string, or a nested bracketed array of parameters.

use crate::config::compile_time::scanner::MAX_ITEM_KEY_NESTING_DEPTH;
use serde::Serialize;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemKeyParam {
    Text(String),
    Array(Vec<ItemKeyParam>),
}

impl ItemKeyParam {
    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ItemKeyParam::Text(text) => out.push(text),
            ItemKeyParam::Array(items) => {
                for item in items {
                    item.collect_texts(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemKeyAst {
    pub name: String,
    pub parameters: Vec<ItemKeyParam>,
}

impl ItemKeyAst {
    /// Every text parameter, depth first, with arrays flattened
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for parameter in &self.parameters {
            parameter.collect_texts(&mut out);
        }
        out
    }
}

/// Parses an item key, returning its parameter tree or a reason it is invalid
pub trait ItemKeyGrammar: Send + Sync {
    fn parse(&self, key: &str) -> Result<ItemKeyAst, String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardItemKeyGrammar;

impl ItemKeyGrammar for StandardItemKeyGrammar {
    fn parse(&self, key: &str) -> Result<ItemKeyAst, String> {
        let mut chars = key.chars().peekable();

        let mut name = String::new();
        while let Some(&ch) = chars.peek() {
            if ch == '[' {
                break;
            }
            if !is_key_name_char(ch) {
                return Err(format!("incorrect character \"{}\" in key name", ch));
            }
            name.push(ch);
            chars.next();
        }
        if name.is_empty() {
            return Err("key name is empty".to_string());
        }

        let mut parameters = Vec::new();
        while let Some(&ch) = chars.peek() {
            if ch != '[' {
                return Err(format!("unexpected \"{}\" after parameters", ch));
            }
            parameters.extend(parse_list(&mut chars, 1)?);
        }

        Ok(ItemKeyAst { name, parameters })
    }
}

fn is_key_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | ' ' | '-')
}

fn skip_spaces(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek() == Some(&' ') {
        chars.next();
    }
}

/// Parse `[p1, p2, ...]`; the iterator is positioned on the opening bracket
fn parse_list(chars: &mut Peekable<Chars<'_>>, depth: usize) -> Result<Vec<ItemKeyParam>, String> {
    if depth > MAX_ITEM_KEY_NESTING_DEPTH {
        return Err("parameters nested too deeply".to_string());
    }
    chars.next();

    let mut params = Vec::new();
    loop {
        skip_spaces(chars);
        params.push(parse_param(chars, depth)?);
        skip_spaces(chars);
        match chars.next() {
            Some(',') => continue,
            Some(']') => return Ok(params),
            Some(ch) => return Err(format!("unexpected \"{}\" in parameters", ch)),
            None => return Err("unterminated parameter list".to_string()),
        }
    }
}

fn parse_param(chars: &mut Peekable<Chars<'_>>, depth: usize) -> Result<ItemKeyParam, String> {
    match chars.peek() {
        Some('"') => {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some('\\') if matches!(chars.peek(), Some('"') | Some('\\')) => {
                        if let Some(escaped) = chars.next() {
                            text.push(escaped);
                        }
                    }
                    Some('"') => return Ok(ItemKeyParam::Text(text)),
                    Some(ch) => text.push(ch),
                    None => return Err("unterminated quoted parameter".to_string()),
                }
            }
        }
        Some('[') => parse_list(chars, depth + 1).map(ItemKeyParam::Array),
        Some(',') | Some(']') | None => Ok(ItemKeyParam::Text(String::new())),
        Some(_) => {
            let mut text = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == ',' || ch == ']' {
                    break;
                }
                text.push(ch);
                chars.next();
            }
            Ok(ItemKeyParam::Text(text.trim_end().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ItemKeyParam {
        ItemKeyParam::Text(s.to_string())
    }

    #[test]
    fn test_plain_key() {
        let ast = StandardItemKeyGrammar.parse("agent.ping").unwrap();
        assert_eq!(ast.name, "agent.ping");
        assert!(ast.parameters.is_empty());
    }

    #[test]
    fn test_parameters() {
        let ast = StandardItemKeyGrammar
            .parse(r#"vfs.fs.size[/, "p\"free" ,,[a, "b]"]]"#)
            .unwrap();
        assert_eq!(ast.name, "vfs.fs.size");
        assert_eq!(
            ast.parameters,
            vec![
                text("/"),
                text("p\"free"),
                text(""),
                ItemKeyParam::Array(vec![text("a"), text("b]")]),
            ]
        );
        assert_eq!(ast.texts(), vec!["/", "p\"free", "", "a", "b]"]);
    }

    #[test]
    fn test_multiple_lists_and_empty_list() {
        let ast = StandardItemKeyGrammar.parse("key[a][b,c]").unwrap();
        assert_eq!(ast.texts(), vec!["a", "b", "c"]);

        let ast = StandardItemKeyGrammar.parse("key[]").unwrap();
        assert_eq!(ast.parameters, vec![text("")]);
    }

    #[test]
    fn test_invalid_keys() {
        assert!(StandardItemKeyGrammar.parse("").is_err());
        assert!(StandardItemKeyGrammar.parse("[a]").is_err());
        assert!(StandardItemKeyGrammar.parse("key:1").is_err());
        assert!(StandardItemKeyGrammar.parse("key[a").is_err());
        assert!(StandardItemKeyGrammar.parse(r#"key["a"b]"#).is_err());
        assert!(StandardItemKeyGrammar.parse("key[a]x").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_ITEM_KEY_NESTING_DEPTH + 1;
        let key = format!("key{}{}", "[".repeat(depth), "]".repeat(depth));
        assert!(StandardItemKeyGrammar.parse(&key).is_err());
    }
}
