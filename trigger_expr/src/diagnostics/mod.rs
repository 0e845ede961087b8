//! Human-readable diagnostics and the legacy "check expression part" pointer

use crate::config::compile_time::semantic::{MAX_ERROR_MESSAGE_LENGTH, MAX_SEMANTIC_ERRORS};
use crate::grammar::GrammarError;
use crate::logging::Code;
use crate::scanner::ScanError;
use crate::semantic::SemanticError;
use serde::Serialize;
use std::fmt;

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: Code,
    pub message: String,
    /// Byte offset into the expression, when known
    pub offset: Option<usize>,
}

impl Diagnostic {
    pub fn new(code: Code, message: impl Into<String>, offset: Option<usize>) -> Self {
        Self {
            code,
            message: truncate_message(message.into()),
            offset,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&ScanError> for Diagnostic {
    fn from(error: &ScanError) -> Self {
        Self::new(error.error_code(), error.to_string(), error.byte_offset())
    }
}

impl From<&GrammarError> for Diagnostic {
    fn from(error: &GrammarError) -> Self {
        Self::new(error.error_code(), error.to_string(), None)
    }
}

impl From<&SemanticError> for Diagnostic {
    fn from(error: &SemanticError) -> Self {
        Self::new(error.error_code(), error.to_string(), error.byte_offset())
    }
}

/// A failed validation: the diagnostics in order plus the pointer line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub diagnostics: Vec<Diagnostic>,
    pub pointer: String,
}

impl ValidationFailure {
    /// Failure with a single positional diagnostic
    pub fn single(expression: &str, diagnostic: Diagnostic) -> Self {
        let pointer = pointer(expression, diagnostic.offset);
        Self {
            diagnostics: vec![diagnostic],
            pointer,
        }
    }

    /// Failure from accumulated semantic errors, pointing at the first one
    /// that has a position
    pub fn from_semantic(expression: &str, errors: &[SemanticError]) -> Self {
        let offset = errors.iter().find_map(SemanticError::byte_offset);
        Self {
            diagnostics: errors
                .iter()
                .take(MAX_SEMANTIC_ERRORS)
                .map(Diagnostic::from)
                .collect(),
            pointer: pointer(expression, offset),
        }
    }

    pub fn first_code(&self) -> Option<Code> {
        self.diagnostics.first().map(|d| d.code)
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Legacy form: every message, then the pointer line
    pub fn to_messages(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|d| d.message.clone())
            .chain(std::iter::once(self.pointer.clone()))
            .collect()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_messages().join("\n"))
    }
}

impl std::error::Error for ValidationFailure {}

/// Build the `Check expression part starting from: "..."` line.
///
/// With an offset the quoted part starts one character before it (or at the
/// start for offset 0). Without one it starts at the first newline, if any.
pub fn pointer(expression: &str, offset: Option<usize>) -> String {
    let start = match offset {
        Some(0) => 0,
        Some(offset) => previous_char_boundary(expression, offset),
        None => expression.find('\n').unwrap_or(0),
    };
    truncate_message(format!(
        "Check expression part starting from: \"{}\"",
        &expression[start..]
    ))
}

fn previous_char_boundary(text: &str, offset: usize) -> usize {
    let mut index = offset.min(text.len()).saturating_sub(1);
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn truncate_message(message: String) -> String {
    if message.len() <= MAX_ERROR_MESSAGE_LENGTH {
        return message;
    }
    let mut end = MAX_ERROR_MESSAGE_LENGTH.saturating_sub(3);
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_pointer_offsets() {
        let expression = "{srv1:agent.ping.last(0)}==1";
        assert_eq!(
            pointer(expression, Some(26)),
            "Check expression part starting from: \"==1\""
        );
        assert_eq!(
            pointer(expression, Some(0)),
            format!("Check expression part starting from: \"{}\"", expression)
        );
        assert_eq!(
            pointer(expression, Some(1)),
            format!("Check expression part starting from: \"{}\"", expression)
        );
    }

    #[test]
    fn test_pointer_without_offset() {
        assert_eq!(
            pointer("{a:b.c()}\n+1", None),
            "Check expression part starting from: \"\n+1\""
        );
        assert_eq!(
            pointer("1 1", None),
            "Check expression part starting from: \"1 1\""
        );
    }

    #[test]
    fn test_pointer_respects_char_boundaries() {
        let expression = "{hé:a.last(0)}";
        // offset 4 is just after the two-byte 'é'
        assert_eq!(
            pointer(expression, Some(4)),
            "Check expression part starting from: \"é:a.last(0)}\""
        );
        assert_eq!(
            pointer("ab", Some(10)),
            "Check expression part starting from: \"b\""
        );
    }

    #[test]
    fn test_failure_messages_end_with_pointer() {
        let error = ScanError::EmptyExpression;
        let failure = ValidationFailure::single("", Diagnostic::from(&error));
        let messages = failure.to_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "Expression cannot be empty");
        assert!(messages[1].starts_with("Check expression part starting from"));
        assert_eq!(failure.first_code(), Some(codes::input::EMPTY_EXPRESSION));
    }

    #[test]
    fn test_semantic_failure_points_at_first_positioned_error() {
        let errors = vec![
            SemanticError::EmptyHost { byte_offset: 6 },
            SemanticError::MissingHostItemReference,
        ];
        let failure = ValidationFailure::from_semantic("1+1 + {:a.last(0)}", &errors);
        assert_eq!(failure.diagnostics.len(), 2);
        assert!(failure.has_code(codes::semantic::MISSING_HOST_ITEM_REFERENCE));
        assert_eq!(
            failure.pointer,
            "Check expression part starting from: \" {:a.last(0)}\""
        );
        assert_eq!(failure.to_string().lines().count(), 3);
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let diagnostic = Diagnostic::new(
            codes::system::INTERNAL_ERROR,
            "x".repeat(MAX_ERROR_MESSAGE_LENGTH * 2),
            None,
        );
        assert_eq!(diagnostic.message.len(), MAX_ERROR_MESSAGE_LENGTH);
        assert!(diagnostic.message.ends_with("..."));
    }
}
