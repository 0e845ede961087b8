use crate::config::compile_time::scanner::*;
use crate::logging::codes;

/// Scanner failures. All of them are fatal to the validation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("Expression cannot be empty")]
    EmptyExpression,

    #[error("Expression too long: {length} bytes (max {MAX_EXPRESSION_LENGTH})")]
    ExpressionTooLong { length: usize },

    #[error("Incorrect trigger expression. Expression cannot start with \"{character}\"")]
    InvalidLeadingCharacter { character: char, byte_offset: usize },

    #[error("Incorrect trigger expression. Unexpected closing parenthesis")]
    UnmatchedClosingParenthesis { byte_offset: usize },

    #[error("Incorrect trigger expression. Unexpected closing brace")]
    UnmatchedClosingBrace { byte_offset: usize },

    #[error("Incorrect trigger expression. Missing closing parenthesis")]
    UnclosedParenthesis { byte_offset: usize },

    #[error("Incorrect trigger expression. Missing closing brace")]
    MissingClosingBrace { byte_offset: usize },

    #[error("Incorrect trigger expression. Incorrect usage of operator \"{operator}\"")]
    AdjacentOperators { operator: char, byte_offset: usize },

    #[error("Incorrect item parameters syntax")]
    IncorrectItemParameters { byte_offset: usize },

    #[error("Incorrect function parameters syntax")]
    IncorrectFunctionParameters { byte_offset: usize },

    #[error("Incorrect trigger expression. Missing function name")]
    MissingFunction { byte_offset: usize },

    #[error("Incorrect trigger expression. Unexpected symbol \"{symbol}\"")]
    UnexpectedSymbol { symbol: char, byte_offset: usize },

    #[error("Incorrect trigger expression. Unexpected symbols after function call")]
    SymbolsAfterFunction { byte_offset: usize },

    #[error("Too many references in expression (max {MAX_REFERENCES})")]
    TooManyReferences { byte_offset: usize },

    #[error("Too many parameters in reference (max {MAX_PARAMETERS_PER_REFERENCE})")]
    TooManyParameters { byte_offset: usize },

    #[error("Item key parameters nested too deeply (max {MAX_ITEM_KEY_NESTING_DEPTH})")]
    NestingTooDeep { byte_offset: usize },
}

impl ScanError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ScanError::EmptyExpression => codes::input::EMPTY_EXPRESSION,
            ScanError::ExpressionTooLong { .. } => codes::input::EXPRESSION_TOO_LONG,
            ScanError::InvalidLeadingCharacter { .. } => codes::input::INVALID_LEADING_CHARACTER,
            ScanError::UnmatchedClosingParenthesis { .. } => {
                codes::scanner::UNMATCHED_CLOSING_PARENTHESIS
            }
            ScanError::UnmatchedClosingBrace { .. } => codes::scanner::UNMATCHED_CLOSING_BRACE,
            ScanError::UnclosedParenthesis { .. } => codes::scanner::UNCLOSED_PARENTHESIS,
            ScanError::MissingClosingBrace { .. } => codes::scanner::MISSING_CLOSING_BRACE,
            ScanError::AdjacentOperators { .. } => codes::scanner::ADJACENT_OPERATORS,
            ScanError::IncorrectItemParameters { .. } => codes::scanner::INCORRECT_ITEM_PARAMETERS,
            ScanError::IncorrectFunctionParameters { .. } => {
                codes::scanner::INCORRECT_FUNCTION_PARAMETERS
            }
            ScanError::MissingFunction { .. } => codes::scanner::MISSING_FUNCTION,
            ScanError::UnexpectedSymbol { .. } => codes::scanner::UNEXPECTED_SYMBOL,
            ScanError::SymbolsAfterFunction { .. } => codes::scanner::SYMBOLS_AFTER_FUNCTION,
            ScanError::TooManyReferences { .. } => codes::scanner::TOO_MANY_REFERENCES,
            ScanError::TooManyParameters { .. } => codes::scanner::TOO_MANY_PARAMETERS,
            ScanError::NestingTooDeep { .. } => codes::scanner::NESTING_TOO_DEEP,
        }
    }

    /// Byte offset of the character that failed the scan, when there is one
    pub fn byte_offset(&self) -> Option<usize> {
        match self {
            ScanError::EmptyExpression | ScanError::ExpressionTooLong { .. } => None,
            ScanError::InvalidLeadingCharacter { byte_offset, .. }
            | ScanError::UnmatchedClosingParenthesis { byte_offset }
            | ScanError::UnmatchedClosingBrace { byte_offset }
            | ScanError::UnclosedParenthesis { byte_offset }
            | ScanError::MissingClosingBrace { byte_offset }
            | ScanError::AdjacentOperators { byte_offset, .. }
            | ScanError::IncorrectItemParameters { byte_offset }
            | ScanError::IncorrectFunctionParameters { byte_offset }
            | ScanError::MissingFunction { byte_offset }
            | ScanError::UnexpectedSymbol { byte_offset, .. }
            | ScanError::SymbolsAfterFunction { byte_offset }
            | ScanError::TooManyReferences { byte_offset }
            | ScanError::TooManyParameters { byte_offset }
            | ScanError::NestingTooDeep { byte_offset } => Some(*byte_offset),
        }
    }
}
