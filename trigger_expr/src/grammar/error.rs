use crate::config::compile_time::grammar::MAX_REDUCTION_PASSES;
use crate::logging::codes;

/// Grammar reduction failures. They carry no position: the reducer works on a
/// rewritten copy of the expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("Incorrect trigger expression format")]
    IncorrectFormat { residual: char },

    #[error("Incorrect trigger expression. Empty parentheses")]
    EmptyGroup,

    #[error("Incorrect trigger expression. Missing operator between expressions")]
    MissingOperator,

    #[error("Incorrect usage of expression logic linking symbol \"{operator}\"")]
    StrayOperator { operator: char },

    #[error("Incorrect usage of expression logic linking symbols")]
    LinkageMismatch {
        expressions: usize,
        operators: usize,
    },

    #[error("Expression too complex to reduce (max {MAX_REDUCTION_PASSES} passes)")]
    ReductionLimitExceeded,
}

impl GrammarError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            GrammarError::IncorrectFormat { .. } => codes::grammar::INCORRECT_FORMAT,
            GrammarError::EmptyGroup => codes::grammar::EMPTY_GROUP,
            GrammarError::MissingOperator => codes::grammar::MISSING_OPERATOR,
            GrammarError::StrayOperator { .. } => codes::grammar::STRAY_OPERATOR,
            GrammarError::LinkageMismatch { .. } => codes::grammar::LINKAGE_MISMATCH,
            GrammarError::ReductionLimitExceeded => codes::grammar::REDUCTION_LIMIT_EXCEEDED,
        }
    }
}
