use crate::diagnostics::{Diagnostic, ValidationFailure};
use crate::grammar::GrammarError;
use crate::logging::{codes, Code};
use crate::scanner::ScanError;
use crate::semantic::SemanticError;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scanning failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Grammar reduction failed: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Semantic validation failed with {} error(s)", .errors.len())]
    Semantic { errors: Vec<SemanticError> },

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Too many expressions in batch: {count} (max {max})")]
    TooManyExpressions { count: usize, max: usize },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::Scan(error) => error.error_code(),
            PipelineError::Grammar(error) => error.error_code(),
            PipelineError::Semantic { errors } => errors
                .first()
                .map_or(codes::system::INTERNAL_ERROR, SemanticError::error_code),
            PipelineError::FileRead { .. } => codes::input::FILE_READ_ERROR,
            PipelineError::TooManyExpressions { .. } => codes::input::TOO_MANY_EXPRESSIONS,
            PipelineError::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Render as the diagnostics reported for `expression`
    pub fn to_failure(&self, expression: &str) -> ValidationFailure {
        match self {
            PipelineError::Scan(error) => ValidationFailure::single(expression, error.into()),
            PipelineError::Grammar(error) => ValidationFailure::single(expression, error.into()),
            PipelineError::Semantic { errors } => ValidationFailure::from_semantic(expression, errors),
            other => ValidationFailure::single(
                expression,
                Diagnostic::new(other.error_code(), other.to_string(), None),
            ),
        }
    }
}
