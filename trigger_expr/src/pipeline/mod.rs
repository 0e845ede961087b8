//! Validation pipeline: scan -> reduce -> semantic checks
//!
//! Scan and reduction failures are fatal and yield one diagnostic. Semantic
//! errors are accumulated. Either way the rendered messages end with the
//! "check expression part" pointer.

mod error;
mod info;
pub mod output;
mod validation;

pub use error::PipelineError;
pub use info::{get_pipeline_info, PipelineInfo};
pub use output::ParseOutput;
pub use validation::{ExpressionValidator, ValidationReport};

use crate::diagnostics::ValidationFailure;

/// Validate one trigger expression, returning the parsed references or the
/// ordered diagnostic messages
pub fn validate_trigger_expression(expression: &str) -> Result<ParseOutput, Vec<String>> {
    ExpressionValidator::new()
        .validate(expression)
        .map(|report| report.output)
        .map_err(|failure| failure.to_messages())
}

/// Validate with the standard collaborators, keeping metrics and diagnostics
pub fn validate_expression(expression: &str) -> Result<ValidationReport, ValidationFailure> {
    ExpressionValidator::new().validate(expression)
}
