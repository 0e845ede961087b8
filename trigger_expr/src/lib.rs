// Internal modules
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod grammar;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod scanner;
pub mod semantic;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchResults};
pub use diagnostics::{Diagnostic, ValidationFailure};
pub use pipeline::{
    validate_expression, validate_trigger_expression, ExpressionValidator, PipelineError,
    ValidationReport,
};
pub use scanner::{ParsedReference, ReferenceKind};
pub use semantic::Collaborators;

// Re-export parse output for embedding applications
pub use pipeline::output::ParseOutput;
