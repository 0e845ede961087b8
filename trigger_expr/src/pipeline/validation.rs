use super::error::PipelineError;
use super::output::ParseOutput;
use crate::config::runtime::{RuntimeConfig, ScannerPreferences};
use crate::diagnostics::ValidationFailure;
use crate::grammar::{reduce_and_validate, ReductionSummary};
use crate::logging::codes;
use crate::scanner::{scan_with_preferences, ScanMetrics};
use crate::semantic::{Collaborators, SemanticValidator};
use crate::utils::Span;
use crate::{log_info, log_success};
use std::time::{Duration, Instant};

/// Everything known about an accepted expression
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub output: ParseOutput,
    pub metrics: ScanMetrics,
    pub reduction: ReductionSummary,
    pub duration: Duration,
}

/// Runs scan, reduction and semantic validation over one expression at a time.
///
/// Holds no per-expression state; one validator can be shared across threads.
pub struct ExpressionValidator<'a> {
    scanner_preferences: ScannerPreferences,
    semantic: SemanticValidator<'a>,
}

impl ExpressionValidator<'static> {
    pub fn new() -> Self {
        Self::with_config(&RuntimeConfig::default())
    }

    pub fn with_config(config: &RuntimeConfig) -> Self {
        Self::with_collaborators(Collaborators::default(), config)
    }
}

impl Default for ExpressionValidator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ExpressionValidator<'a> {
    pub fn with_collaborators(collaborators: Collaborators<'a>, config: &RuntimeConfig) -> Self {
        Self {
            scanner_preferences: config.scanner.clone(),
            semantic: SemanticValidator::with_collaborators(collaborators, config.semantic.clone()),
        }
    }

    pub fn validate(&self, expression: &str) -> Result<ValidationReport, ValidationFailure> {
        let start_time = Instant::now();

        match self.run_passes(expression) {
            Ok((output, metrics, reduction)) => {
                let duration = start_time.elapsed();
                log_success!(codes::success::EXPRESSION_VALIDATED, "Trigger expression validated",
                    "references" => output.references.len(),
                    "duration_us" => duration.as_micros()
                );
                Ok(ValidationReport {
                    output,
                    metrics,
                    reduction,
                    duration,
                })
            }
            Err(error) => {
                let failure = error.to_failure(expression);
                log_info!("Trigger expression rejected",
                    "code" => error.error_code(),
                    "diagnostics" => failure.diagnostics.len()
                );
                Err(failure)
            }
        }
    }

    /// Scan and reduction failures stop the run; semantic errors are
    /// accumulated and returned together
    fn run_passes(
        &self,
        expression: &str,
    ) -> Result<(ParseOutput, ScanMetrics, ReductionSummary), PipelineError> {
        let (references, metrics) =
            scan_with_preferences(expression, self.scanner_preferences.clone())?;

        let spans: Vec<Span> = references.iter().map(|r| r.span).collect();
        let reduction = reduce_and_validate(expression, &spans)?;

        let semantic = self.semantic.validate(&references);
        if !semantic.is_successful() {
            return Err(PipelineError::Semantic {
                errors: semantic.errors,
            });
        }

        Ok((
            ParseOutput::new(expression, references, semantic.user_macros),
            metrics,
            reduction,
        ))
    }
}
