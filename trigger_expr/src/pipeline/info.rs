use crate::config::build_info;
use crate::config::compile_time::{grammar, scanner, semantic};
use crate::semantic::macros::TRIGGER_MACROS;
use crate::semantic::StandardFunctionRegistry;

/// Information about validator capabilities and build limits
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub passes: usize,
    pub build_profile: &'static str,
    pub max_expression_length: usize,
    pub max_references: usize,
    pub max_reduction_passes: usize,
    pub max_semantic_errors: usize,
    pub functions: Vec<&'static str>,
    pub builtin_macros: Vec<&'static str>,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "Trigger Expression Validator:\n\
             - Passes: {}\n\
             - Build Profile: {}\n\
             - Max Expression Length: {} bytes\n\
             - Max References: {}\n\
             - Max Reduction Passes: {}\n\
             - Max Semantic Errors: {}\n\
             - Functions: {}\n\
             - Built-in Macros: {}",
            self.passes,
            self.build_profile,
            self.max_expression_length,
            self.max_references,
            self.max_reduction_passes,
            self.max_semantic_errors,
            self.functions.join(", "),
            self.builtin_macros.join(", ")
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-pass trigger expression validator with {} functions ({} profile)",
            self.passes,
            self.functions.len(),
            self.build_profile
        )
    }
}

pub fn get_pipeline_info() -> PipelineInfo {
    PipelineInfo {
        passes: 3,
        build_profile: build_info::profile(),
        max_expression_length: scanner::MAX_EXPRESSION_LENGTH,
        max_references: scanner::MAX_REFERENCES,
        max_reduction_passes: grammar::MAX_REDUCTION_PASSES,
        max_semantic_errors: semantic::MAX_SEMANTIC_ERRORS,
        functions: StandardFunctionRegistry.names(),
        builtin_macros: TRIGGER_MACROS.to_vec(),
    }
}
