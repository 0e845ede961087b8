// build.rs - TOML-driven constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    scanner: ScannerLimits,
    grammar: GrammarLimits,
    semantic: SemanticLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct ScannerLimits {
    max_expression_length: usize,
    max_references: usize,
    max_parameters_per_reference: usize,
    max_item_key_nesting_depth: usize,
}

#[derive(serde::Deserialize)]
struct GrammarLimits {
    max_reduction_passes: usize,
}

#[derive(serde::Deserialize)]
struct SemanticLimits {
    max_semantic_errors: usize,
    max_error_message_length: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_expressions_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TRIGGER_EXPR_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=TRIGGER_EXPR_CONFIG_DIR");

    let profile =
        env::var("TRIGGER_EXPR_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("TRIGGER_EXPR_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of trigger_expr directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_EXPRESSION_LENGTH: usize = 1_048_576;
    const ABSOLUTE_MAX_NESTING_DEPTH: usize = 256;
    const ABSOLUTE_MAX_WORKER_THREADS: usize = 256;

    if config.scanner.max_expression_length == 0
        || config.scanner.max_expression_length > ABSOLUTE_MAX_EXPRESSION_LENGTH
    {
        panic!("LIMITS: max_expression_length must be in 1..={ABSOLUTE_MAX_EXPRESSION_LENGTH}");
    }

    if config.scanner.max_references == 0 {
        panic!("LIMITS: max_references cannot be zero");
    }

    if config.scanner.max_item_key_nesting_depth == 0
        || config.scanner.max_item_key_nesting_depth > ABSOLUTE_MAX_NESTING_DEPTH
    {
        panic!("LIMITS: max_item_key_nesting_depth must be in 1..={ABSOLUTE_MAX_NESTING_DEPTH}");
    }

    if config.grammar.max_reduction_passes == 0 {
        panic!("LIMITS: max_reduction_passes cannot be zero");
    }

    if config.semantic.max_semantic_errors == 0 {
        panic!("LIMITS: max_semantic_errors cannot be zero");
    }

    if config.batch_processing.max_worker_threads == 0
        || config.batch_processing.max_worker_threads > ABSOLUTE_MAX_WORKER_THREADS
    {
        panic!("LIMITS: max_worker_threads must be in 1..={ABSOLUTE_MAX_WORKER_THREADS}");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.scanner.max_expression_length > 65_536 {
        panic!("PRODUCTION: max_expression_length too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod scanner {{
        pub const MAX_EXPRESSION_LENGTH: usize = {};
        pub const MAX_REFERENCES: usize = {};
        pub const MAX_PARAMETERS_PER_REFERENCE: usize = {};
        pub const MAX_ITEM_KEY_NESTING_DEPTH: usize = {};
    }}

    pub mod grammar {{
        pub const MAX_REDUCTION_PASSES: usize = {};
    }}

    pub mod semantic {{
        pub const MAX_SEMANTIC_ERRORS: usize = {};
        pub const MAX_ERROR_MESSAGE_LENGTH: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_EXPRESSIONS_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        // Scanner
        config.scanner.max_expression_length,
        config.scanner.max_references,
        config.scanner.max_parameters_per_reference,
        config.scanner.max_item_key_nesting_depth,
        // Grammar
        config.grammar.max_reduction_passes,
        // Semantic
        config.semantic.max_semantic_errors,
        config.semantic.max_error_message_length,
        // Batch Processing
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_expressions_per_batch,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
