//! Error and success codes with their classification metadata
//!
//! Every code emitted by the validator is declared here together with its
//! category, severity and recommended action, so log consumers and the CLI can
//! classify a failure without parsing message text.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Input error codes (raised before scanning starts or while reading batches)
pub mod input {
    use super::Code;

    pub const EMPTY_EXPRESSION: Code = Code::new("E001");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E002");
    pub const INVALID_LEADING_CHARACTER: Code = Code::new("E003");
    pub const FILE_READ_ERROR: Code = Code::new("E004");
    pub const TOO_MANY_EXPRESSIONS: Code = Code::new("E005");
}

/// Scanner (pass 1) error codes
pub mod scanner {
    use super::Code;

    pub const UNMATCHED_CLOSING_PARENTHESIS: Code = Code::new("E020");
    pub const UNMATCHED_CLOSING_BRACE: Code = Code::new("E021");
    pub const UNCLOSED_PARENTHESIS: Code = Code::new("E022");
    pub const MISSING_CLOSING_BRACE: Code = Code::new("E023");
    pub const ADJACENT_OPERATORS: Code = Code::new("E024");
    pub const INCORRECT_ITEM_PARAMETERS: Code = Code::new("E025");
    pub const INCORRECT_FUNCTION_PARAMETERS: Code = Code::new("E026");
    pub const MISSING_FUNCTION: Code = Code::new("E027");
    pub const UNEXPECTED_SYMBOL: Code = Code::new("E028");
    pub const SYMBOLS_AFTER_FUNCTION: Code = Code::new("E029");
    pub const TOO_MANY_REFERENCES: Code = Code::new("E030");
    pub const TOO_MANY_PARAMETERS: Code = Code::new("E031");
    pub const NESTING_TOO_DEEP: Code = Code::new("E032");
}

/// Grammar reduction (pass 2) error codes
pub mod grammar {
    use super::Code;

    pub const INCORRECT_FORMAT: Code = Code::new("E040");
    pub const EMPTY_GROUP: Code = Code::new("E041");
    pub const MISSING_OPERATOR: Code = Code::new("E042");
    pub const STRAY_OPERATOR: Code = Code::new("E043");
    pub const LINKAGE_MISMATCH: Code = Code::new("E044");
    pub const REDUCTION_LIMIT_EXCEEDED: Code = Code::new("E045");
}

/// Semantic validation (pass 3) error codes
pub mod semantic {
    use super::Code;

    pub const UNKNOWN_MACRO: Code = Code::new("E060");
    pub const INVALID_USER_MACRO: Code = Code::new("E061");
    pub const EMPTY_HOST: Code = Code::new("E062");
    pub const INVALID_HOST: Code = Code::new("E063");
    pub const EMPTY_ITEM_KEY: Code = Code::new("E064");
    pub const INVALID_ITEM_KEY: Code = Code::new("E065");
    pub const UNKNOWN_FUNCTION: Code = Code::new("E066");
    pub const UNEXPECTED_PARAMETERS: Code = Code::new("E067");
    pub const TOO_MANY_PARAMETERS: Code = Code::new("E068");
    pub const MISSING_MANDATORY_PARAMETER: Code = Code::new("E069");
    pub const PARAMETER_TYPE_MISMATCH: Code = Code::new("E070");
    pub const MISSING_HOST_ITEM_REFERENCE: Code = Code::new("E071");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const SCAN_COMPLETE: Code = Code::new("I020");
    pub const GRAMMAR_REDUCTION_COMPLETE: Code = Code::new("I040");
    pub const SEMANTIC_VALIDATION_COMPLETE: Code = Code::new("I060");
    pub const EXPRESSION_VALIDATED: Code = Code::new("I080");
    pub const BATCH_COMPLETE: Code = Code::new("I090");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut register = |code: Code,
                            category: &'static str,
                            severity: Severity,
                            recoverable: bool,
                            requires_halt: bool,
                            description: &'static str,
                            recommended_action: &'static str| {
            registry.insert(
                code.as_str(),
                ErrorMetadata {
                    code: code.as_str(),
                    category,
                    severity,
                    recoverable,
                    requires_halt,
                    description,
                    recommended_action,
                },
            );
        };

        // System
        register(
            system::INTERNAL_ERROR,
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal validator error",
            "File a bug report with the expression that triggered it",
        );
        register(
            system::INITIALIZATION_FAILURE,
            "System",
            Severity::Critical,
            false,
            true,
            "Validator initialization failure",
            "Check runtime preferences and environment variables",
        );

        // Input
        register(
            input::EMPTY_EXPRESSION,
            "Input",
            Severity::High,
            true,
            false,
            "Expression is empty or contains only whitespace",
            "Provide a non-empty trigger expression",
        );
        register(
            input::EXPRESSION_TOO_LONG,
            "Input",
            Severity::High,
            true,
            false,
            "Expression exceeds the configured maximum length",
            "Shorten the expression or raise max_expression_length",
        );
        register(
            input::INVALID_LEADING_CHARACTER,
            "Input",
            Severity::High,
            true,
            false,
            "Expression starts with a character that cannot begin a formula",
            "Start the expression with '(', '{', '-' or a digit",
        );
        register(
            input::FILE_READ_ERROR,
            "Input",
            Severity::High,
            true,
            false,
            "Expression list file could not be read",
            "Check the file path and permissions",
        );
        register(
            input::TOO_MANY_EXPRESSIONS,
            "Input",
            Severity::Medium,
            true,
            false,
            "Batch contains more expressions than allowed",
            "Split the batch or raise max_expressions_per_batch",
        );

        // Scanner
        register(
            scanner::UNMATCHED_CLOSING_PARENTHESIS,
            "Scanner",
            Severity::High,
            true,
            false,
            "Closing parenthesis without a matching opener",
            "Remove the stray ')' or add the missing '('",
        );
        register(
            scanner::UNMATCHED_CLOSING_BRACE,
            "Scanner",
            Severity::High,
            true,
            false,
            "Closing brace outside of a reference",
            "Remove the stray '}' or add the missing '{'",
        );
        register(
            scanner::UNCLOSED_PARENTHESIS,
            "Scanner",
            Severity::High,
            true,
            false,
            "Opening parenthesis is never closed",
            "Add the missing ')'",
        );
        register(
            scanner::MISSING_CLOSING_BRACE,
            "Scanner",
            Severity::High,
            true,
            false,
            "Reference is not terminated by a closing brace",
            "Add the missing '}' after the reference",
        );
        register(
            scanner::ADJACENT_OPERATORS,
            "Scanner",
            Severity::High,
            true,
            false,
            "Two linkage operators follow each other",
            "Remove the duplicated operator; only a unary '-' may follow an operator",
        );
        register(
            scanner::INCORRECT_ITEM_PARAMETERS,
            "Scanner",
            Severity::High,
            true,
            false,
            "Item key parameter list is malformed",
            "Check quoting and separators inside '[...]'",
        );
        register(
            scanner::INCORRECT_FUNCTION_PARAMETERS,
            "Scanner",
            Severity::High,
            true,
            false,
            "Function parameter list is malformed",
            "Check quoting and separators inside '(...)'",
        );
        register(
            scanner::MISSING_FUNCTION,
            "Scanner",
            Severity::High,
            true,
            false,
            "Reference has no function call",
            "Use the form {host:key.function(parameters)}",
        );
        register(
            scanner::UNEXPECTED_SYMBOL,
            "Scanner",
            Severity::High,
            true,
            false,
            "Symbol is not allowed at this position",
            "Remove the symbol or quote it inside a parameter",
        );
        register(
            scanner::SYMBOLS_AFTER_FUNCTION,
            "Scanner",
            Severity::High,
            true,
            false,
            "Text follows a function call inside a reference",
            "Close the reference with '}' right after the function parameters",
        );
        register(
            scanner::TOO_MANY_REFERENCES,
            "Scanner",
            Severity::Medium,
            true,
            false,
            "Expression contains more references than allowed",
            "Split the expression or raise max_references",
        );
        register(
            scanner::TOO_MANY_PARAMETERS,
            "Scanner",
            Severity::Medium,
            true,
            false,
            "Reference has more parameters than allowed",
            "Reduce the parameter count or raise max_parameters_per_reference",
        );
        register(
            scanner::NESTING_TOO_DEEP,
            "Scanner",
            Severity::Medium,
            true,
            false,
            "Item key parameter arrays are nested too deeply",
            "Flatten the parameter arrays or raise max_item_key_nesting_depth",
        );

        // Grammar
        register(
            grammar::INCORRECT_FORMAT,
            "Grammar",
            Severity::High,
            true,
            false,
            "Expression does not reduce to a formula of operands and operators",
            "Remove text that is neither a reference, a number nor an operator",
        );
        register(
            grammar::EMPTY_GROUP,
            "Grammar",
            Severity::High,
            true,
            false,
            "Parenthesis group contains no expression",
            "Remove the empty '()' group",
        );
        register(
            grammar::MISSING_OPERATOR,
            "Grammar",
            Severity::High,
            true,
            false,
            "Two operands follow each other without an operator",
            "Insert a linkage operator between the operands",
        );
        register(
            grammar::STRAY_OPERATOR,
            "Grammar",
            Severity::High,
            true,
            false,
            "Operator is missing an operand inside a group",
            "Remove the operator or add the missing operand",
        );
        register(
            grammar::LINKAGE_MISMATCH,
            "Grammar",
            Severity::High,
            true,
            false,
            "Operator count does not match operand count",
            "Check for leading, trailing or repeated operators",
        );
        register(
            grammar::REDUCTION_LIMIT_EXCEEDED,
            "Grammar",
            Severity::Medium,
            true,
            false,
            "Grammar reduction did not converge within the pass limit",
            "Simplify the expression or raise max_reduction_passes",
        );

        // Semantic
        register(
            semantic::UNKNOWN_MACRO,
            "Semantic",
            Severity::High,
            true,
            false,
            "Built-in macro is not allowed in trigger expressions",
            "Use one of the supported trigger macros",
        );
        register(
            semantic::INVALID_USER_MACRO,
            "Semantic",
            Severity::High,
            true,
            false,
            "User macro is malformed",
            "Use the form {$NAME} or {$NAME:context}",
        );
        register(
            semantic::EMPTY_HOST,
            "Semantic",
            Severity::High,
            true,
            false,
            "Reference has an empty host name",
            "Put the host name before ':'",
        );
        register(
            semantic::INVALID_HOST,
            "Semantic",
            Severity::High,
            true,
            false,
            "Host name contains characters that are not allowed",
            "Use letters, digits, spaces, '.', '_' and '-' only",
        );
        register(
            semantic::EMPTY_ITEM_KEY,
            "Semantic",
            Severity::High,
            true,
            false,
            "Reference has an empty item key",
            "Put the item key between ':' and the function name",
        );
        register(
            semantic::INVALID_ITEM_KEY,
            "Semantic",
            Severity::High,
            true,
            false,
            "Item key does not match the item key grammar",
            "Check the key name and its bracketed parameters",
        );
        register(
            semantic::UNKNOWN_FUNCTION,
            "Semantic",
            Severity::High,
            true,
            false,
            "Function is not in the trigger function registry",
            "Use a supported trigger function",
        );
        register(
            semantic::UNEXPECTED_PARAMETERS,
            "Semantic",
            Severity::High,
            true,
            false,
            "Parameters supplied to a function that takes none",
            "Call the function with empty parentheses",
        );
        register(
            semantic::TOO_MANY_PARAMETERS,
            "Semantic",
            Severity::High,
            true,
            false,
            "More parameters supplied than the function accepts",
            "Remove the extra parameters",
        );
        register(
            semantic::MISSING_MANDATORY_PARAMETER,
            "Semantic",
            Severity::High,
            true,
            false,
            "Mandatory function parameter is missing",
            "Supply every mandatory parameter",
        );
        register(
            semantic::PARAMETER_TYPE_MISMATCH,
            "Semantic",
            Severity::High,
            true,
            false,
            "Function parameter does not match its declared type",
            "Use a value of the expected type or a user macro",
        );
        register(
            semantic::MISSING_HOST_ITEM_REFERENCE,
            "Semantic",
            Severity::High,
            true,
            false,
            "Expression has no host:key reference",
            "Reference at least one host item with a function",
        );

        // Success
        register(
            success::SYSTEM_INITIALIZATION_COMPLETED,
            "System",
            Severity::Low,
            true,
            false,
            "Logging system initialized",
            "No action required",
        );
        register(
            success::SCAN_COMPLETE,
            "Scanner",
            Severity::Low,
            true,
            false,
            "Scanning completed",
            "Expression ready for grammar reduction",
        );
        register(
            success::GRAMMAR_REDUCTION_COMPLETE,
            "Grammar",
            Severity::Low,
            true,
            false,
            "Grammar reduction completed",
            "Expression ready for semantic validation",
        );
        register(
            success::SEMANTIC_VALIDATION_COMPLETE,
            "Semantic",
            Severity::Low,
            true,
            false,
            "Semantic validation completed",
            "No action required",
        );
        register(
            success::EXPRESSION_VALIDATED,
            "Pipeline",
            Severity::Low,
            true,
            false,
            "Expression validated",
            "No action required",
        );
        register(
            success::BATCH_COMPLETE,
            "Batch",
            Severity::Low,
            true,
            false,
            "Batch validation completed",
            "No action required",
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pass_has_registered_codes() {
        for code in [
            input::EMPTY_EXPRESSION,
            scanner::ADJACENT_OPERATORS,
            grammar::MISSING_OPERATOR,
            semantic::UNKNOWN_FUNCTION,
            success::EXPRESSION_VALIDATED,
        ] {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E024"), "Scanner");
        assert_eq!(get_category("E044"), "Grammar");
        assert_eq!(get_category("E066"), "Semantic");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("ERR001"));
        assert!(is_recoverable("E001"));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_action("E999"), "No specific action available");
        assert_eq!(get_category("E999"), "Unknown");
        assert_eq!(get_severity("E999"), Severity::Medium);
    }

    #[test]
    fn test_code_serializes_as_string() {
        let json = serde_json::to_string(&scanner::MISSING_CLOSING_BRACE).unwrap();
        assert_eq!(json, "\"E023\"");
    }
}
