//! Pass 3: semantic validation of scanned references
//!
//! Checks each reference against the host, item-key and user-macro grammars,
//! the function registry and the built-in macro allow-list. Errors are
//! accumulated across all references rather than stopping at the first.

pub mod error;
pub mod functions;
pub mod macros;
pub mod types;

pub use error::SemanticError;
pub use functions::{ArgSpec, FunctionRegistry, FunctionSpec, ParamKind, StandardFunctionRegistry};
pub use macros::{BuiltinMacroAllowList, StandardMacroAllowList};
pub use types::{Collaborators, SemanticOutput};

use crate::config::compile_time::semantic::MAX_SEMANTIC_ERRORS;
use crate::config::runtime::SemanticPreferences;
use crate::diagnostics::Diagnostic;
use crate::grammar::{find_user_macros, ItemKeyAst};
use crate::logging::codes;
use crate::scanner::{ParsedReference, ReferenceKind};
use crate::{log_debug, log_info, log_success};

pub struct SemanticValidator<'a> {
    collaborators: Collaborators<'a>,
    preferences: SemanticPreferences,
}

impl SemanticValidator<'static> {
    pub fn new() -> Self {
        Self::with_collaborators(Collaborators::default(), SemanticPreferences::default())
    }
}

impl Default for SemanticValidator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SemanticValidator<'a> {
    pub fn with_collaborators(
        collaborators: Collaborators<'a>,
        preferences: SemanticPreferences,
    ) -> Self {
        Self {
            collaborators,
            preferences,
        }
    }

    pub fn preferences(&self) -> &SemanticPreferences {
        &self.preferences
    }

    /// Validate every reference, accumulating errors up to the configured limit
    pub fn validate(&self, references: &[ParsedReference]) -> SemanticOutput {
        log_debug!("Starting semantic validation",
            "references" => references.len(),
            "max_errors" => MAX_SEMANTIC_ERRORS
        );

        let mut output = SemanticOutput::new();
        let mut has_host_item = false;

        for reference in references {
            if self.preferences.log_validation_details {
                log_debug!("Validating reference",
                    "kind" => reference.kind_name(),
                    "text" => reference.raw_text.as_str()
                );
            }

            let mut errors = Vec::new();
            self.check_reference(reference, &mut errors, &mut output.user_macros);
            has_host_item |= reference.is_host_item_function();

            for error in errors {
                record(&mut output, error);
            }
        }

        if !has_host_item {
            record_expression_rule(&mut output, SemanticError::MissingHostItemReference);
        }

        if output.is_successful() {
            log_success!(codes::success::SEMANTIC_VALIDATION_COMPLETE, "Semantic validation completed",
                "references" => references.len(),
                "user_macros" => output.user_macros.len()
            );
        } else {
            log_info!("Semantic validation found errors",
                "error_count" => output.errors.len(),
                "truncated" => output.truncated
            );
        }
        output
    }

    fn check_reference(
        &self,
        reference: &ParsedReference,
        errors: &mut Vec<SemanticError>,
        user_macros: &mut Vec<String>,
    ) {
        let byte_offset = reference.span.start();

        match &reference.kind {
            ReferenceKind::BuiltinMacro { name } => {
                if !self.collaborators.macros.contains(name) {
                    errors.push(SemanticError::UnknownMacro {
                        name: name.clone(),
                        byte_offset,
                    });
                }
            }
            ReferenceKind::UserMacro { .. } => {
                if self.collaborators.user_macros.validate(&reference.raw_text) {
                    user_macros.push(reference.raw_text.clone());
                } else {
                    errors.push(SemanticError::InvalidUserMacro {
                        text: reference.raw_text.clone(),
                        byte_offset,
                    });
                }
            }
            ReferenceKind::HostItemFunction {
                host,
                item,
                function_name,
                function_params,
                ..
            } => {
                self.check_host(host, byte_offset, errors);
                let key = self.check_item_key(item, byte_offset, errors);
                self.check_function(function_name, function_params, byte_offset, errors);

                if self.preferences.collect_embedded_user_macros {
                    if let Some(key) = &key {
                        self.collect_embedded(key.texts(), user_macros);
                    }
                    self.collect_embedded(function_params.iter().map(String::as_str), user_macros);
                }
            }
        }
    }

    fn check_host(&self, host: &str, byte_offset: usize, errors: &mut Vec<SemanticError>) {
        if host.is_empty() {
            errors.push(SemanticError::EmptyHost { byte_offset });
        } else if !self.collaborators.hosts.validate(host) {
            errors.push(SemanticError::InvalidHost {
                host: host.to_string(),
                byte_offset,
            });
        }
    }

    fn check_item_key(
        &self,
        item: &str,
        byte_offset: usize,
        errors: &mut Vec<SemanticError>,
    ) -> Option<ItemKeyAst> {
        if item.is_empty() {
            errors.push(SemanticError::EmptyItemKey { byte_offset });
            return None;
        }
        match self.collaborators.item_keys.parse(item) {
            Ok(key) => Some(key),
            Err(reason) => {
                errors.push(SemanticError::InvalidItemKey {
                    key: item.to_string(),
                    reason,
                    byte_offset,
                });
                None
            }
        }
    }

    fn check_function(
        &self,
        name: &str,
        parameters: &[String],
        byte_offset: usize,
        errors: &mut Vec<SemanticError>,
    ) {
        let Some(spec) = self.collaborators.functions.lookup(name) else {
            errors.push(SemanticError::UnknownFunction {
                name: name.to_string(),
                byte_offset,
            });
            return;
        };

        let Some(args) = spec.args else {
            if !parameters.is_empty() {
                errors.push(SemanticError::UnexpectedParameters {
                    function: name.to_string(),
                    byte_offset,
                });
            }
            return;
        };

        if parameters.len() > args.len() {
            errors.push(SemanticError::TooManyParameters {
                function: name.to_string(),
                expected: args.len(),
                supplied: parameters.len(),
                byte_offset,
            });
            return;
        }

        for (index, arg) in args.iter().enumerate() {
            // An empty slot counts as not supplied
            let parameter = parameters.get(index).map_or("", String::as_str);
            if parameter.is_empty() {
                if arg.mandatory {
                    errors.push(SemanticError::MissingMandatoryParameter {
                        function: name.to_string(),
                        position: index + 1,
                        byte_offset,
                    });
                }
                continue;
            }

            if !self.is_user_macro(parameter) && !arg.kind.accepts(parameter) {
                errors.push(SemanticError::ParameterTypeMismatch {
                    function: name.to_string(),
                    parameter: parameter.to_string(),
                    expected: arg.kind,
                    byte_offset,
                });
            }
        }
    }

    fn is_user_macro(&self, parameter: &str) -> bool {
        parameter.starts_with("{$")
            && parameter.ends_with('}')
            && self.collaborators.user_macros.validate(parameter)
    }

    fn collect_embedded<'t>(
        &self,
        texts: impl IntoIterator<Item = &'t str>,
        user_macros: &mut Vec<String>,
    ) {
        for text in texts {
            for found in find_user_macros(text) {
                if self.collaborators.user_macros.validate(found.as_str()) {
                    user_macros.push(found.as_str().to_string());
                }
            }
        }
    }
}

fn record(output: &mut SemanticOutput, error: SemanticError) {
    if output.errors.len() >= MAX_SEMANTIC_ERRORS {
        output.truncated = true;
        return;
    }
    error.log_error();
    output.errors.push(error);
}

/// Expression-wide errors always make the list, displacing the last
/// per-reference error when the limit is reached
fn record_expression_rule(output: &mut SemanticOutput, error: SemanticError) {
    if output.errors.len() >= MAX_SEMANTIC_ERRORS {
        output.truncated = true;
        output.errors.truncate(MAX_SEMANTIC_ERRORS.saturating_sub(1));
    }
    error.log_error();
    output.errors.push(error);
}

/// Validate references with the standard collaborators
pub fn validate_references(references: &[ParsedReference]) -> Vec<Diagnostic> {
    SemanticValidator::new()
        .validate(references)
        .errors
        .iter()
        .map(Diagnostic::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::HostNameGrammar;
    use crate::scanner::scan;
    use assert_matches::assert_matches;

    fn validate(expression: &str) -> SemanticOutput {
        let references = scan(expression).expect("test expressions must scan");
        SemanticValidator::new().validate(&references)
    }

    #[test]
    fn test_valid_reference() {
        let output = validate("{srv1:agent.ping.last(0)}=1");
        assert!(output.is_successful(), "{:?}", output.errors);
        assert!(output.user_macros.is_empty());
    }

    #[test]
    fn test_empty_and_invalid_host() {
        let output = validate("{:agent.ping.last(0)}=1");
        assert_matches!(output.errors[..], [SemanticError::EmptyHost { byte_offset: 0 }]);

        let output = validate("{srv#1:agent.ping.last(0)}=1");
        assert_matches!(&output.errors[..], [SemanticError::InvalidHost { host, .. }] if host == "srv#1");
    }

    #[test]
    fn test_invalid_item_key() {
        let output = validate("{srv1:agent!ping.last(0)}=1");
        assert_matches!(&output.errors[..], [SemanticError::InvalidItemKey { key, .. }] if key == "agent!ping");

        let output = validate("{srv1:agent.ping[a]x.last(0)}=1");
        assert_matches!(output.errors[..], [SemanticError::InvalidItemKey { .. }]);
    }

    #[test]
    fn test_unknown_function() {
        let output = validate("{srv1:agent.ping.nosuchfn(0)}");
        assert_matches!(&output.errors[..], [SemanticError::UnknownFunction { name, .. }] if name == "nosuchfn");
    }

    #[test]
    fn test_parameter_counts() {
        let output = validate("{h:a.diff(1)}=0");
        assert_matches!(output.errors[..], [SemanticError::UnexpectedParameters { .. }]);

        let output = validate("{h:a.diff()}=0");
        assert!(output.is_successful());

        let output = validate("{h:a.last(1,2,3)}=0");
        assert_matches!(
            output.errors[..],
            [SemanticError::TooManyParameters {
                expected: 2,
                supplied: 3,
                ..
            }]
        );

        let output = validate("{h:a.band(#1,)}=0");
        assert_matches!(
            output.errors[..],
            [SemanticError::MissingMandatoryParameter { position: 2, .. }]
        );
    }

    #[test]
    fn test_parameter_types() {
        let output = validate("{h:a.nodata(abc)}=0");
        assert_matches!(
            &output.errors[..],
            [SemanticError::ParameterTypeMismatch {
                expected: ParamKind::Sec,
                parameter,
                ..
            }] if parameter == "abc"
        );

        assert!(validate("{h:a.count(#5,\"x y\",eq,1h)}>2").is_successful());
        assert!(validate("{h:a.band(#1,12)}=0").is_successful());
    }

    #[test]
    fn test_user_macro_satisfies_any_kind() {
        let output = validate("{srv1:agent.ping.last({$TIME_WINDOW})}=1");
        assert!(output.is_successful(), "{:?}", output.errors);
        assert_eq!(output.user_macros, vec!["{$TIME_WINDOW}".to_string()]);
    }

    #[test]
    fn test_embedded_user_macros_are_collected() {
        let output = validate("{h:net.if.in[{$IFACE},bytes].regexp(\"x{$PATTERN}\")}={$LIMIT}");
        assert!(output.is_successful(), "{:?}", output.errors);
        assert_eq!(output.user_macros, vec!["{$IFACE}", "{$PATTERN}", "{$LIMIT}"]);
    }

    #[test]
    fn test_macros() {
        let output = validate("{TRIGGER.VALUE}=1");
        assert_matches!(output.errors[..], [SemanticError::MissingHostItemReference]);

        let output = validate("{h:a.last(0)}>{HOST.NAME}");
        assert_matches!(&output.errors[..], [SemanticError::UnknownMacro { name, byte_offset: 14 }] if name == "HOST.NAME");

        let output = validate("{h:a.last(0)}>{$lower}");
        assert_matches!(output.errors[..], [SemanticError::InvalidUserMacro { .. }]);
    }

    #[test]
    fn test_errors_accumulate_across_references() {
        let output = validate("{:a.nosuch(0)}+{h#:b.last(x)}");
        assert_eq!(output.errors.len(), 4);
        assert_eq!(output.errors[0].byte_offset(), Some(0));
        assert_eq!(output.errors[2].byte_offset(), Some(15));
    }

    struct AnyHost;

    impl HostNameGrammar for AnyHost {
        fn validate(&self, _host: &str) -> bool {
            true
        }
    }

    #[test]
    fn test_error_limit_keeps_expression_rule() {
        let macros_only = vec!["{HOST.NAME}"; MAX_SEMANTIC_ERRORS + 1].join("+");
        let output = validate(&macros_only);
        assert!(output.truncated);
        assert_eq!(output.errors.len(), MAX_SEMANTIC_ERRORS);
        assert_matches!(output.errors.last(), Some(SemanticError::MissingHostItemReference));
        assert!(output.errors[..MAX_SEMANTIC_ERRORS - 1]
            .iter()
            .all(|e| matches!(e, SemanticError::UnknownMacro { .. })));

        // One slot short of the limit leaves room for the expression rule
        let macros_only = vec!["{HOST.NAME}"; MAX_SEMANTIC_ERRORS - 1].join("+");
        let output = validate(&macros_only);
        assert!(!output.truncated);
        assert_eq!(output.errors.len(), MAX_SEMANTIC_ERRORS);
    }

    #[test]
    fn test_error_limit_with_host_item() {
        let expression = format!(
            "{{h:a.last(0)}}+{}",
            vec!["{HOST.NAME}"; MAX_SEMANTIC_ERRORS + 1].join("+")
        );
        let output = validate(&expression);
        assert!(output.truncated);
        assert_eq!(output.errors.len(), MAX_SEMANTIC_ERRORS);
        assert!(output
            .errors
            .iter()
            .all(|e| matches!(e, SemanticError::UnknownMacro { .. })));
        assert_eq!(output.errors[0].byte_offset(), Some(14));
    }

    #[test]
    fn test_validate_references_diagnostics() {
        let references = scan("{h:a.nosuch(0)}+{h:b.last(0)}").unwrap();
        let diagnostics = validate_references(&references);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::semantic::UNKNOWN_FUNCTION);
        assert_eq!(diagnostics[0].offset, Some(0));

        let references = scan("{h:b.last(0)}=1").unwrap();
        assert!(validate_references(&references).is_empty());
    }

    #[test]
    fn test_custom_collaborators() {
        let collaborators = Collaborators {
            hosts: &AnyHost,
            ..Collaborators::default()
        };
        let validator =
            SemanticValidator::with_collaborators(collaborators, SemanticPreferences::default());
        let references = scan("{srv#1:agent.ping.last(0)}=1").unwrap();
        assert!(validator.validate(&references).is_successful());
    }

    #[test]
    fn test_embedded_collection_can_be_disabled() {
        let preferences = SemanticPreferences {
            collect_embedded_user_macros: false,
            log_validation_details: true,
        };
        let validator = SemanticValidator::with_collaborators(Collaborators::default(), preferences);
        let references = scan("{h:a.last({$W})}={$LIMIT}").unwrap();
        let output = validator.validate(&references);
        assert_eq!(output.user_macros, vec!["{$LIMIT}"]);
    }
}
