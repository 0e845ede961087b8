use crate::scanner::{ParsedReference, ReferenceKind};
use serde::Serialize;

/// Structured result of a successful validation.
///
/// The flat lists follow reference order and keep duplicates. `macros` and
/// `user_macros` hold the macro text as written, braces included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseOutput {
    pub expression: String,
    pub references: Vec<ParsedReference>,
    pub hosts: Vec<String>,
    pub items: Vec<String>,
    pub item_params: Vec<String>,
    pub functions: Vec<String>,
    pub function_params: Vec<String>,
    pub macros: Vec<String>,
    pub user_macros: Vec<String>,
}

impl ParseOutput {
    /// Build the output from scanned references and the user macros found by
    /// the semantic pass
    pub fn new(expression: &str, references: Vec<ParsedReference>, user_macros: Vec<String>) -> Self {
        let mut output = Self {
            expression: expression.to_string(),
            user_macros,
            ..Self::default()
        };

        for reference in &references {
            match &reference.kind {
                ReferenceKind::HostItemFunction {
                    host,
                    item,
                    item_params,
                    function_name,
                    function_params,
                } => {
                    output.hosts.push(host.clone());
                    output.items.push(item.clone());
                    output.item_params.extend(item_params.iter().cloned());
                    output.functions.push(function_name.clone());
                    output.function_params.extend(function_params.iter().cloned());
                }
                ReferenceKind::BuiltinMacro { .. } => output.macros.push(reference.raw_text.clone()),
                // Already in `user_macros`, in order with the embedded ones
                ReferenceKind::UserMacro { .. } => {}
            }
        }

        output.references = references;
        output
    }

    pub fn host_item_functions(&self) -> impl Iterator<Item = &ParsedReference> {
        self.references.iter().filter(|r| r.is_host_item_function())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
