//! References extracted from a trigger expression

use crate::utils::Span;
use serde::{Deserialize, Serialize};

/// What a `{...}` reference turned out to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `{host:key.function(params)}`
    HostItemFunction {
        host: String,
        /// Full item key including any bracketed parameter lists
        item: String,
        item_params: Vec<String>,
        function_name: String,
        function_params: Vec<String>,
    },
    /// `{MACRO.NAME}`
    BuiltinMacro { name: String },
    /// `{$NAME}` or `{$NAME:context}`
    UserMacro {
        name: String,
        context: Option<String>,
    },
}

/// One reference in left-to-right order of appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReference {
    /// Exact source text including the surrounding braces
    pub raw_text: String,
    pub span: Span,
    pub kind: ReferenceKind,
}

impl ParsedReference {
    pub fn is_host_item_function(&self) -> bool {
        matches!(self.kind, ReferenceKind::HostItemFunction { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ReferenceKind::HostItemFunction { .. } => "host_item_function",
            ReferenceKind::BuiltinMacro { .. } => "builtin_macro",
            ReferenceKind::UserMacro { .. } => "user_macro",
        }
    }
}
