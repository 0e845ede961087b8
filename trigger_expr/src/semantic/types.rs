//! Shared semantic pass types

use super::error::SemanticError;
use super::functions::{FunctionRegistry, StandardFunctionRegistry};
use super::macros::{BuiltinMacroAllowList, StandardMacroAllowList};
use crate::grammar::{
    HostNameGrammar, ItemKeyGrammar, StandardHostNameGrammar, StandardItemKeyGrammar,
    StandardUserMacroGrammar, UserMacroGrammar,
};

/// The grammars and registries the semantic pass consults
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub hosts: &'a dyn HostNameGrammar,
    pub item_keys: &'a dyn ItemKeyGrammar,
    pub user_macros: &'a dyn UserMacroGrammar,
    pub functions: &'a dyn FunctionRegistry,
    pub macros: &'a dyn BuiltinMacroAllowList,
}

impl Default for Collaborators<'static> {
    fn default() -> Self {
        Self {
            hosts: &StandardHostNameGrammar,
            item_keys: &StandardItemKeyGrammar,
            user_macros: &StandardUserMacroGrammar,
            functions: &StandardFunctionRegistry,
            macros: &StandardMacroAllowList,
        }
    }
}

/// Everything the semantic pass found
#[derive(Debug, Clone, Default)]
pub struct SemanticOutput {
    pub errors: Vec<SemanticError>,
    /// User macros in order of appearance, both whole references and ones
    /// embedded in item or function parameters
    pub user_macros: Vec<String>,
    /// Error collection stopped at the configured limit
    pub truncated: bool,
}

impl SemanticOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }
}
