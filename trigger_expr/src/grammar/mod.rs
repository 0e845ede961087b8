//! Pass 2: grammar reduction, plus the grammars for the pieces of a reference
//!
//! The reducer checks the overall shape of the formula. The host-name,
//! item-key and user-macro grammars are collaborators consumed by the
//! semantic pass; each is a trait with a standard implementation.

pub mod error;
pub mod host;
pub mod item_key;
pub mod reducer;
pub mod user_macro;

use regex::Regex;
use std::sync::OnceLock;

pub use error::GrammarError;
pub use host::{HostNameGrammar, StandardHostNameGrammar};
pub use item_key::{ItemKeyAst, ItemKeyGrammar, ItemKeyParam, StandardItemKeyGrammar};
pub use reducer::{reduce_and_validate, GrammarReducer, ReductionSummary};
pub use user_macro::{find_user_macros, StandardUserMacroGrammar, UserMacroGrammar};

/// Compile a built-in pattern once. The patterns are literals, so a compile
/// failure is a bug in this crate rather than bad input.
pub(crate) fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
    })
}
