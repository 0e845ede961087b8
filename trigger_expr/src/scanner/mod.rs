//! Pass 1: character scanner
//!
//! Walks the expression once, left to right, tracking bracket/quote balance
//! and operator adjacency, and splits out every `{...}` reference with its
//! host, item key, function and parameters.

pub mod analyzer;
pub mod error;
pub mod params;
pub mod state;
pub mod types;

use crate::config::runtime::ScannerPreferences;

pub use analyzer::{ScanMetrics, Scanner};
pub use error::ScanError;
pub use params::unquote_param;
pub use state::{is_linkage_operator, ScanMode, ScanState, LINKAGE_OPERATORS};
pub use types::{ParsedReference, ReferenceKind};

/// Scan an expression with default preferences
pub fn scan(expression: &str) -> Result<Vec<ParsedReference>, ScanError> {
    Scanner::new().scan(expression)
}

/// Scan with custom runtime preferences, returning the metrics as well
pub fn scan_with_preferences(
    expression: &str,
    preferences: ScannerPreferences,
) -> Result<(Vec<ParsedReference>, ScanMetrics), ScanError> {
    let mut scanner = Scanner::with_preferences(preferences);
    let references = scanner.scan(expression)?;
    Ok((references, scanner.metrics().clone()))
}
