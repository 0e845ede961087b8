//! Shared primitive types used across the scanner, grammar and semantic passes

pub mod span;

pub use span::Span;
