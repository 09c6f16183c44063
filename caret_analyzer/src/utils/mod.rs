//! Shared primitive types used across the analyzer

pub mod span;

pub use span::{Position, SourceMap, Span};
