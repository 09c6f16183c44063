//! Syntax analysis: error types and the caret-aware fragment locator

pub mod error;
pub mod locator;

pub use error::{AnalyzerError, AnalyzerResult, ParseError, ParseErrorKind, ParseResult};
pub use locator::{FragmentLocator, LocatedFragment};

use crate::config::runtime::ParsingPreferences;

/// Locate the trailing fragment of `text` with the given preferences
pub fn locate_fragment(
    text: &str,
    preferences: &ParsingPreferences,
) -> AnalyzerResult<LocatedFragment> {
    FragmentLocator::new(preferences.clone()).locate(text)
}
