//! Caret-aware expression type analysis
//!
//! Given expression text and a caret offset, recover the trailing fragment
//! ending at the caret and resolve its static type, so an editor can offer
//! member completion.
//!
//! ```text
//! text, caret ──► truncate ──► FragmentLocator ──► TypeResolver ──► Analysis
//!                                                  │ compile (retry legacy keywords)
//!                                                  └ well-known type name match
//! ```

// Internal modules
pub mod analysis;
pub mod compiler;
pub mod completion;
pub mod config;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod resolution;
pub mod syntax;
pub mod tokens;
pub mod types;
pub mod utils;

// Re-export key types for library consumers
pub use analysis::{Analysis, AnalysisReport, CaretAnalyzer};
pub use compiler::{compile_with_compatibility, replace_legacy_keywords, ExpressionCompiler, TypeCompiler};
pub use completion::{CompletionItem, CompletionKind, CompletionList, CompletionProvider};
pub use config::{CompletionPreferences, ParsingPreferences, RuntimeConfig, StringLiteralParsing};
pub use resolution::{Resolution, TypeResolver};
pub use syntax::{locate_fragment, AnalyzerError, AnalyzerResult, LocatedFragment, ParseError, ParseErrorKind};
pub use types::{TypeModel, TypeRef, TypeRegistry};
