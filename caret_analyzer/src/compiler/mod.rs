//! Expression compilation against a context type
//!
//! - **[`ExpressionCompiler`]** - the seam the resolver compiles through
//! - **[`TypeCompiler`]** - typed recursive descent over a [`TypeRegistry`](crate::types::TypeRegistry)
//! - **[`compatibility`]** - legacy keyword rewriting for a second attempt

pub mod compatibility;
pub mod operators;
pub mod typed;

pub use compatibility::{replace_legacy_keywords, LEGACY_KEYWORDS};
pub use typed::TypeCompiler;

use crate::logging::codes;
use crate::syntax::error::AnalyzerResult;
use crate::types::TypeRef;
use crate::{log_debug, log_success};

/// Compiles expression text with `it` bound to a context type
///
/// Implementations must be shareable across threads; the analyzer holds
/// one instance and calls it concurrently.
pub trait ExpressionCompiler: Send + Sync {
    /// Static type of `text`, or the first error encountered
    fn compile(&self, context: &TypeRef, text: &str) -> AnalyzerResult<TypeRef>;
}

impl<C: ExpressionCompiler + ?Sized> ExpressionCompiler for &C {
    fn compile(&self, context: &TypeRef, text: &str) -> AnalyzerResult<TypeRef> {
        (**self).compile(context, text)
    }
}

impl<C: ExpressionCompiler + ?Sized> ExpressionCompiler for std::sync::Arc<C> {
    fn compile(&self, context: &TypeRef, text: &str) -> AnalyzerResult<TypeRef> {
        (**self).compile(context, text)
    }
}

/// Compile, and on a parse failure retry once with legacy keywords rewritten
///
/// A failed retry, or nothing to rewrite, returns the first error so its
/// position refers to `text`. A rejected construct (`?.`) is never retried.
pub fn compile_with_compatibility<C: ExpressionCompiler + ?Sized>(
    compiler: &C,
    context: &TypeRef,
    text: &str,
    retry_legacy_keywords: bool,
) -> AnalyzerResult<TypeRef> {
    let error = match compiler.compile(context, text) {
        Ok(ty) => return Ok(ty),
        Err(e) if e.is_parse_error() && retry_legacy_keywords => e,
        Err(e) => return Err(e),
    };

    let Some(rewritten) = replace_legacy_keywords(text) else {
        log_debug!("No legacy keywords to rewrite", "text" => text);
        return Err(error);
    };

    log_success!(codes::success::LEGACY_KEYWORDS_REWRITTEN, "Retrying with legacy keywords rewritten",
        "original" => text,
        "rewritten" => &rewritten
    );
    compiler.compile(context, &rewritten).map_err(|retry_error| {
        log_debug!("Rewritten text did not compile either",
            "rewritten" => &rewritten,
            "error" => &retry_error
        );
        error
    })
}
