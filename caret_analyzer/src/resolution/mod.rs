//! Type resolution of a located fragment
//!
//! A fragment is first compiled as a value expression with `it` bound to
//! the context type. When that fails, the fragment may still be a bare type
//! name (`DateTime`, `math`), which the compiler rejects because a type must
//! be followed by `.` or `(`. Those are matched case-insensitively against
//! the well-known type table and the context type's own name.

use crate::compiler::{compile_with_compatibility, ExpressionCompiler};
use crate::logging::codes;
use crate::syntax::error::AnalyzerResult;
use crate::types::builtin::{builtin_types, WELL_KNOWN_TYPES};
use crate::types::TypeRef;
use crate::utils::Span;
use crate::{log_error, log_success};

/// Resolved type of a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `None` only for an empty fragment
    pub ty: Option<TypeRef>,
    /// The fragment named a type rather than a value
    pub is_class_identifier: bool,
}

impl Resolution {
    pub fn empty() -> Self {
        Self {
            ty: None,
            is_class_identifier: false,
        }
    }

    pub fn value(ty: TypeRef) -> Self {
        Self {
            ty: Some(ty),
            is_class_identifier: false,
        }
    }

    pub fn class_identifier(ty: TypeRef) -> Self {
        Self {
            ty: Some(ty),
            is_class_identifier: true,
        }
    }
}

/// Compile-then-match resolver over any [`ExpressionCompiler`]
#[derive(Debug, Clone)]
pub struct TypeResolver<C> {
    compiler: C,
    retry_legacy_keywords: bool,
}

impl<C: ExpressionCompiler> TypeResolver<C> {
    pub fn new(compiler: C, retry_legacy_keywords: bool) -> Self {
        Self {
            compiler,
            retry_legacy_keywords,
        }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Resolve `fragment` against `context`
    ///
    /// Fails with the compilation error only when the fragment is neither a
    /// valid expression nor a known type name.
    pub fn resolve(&self, context: &TypeRef, fragment: &str) -> AnalyzerResult<Resolution> {
        if fragment.is_empty() {
            return Ok(Resolution::empty());
        }

        let error = match compile_with_compatibility(
            &self.compiler,
            context,
            fragment,
            self.retry_legacy_keywords,
        ) {
            Ok(ty) => return Ok(Resolution::value(ty)),
            Err(error) => error,
        };

        match match_class_identifier(context, fragment) {
            Some(ty) => {
                log_success!(codes::success::CLASS_IDENTIFIER_MATCHED, "Fragment matched a type name",
                    "fragment" => fragment,
                    "type" => ty.full_name()
                );
                Ok(Resolution::class_identifier(ty))
            }
            None => {
                let span = Span::point(fragment, error.position().unwrap_or(0));
                log_error!(codes::resolution::FRAGMENT_UNRESOLVED, "Fragment could not be resolved",
                    span = span,
                    "fragment" => fragment,
                    "error" => &error
                );
                Err(error)
            }
        }
    }
}

/// First well-known type, then the context type, whose simple name equals `fragment` ignoring case
pub fn match_class_identifier(context: &TypeRef, fragment: &str) -> Option<TypeRef> {
    WELL_KNOWN_TYPES
        .iter()
        .filter_map(|name| builtin_types().iter().find(|t| t.full_name() == *name))
        .chain(std::iter::once(context))
        .find(|ty| ty.name.eq_ignore_ascii_case(fragment))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TypeCompiler;
    use crate::config::runtime::ParsingPreferences;
    use crate::syntax::error::{AnalyzerError, ParseError, ParseErrorKind};
    use crate::types::{builtin, TypeBuilder, TypeRegistry};
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn resolver(retry: bool) -> (TypeResolver<TypeCompiler>, TypeRef) {
        let mut registry = TypeRegistry::new();
        let context = registry
            .register(
                TypeBuilder::class("Acquisition", "Sample")
                    .property("Value", builtin::DOUBLE)
                    .property("Label", builtin::STRING)
                    .build(),
            )
            .unwrap();
        let compiler = TypeCompiler::new(Arc::new(registry), ParsingPreferences::default());
        (TypeResolver::new(compiler, retry), context)
    }

    #[test]
    fn test_empty_fragment() {
        let (resolver, context) = resolver(true);
        assert_eq!(resolver.resolve(&context, "").unwrap(), Resolution::empty());
    }

    #[test]
    fn test_value_expression() {
        let (resolver, context) = resolver(true);
        let resolution = resolver.resolve(&context, "it.Value").unwrap();
        assert_eq!(resolution.ty.unwrap().full_name(), builtin::DOUBLE);
        assert!(!resolution.is_class_identifier);
    }

    #[test]
    fn test_bare_type_names_are_class_identifiers() {
        let (resolver, context) = resolver(true);
        for (fragment, expected) in [
            ("DateTime", builtin::DATE_TIME),
            ("datetime", builtin::DATE_TIME),
            ("MATH", builtin::MATH),
            ("Int32", builtin::INT32),
            ("int32", builtin::INT32),
            ("sample", "Acquisition.Sample"),
        ] {
            let resolution = resolver.resolve(&context, fragment).unwrap();
            assert!(resolution.is_class_identifier, "{}", fragment);
            assert_eq!(resolution.ty.unwrap().full_name(), expected, "{}", fragment);
        }
    }

    #[test]
    fn test_aliases_are_not_class_identifiers() {
        // `int` is a keyword alias, not a simple name in the table
        let (resolver, context) = resolver(true);
        assert_matches!(
            resolver.resolve(&context, "int"),
            Err(AnalyzerError::Parse(ParseError { kind: ParseErrorKind::DotOrOpenParenExpected, .. }))
        );
    }

    #[test]
    fn test_legacy_keywords_are_retried() {
        let (lenient, context) = resolver(true);
        let resolution = lenient.resolve(&context, "int32.MaxValue").unwrap();
        assert_eq!(resolution.ty.unwrap().full_name(), builtin::INT32);
        assert!(!resolution.is_class_identifier);

        let (strict, context) = resolver(false);
        assert!(strict.resolve(&context, "int32.MaxValue").is_err());
    }

    #[test]
    fn test_unresolved_fragment_returns_compile_error() {
        let (resolver, context) = resolver(true);
        assert_matches!(
            resolver.resolve(&context, "Missing"),
            Err(AnalyzerError::Parse(ParseError { kind: ParseErrorKind::UnknownIdentifier(name), position: 0 }))
                if name == "Missing"
        );
    }

    #[test]
    fn test_failed_legacy_retry_reports_first_error() {
        // `int.Missing` fails at offset 4 of the rewritten text; the user wrote `int32`
        let (resolver, context) = resolver(true);
        assert_matches!(
            resolver.resolve(&context, "int32.Missing"),
            Err(AnalyzerError::Parse(ParseError { kind: ParseErrorKind::UnknownIdentifier(name), position: 0 }))
                if name == "int32"
        );
    }

    #[test]
    fn test_well_known_table_order() {
        let context = TypeBuilder::class("Custom", "Object").build_ref();
        // the predefined Object wins over a context type with the same simple name
        let matched = match_class_identifier(&context, "object").unwrap();
        assert_eq!(matched.full_name(), builtin::OBJECT);
        assert!(match_class_identifier(&context, "DayOfWeek").is_none());
    }
}
