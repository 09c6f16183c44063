//! Caret analysis: the public entry point
//!
//! Truncates the text at the caret, recovers the trailing fragment with the
//! [`FragmentLocator`] and resolves its type with the [`TypeResolver`].

use crate::compiler::{ExpressionCompiler, TypeCompiler};
use crate::config::compile_time::lexical::MAX_SOURCE_LENGTH;
use crate::config::runtime::ParsingPreferences;
use crate::logging::codes;
use crate::resolution::{Resolution, TypeResolver};
use crate::syntax::error::{AnalyzerError, AnalyzerResult, ParseError};
use crate::syntax::locator::FragmentLocator;
use crate::types::{TypeRef, TypeRegistry};
use crate::log_success;
use serde::Serialize;
use std::sync::Arc;

/// What the caret points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub ty: Option<TypeRef>,
    pub is_class_identifier: bool,
    pub fragment: String,
    pub fragment_start: usize,
    /// Grammar error the locator recovered from, if any
    pub stopped_by: Option<ParseError>,
}

impl Analysis {
    pub fn resolution(&self) -> Resolution {
        Resolution {
            ty: self.ty.clone(),
            is_class_identifier: self.is_class_identifier,
        }
    }

    /// Serializable view with the type reduced to its full name
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            type_name: self.ty.as_ref().map(|t| t.full_name()),
            is_class_identifier: self.is_class_identifier,
            fragment: self.fragment.clone(),
            fragment_start: self.fragment_start,
            stopped_by: self.stopped_by.as_ref().map(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub is_class_identifier: bool,
    pub fragment: String,
    pub fragment_start: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_by: Option<String>,
}

/// Text before the caret, minus a `.` directly before it
pub fn truncate_at_caret(text: &str, caret: usize) -> AnalyzerResult<&str> {
    if text.len() > MAX_SOURCE_LENGTH {
        return Err(AnalyzerError::SourceTooLarge { length: text.len() });
    }
    let Some(before) = text.get(..caret) else {
        return Err(AnalyzerError::InvalidCaret {
            caret,
            length: text.len(),
        });
    };
    Ok(before.strip_suffix('.').unwrap_or(before))
}

/// Stateless analyzer; one instance can serve any number of threads
#[derive(Debug, Clone)]
pub struct CaretAnalyzer<C = TypeCompiler> {
    locator: FragmentLocator,
    resolver: TypeResolver<C>,
}

impl CaretAnalyzer<TypeCompiler> {
    /// Analyzer over the reference compiler
    pub fn with_registry(registry: Arc<TypeRegistry>, preferences: ParsingPreferences) -> Self {
        let compiler = TypeCompiler::new(registry, preferences.clone());
        Self::new(compiler, preferences)
    }
}

impl<C: ExpressionCompiler> CaretAnalyzer<C> {
    pub fn new(compiler: C, preferences: ParsingPreferences) -> Self {
        let retry = preferences.retry_legacy_keywords;
        Self {
            locator: FragmentLocator::new(preferences),
            resolver: TypeResolver::new(compiler, retry),
        }
    }

    pub fn preferences(&self) -> &ParsingPreferences {
        self.locator.preferences()
    }

    pub fn resolver(&self) -> &TypeResolver<C> {
        &self.resolver
    }

    /// Type of the fragment ending at `caret` (a byte offset into `text`)
    pub fn analyze(&self, context: &TypeRef, text: &str, caret: usize) -> AnalyzerResult<Analysis> {
        let truncated = truncate_at_caret(text, caret)?;
        let located = self.locator.locate(truncated)?;
        let resolution = self.resolver.resolve(context, &located.fragment)?;

        log_success!(codes::success::ANALYSIS_COMPLETED, "Caret analysis completed",
            "caret" => caret,
            "fragment" => &located.fragment,
            "class_identifier" => resolution.is_class_identifier
        );

        Ok(Analysis {
            ty: resolution.ty,
            is_class_identifier: resolution.is_class_identifier,
            fragment: located.fragment,
            fragment_start: located.fragment_start,
            stopped_by: located.stopped_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::StringLiteralParsing;
    use crate::syntax::error::ParseErrorKind;
    use crate::types::{builtin, TypeModel};
    use assert_matches::assert_matches;

    const MODEL: &str = r#"
        context = "Rig.Frame"

        [[types]]
        namespace = "Rig"
        name = "Frame"
        properties = [
            { name = "Timestamp", type = "System.DateTime" },
            { name = "Intensity", type = "System.Double" },
            { name = "Label", type = "System.String" },
            { name = "Points", type = "Rig.Point[]" },
        ]
        methods = [
            { name = "Scale", parameters = [{ name = "x", type = "System.Int32" }, { name = "y", type = "System.Int32" }], returns = "Rig.Point" },
        ]

        [[types]]
        namespace = "Rig"
        name = "Point"
        kind = "struct"
        properties = [{ name = "X", type = "System.Int32" }, { name = "Y", type = "System.Int32" }]
    "#;

    fn analyzer_with(preferences: ParsingPreferences) -> (CaretAnalyzer, TypeRef) {
        let loaded = TypeModel::from_toml_str(MODEL).unwrap().into_registry().unwrap();
        (
            CaretAnalyzer::with_registry(Arc::new(loaded.registry), preferences),
            loaded.context.unwrap(),
        )
    }

    fn analyzer() -> (CaretAnalyzer, TypeRef) {
        analyzer_with(ParsingPreferences::default())
    }

    fn analyze_end(text: &str) -> Analysis {
        let (analyzer, context) = analyzer();
        analyzer.analyze(&context, text, text.len()).unwrap()
    }

    fn type_name(analysis: &Analysis) -> Option<String> {
        analysis.ty.as_ref().map(|t| t.full_name())
    }

    #[test]
    fn test_member_after_dot() {
        let analysis = analyze_end("it.Timestamp.");
        assert_eq!(analysis.fragment, "it.Timestamp");
        assert_eq!(type_name(&analysis).as_deref(), Some(builtin::DATE_TIME));
        assert!(!analysis.is_class_identifier);
    }

    #[test]
    fn test_it_dot_is_the_context() {
        // the dot before the caret is dropped, leaving `it`
        let analysis = analyze_end("it.");
        assert_eq!(analysis.fragment, "it");
        assert_eq!(type_name(&analysis).as_deref(), Some("Rig.Frame"));
        assert!(!analysis.is_class_identifier);

        let analysis = analyze_end(".");
        assert_eq!(analysis.fragment, "");
        assert_eq!(analysis.ty, None);
    }

    #[test]
    fn test_empty_fragment() {
        let (analyzer, context) = analyzer();
        let analysis = analyzer.analyze(&context, "it.Label", 0).unwrap();
        assert_eq!(analysis.fragment, "");
        assert_eq!(analysis.ty, None);
        assert!(!analysis.is_class_identifier);

        let analysis = analyze_end(".");
        assert_eq!(analysis.ty, None);
    }

    #[test]
    fn test_trailing_fragment_of_larger_expression() {
        let analysis = analyze_end("it.Intensity > 2 && it.Label.");
        assert_eq!(analysis.fragment, "it.Label");
        assert_eq!(analysis.fragment_start, 20);
        assert_eq!(type_name(&analysis).as_deref(), Some(builtin::STRING));
    }

    #[test]
    fn test_class_identifier() {
        let analysis = analyze_end("it.Intensity * Math.");
        assert_eq!(analysis.fragment, "Math");
        assert_eq!(analysis.fragment_start, 15);
        assert!(analysis.is_class_identifier);
        assert_eq!(type_name(&analysis).as_deref(), Some(builtin::MATH));

        let analysis = analyze_end("1 + Math.");
        assert_eq!(analysis.fragment, "Math");
        assert_eq!(type_name(&analysis).as_deref(), Some(builtin::MATH));

        let analysis = analyze_end("frame.");
        assert!(analysis.is_class_identifier);
        assert_eq!(type_name(&analysis).as_deref(), Some("Rig.Frame"));
    }

    #[test]
    fn test_plus_after_member_continues_nested_chain() {
        // `+` after an identifier chain is a nested-class separator
        let (analyzer, context) = analyzer();
        let text = "it.Intensity + Math.";
        assert_matches!(
            analyzer.analyze(&context, text, text.len()),
            Err(AnalyzerError::Parse(ParseError { kind: ParseErrorKind::DotOrOpenParenExpected, position: 19 }))
        );
    }

    #[test]
    fn test_inside_argument_list() {
        let analysis = analyze_end("it.Scale(1, it.Points[0].");
        assert_eq!(analysis.fragment, "it.Points[0]");
        assert_eq!(type_name(&analysis).as_deref(), Some("Rig.Point"));
        assert!(analysis.stopped_by.is_some());
    }

    #[test]
    fn test_unfinished_argument_list_does_not_fail() {
        let (analyzer, context) = analyzer();
        let text = "it.Scale(1, 2";
        let located = analyzer.locator.locate(text).unwrap();
        assert!(located.stopped_by.is_some());
        assert!(analyzer.analyze(&context, text, text.len()).is_ok());
    }

    #[test]
    fn test_mid_expression_caret() {
        let (analyzer, context) = analyzer();
        let text = "it.Label.Length + it.Intensity";
        let analysis = analyzer.analyze(&context, text, 9).unwrap();
        assert_eq!(analysis.fragment, "it.Label");
        assert_eq!(type_name(&analysis).as_deref(), Some(builtin::STRING));
    }

    #[test]
    fn test_negative_literals_resolve_alike() {
        let folded = analyze_end("-1");
        let spaced = analyze_end("- 1");
        assert_eq!(type_name(&folded), type_name(&spaced));
        assert_eq!(type_name(&folded).as_deref(), Some(builtin::INT32));
    }

    #[test]
    fn test_in_lists_parse() {
        for text in ["it.Points[0].X in (1,2,3)", "it.Points[0].X in (-1, 2)"] {
            let analysis = analyze_end(text);
            assert_eq!(analysis.stopped_by, None, "{}", text);
            assert_eq!(type_name(&analysis).as_deref(), Some(builtin::BOOLEAN), "{}", text);
        }
    }

    #[test]
    fn test_string_dialects() {
        let (analyzer, context) = analyzer();
        let analysis = analyzer.analyze(&context, "\"a\\tb\".", 7).unwrap();
        assert_eq!(type_name(&analysis).as_deref(), Some(builtin::STRING));

        let (analyzer, context) = analyzer_with(ParsingPreferences {
            string_literal_parsing: StringLiteralParsing::EscapeDoubleQuoteByTwoDoubleQuotes,
            ..ParsingPreferences::default()
        });
        let text = "\"a\"\"b\".";
        let analysis = analyzer.analyze(&context, text, text.len()).unwrap();
        assert_eq!(type_name(&analysis).as_deref(), Some(builtin::STRING));
    }

    #[test]
    fn test_idempotent() {
        let (analyzer, context) = analyzer();
        let text = "it.Points.Where(X > 1).";
        let first = analyzer.analyze(&context, text, text.len()).unwrap();
        let second = analyzer.analyze(&context, text, text.len()).unwrap();
        assert_eq!(first, second);
        assert_eq!(type_name(&first).as_deref(), Some("Rig.Point[]"));
    }

    #[test]
    fn test_invalid_caret() {
        let (analyzer, context) = analyzer();
        assert_matches!(
            analyzer.analyze(&context, "it", 3),
            Err(AnalyzerError::InvalidCaret { caret: 3, length: 2 })
        );
        assert_matches!(
            analyzer.analyze(&context, "\"é\"", 2),
            Err(AnalyzerError::InvalidCaret { .. })
        );
    }

    #[test]
    fn test_source_too_large() {
        let (analyzer, context) = analyzer();
        let text = "a".repeat(MAX_SOURCE_LENGTH + 1);
        assert_matches!(
            analyzer.analyze(&context, &text, 1),
            Err(AnalyzerError::SourceTooLarge { .. })
        );
    }

    #[test]
    fn test_null_propagation_is_rejected() {
        let text = "it.Label?.Length + it.";
        let (analyzer, context) = analyzer();
        assert_matches!(
            analyzer.analyze(&context, text, text.len()),
            Err(AnalyzerError::NotSupported { position: 8, .. })
        );
    }

    #[test]
    fn test_unresolvable_fragment() {
        let (analyzer, context) = analyzer();
        let text = "it.Missing.";
        assert_matches!(
            analyzer.analyze(&context, text, text.len()),
            Err(AnalyzerError::Parse(ParseError {
                kind: ParseErrorKind::UnknownPropertyOrField { .. },
                ..
            }))
        );
    }

    #[test]
    fn test_report_serializes_type_name() {
        let report = analyze_end("it.Label.").report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "System.String");
        assert_eq!(json["fragment"], "it.Label");
        assert!(json.get("stopped_by").is_none());
    }

    #[test]
    fn test_shared_across_threads() {
        let (analyzer, context) = analyzer();
        let analyzer = Arc::new(analyzer);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let analyzer = Arc::clone(&analyzer);
                let context = context.clone();
                std::thread::spawn(move || {
                    let text = "it.Timestamp.";
                    analyzer.analyze(&context, text, text.len()).unwrap().ty.unwrap().full_name()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), builtin::DATE_TIME);
        }
    }
}
