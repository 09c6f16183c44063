//! Completion lists for the member popup
//!
//! The caret is moved back to the start of the word being typed, the
//! expression before that word is analyzed, and the members of the
//! resulting type are listed. Static members are listed after a type name,
//! instance members otherwise.

use crate::analysis::CaretAnalyzer;
use crate::compiler::{ExpressionCompiler, TypeCompiler};
use crate::config::runtime::{CompletionPreferences, ParsingPreferences};
use crate::logging::codes;
use crate::syntax::error::{AnalyzerError, AnalyzerResult};
use crate::types::members::member_names;
use crate::types::{Binding, TypeRef, TypeRegistry};
use crate::log_success;
use serde::Serialize;
use std::sync::Arc;

const IT_KEYWORD: &str = "it";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Variable,
    Field,
    Property,
    Method,
}

impl CompletionKind {
    /// Image index the editor registers for this kind
    pub fn icon(self) -> i32 {
        match self {
            CompletionKind::Variable => -1,
            CompletionKind::Field => 0,
            CompletionKind::Property => 1,
            CompletionKind::Method => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub name: String,
    pub kind: CompletionKind,
}

impl CompletionItem {
    fn new(name: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionList {
    /// Full name of the type whose members are listed
    pub type_name: String,
    pub is_static: bool,
    /// Byte offset of the word being completed
    pub word_start: usize,
    /// Bytes of that word already typed before the caret
    pub length_entered: usize,
    pub items: Vec<CompletionItem>,
}

impl CompletionList {
    /// `name<type_separator>icon` entries joined by `separator`
    pub fn to_autocomplete_string(&self, separator: char, type_separator: char) -> String {
        let mut list = String::new();
        for item in &self.items {
            if !list.is_empty() {
                list.push(separator);
            }
            list.push_str(&item.name);
            list.push(type_separator);
            list.push_str(&item.kind.icon().to_string());
        }
        list
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.name.as_str())
    }
}

/// Start of the identifier-like word ending at `caret`
pub fn word_start(text: &str, caret: usize) -> Option<usize> {
    let before = text.get(..caret)?;
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map_or(caret, |(i, _)| i);
    Some(start)
}

#[derive(Debug, Clone)]
pub struct CompletionProvider<C = TypeCompiler> {
    analyzer: CaretAnalyzer<C>,
    registry: Arc<TypeRegistry>,
    preferences: CompletionPreferences,
}

impl CompletionProvider<TypeCompiler> {
    pub fn with_registry(
        registry: Arc<TypeRegistry>,
        parsing: ParsingPreferences,
        preferences: CompletionPreferences,
    ) -> Self {
        let analyzer = CaretAnalyzer::with_registry(Arc::clone(&registry), parsing);
        Self::new(analyzer, registry, preferences)
    }
}

impl<C: ExpressionCompiler> CompletionProvider<C> {
    /// `registry` supplies member lists and must be the one `analyzer` compiles against
    pub fn new(
        analyzer: CaretAnalyzer<C>,
        registry: Arc<TypeRegistry>,
        preferences: CompletionPreferences,
    ) -> Self {
        Self {
            analyzer,
            registry,
            preferences,
        }
    }

    pub fn analyzer(&self) -> &CaretAnalyzer<C> {
        &self.analyzer
    }

    pub fn preferences(&self) -> &CompletionPreferences {
        &self.preferences
    }

    /// Members to offer at `caret`, or `None` when the text before the word does not parse
    pub fn complete(
        &self,
        context: &TypeRef,
        text: &str,
        caret: usize,
    ) -> AnalyzerResult<Option<CompletionList>> {
        let word_start = word_start(text, caret).ok_or(AnalyzerError::InvalidCaret {
            caret,
            length: text.len(),
        })?;
        // one character before the word, usually the `.`
        let analysis_caret = text[..word_start]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i);

        let analysis = match self.analyzer.analyze(context, text, analysis_caret) {
            Ok(analysis) => analysis,
            Err(error) if error.is_parse_error() => return Ok(None),
            Err(error) => return Err(error),
        };

        let mut items = Vec::new();
        let ty = match analysis.ty {
            Some(ty) => ty,
            None => {
                items.push(CompletionItem::new(IT_KEYWORD, CompletionKind::Variable));
                context.clone()
            }
        };
        let binding = if analysis.is_class_identifier {
            Binding::Static
        } else {
            Binding::Instance
        };

        let mut names = member_names(
            &self.registry,
            &ty,
            binding,
            self.preferences.include_inherited_members,
        );
        names.fields.sort();
        names.properties.sort();
        names.methods.sort();

        if !(ty.is_enum() && binding == Binding::Instance) {
            items.extend(names.fields.into_iter().map(|n| CompletionItem::new(n, CompletionKind::Field)));
        }
        items.extend(names.properties.into_iter().map(|n| CompletionItem::new(n, CompletionKind::Property)));
        items.extend(names.methods.into_iter().map(|n| CompletionItem::new(n, CompletionKind::Method)));

        log_success!(codes::success::COMPLETION_LIST_BUILT, "Completion list built",
            "type" => ty.full_name(),
            "items" => items.len()
        );

        Ok(Some(CompletionList {
            type_name: ty.full_name(),
            is_static: binding == Binding::Static,
            word_start,
            length_entered: caret - word_start,
            items,
        }))
    }

    /// [`complete`](Self::complete) rendered with the configured separators
    pub fn autocomplete_string(
        &self,
        context: &TypeRef,
        text: &str,
        caret: usize,
    ) -> AnalyzerResult<Option<String>> {
        Ok(self.complete(context, text, caret)?.map(|list| {
            list.to_autocomplete_string(self.preferences.separator, self.preferences.type_separator)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{builtin, TypeBuilder};
    use assert_matches::assert_matches;

    fn provider() -> (CompletionProvider, TypeRef) {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeBuilder::class("Zoo", "Animal")
                    .property("Name", builtin::STRING)
                    .method("Feed", &[], builtin::BOOLEAN)
                    .build(),
            )
            .unwrap();
        registry
            .register(TypeBuilder::enumeration("Zoo", "Diet", &["Herbivore", "Carnivore"]).build())
            .unwrap();
        let context = registry
            .register(
                TypeBuilder::class("Zoo", "Keeper")
                    .base("Zoo.Animal")
                    .field("badge", builtin::INT32)
                    .property("Age", builtin::INT32)
                    .property("Diet", "Zoo.Diet")
                    .static_property("Shift", builtin::TIME_SPAN)
                    .method("Greet", &[builtin::STRING], builtin::STRING)
                    .method("Greet", &[], builtin::STRING)
                    .build(),
            )
            .unwrap();
        let preferences = CompletionPreferences {
            separator: ';',
            type_separator: '?',
            include_inherited_members: true,
        };
        (
            CompletionProvider::with_registry(Arc::new(registry), ParsingPreferences::default(), preferences),
            context,
        )
    }

    fn complete(text: &str) -> CompletionList {
        let (provider, context) = provider();
        provider.complete(&context, text, text.len()).unwrap().unwrap()
    }

    #[test]
    fn test_word_start() {
        assert_eq!(word_start("it.Na", 5), Some(3));
        assert_eq!(word_start("it.", 3), Some(3));
        assert_eq!(word_start("abc_1", 5), Some(0));
        assert_eq!(word_start("x + é", 6), Some(4));
        assert_eq!(word_start("é", 1), None);
    }

    #[test]
    fn test_instance_members_grouped_and_sorted() {
        let list = complete("it.");
        assert_eq!(list.type_name, "Zoo.Keeper");
        assert!(!list.is_static);
        assert_eq!(
            list.names().collect::<Vec<_>>(),
            vec!["badge", "Age", "Diet", "Name", "Equals", "Feed", "GetHashCode", "Greet", "ToString"]
        );
        assert_eq!(
            list.to_autocomplete_string(';', '?'),
            "badge?0;Age?1;Diet?1;Name?1;Equals?2;Feed?2;GetHashCode?2;Greet?2;ToString?2"
        );
    }

    #[test]
    fn test_partial_word() {
        let list = complete("it.Age > 3 && it.Na");
        assert_eq!(list.word_start, 17);
        assert_eq!(list.length_entered, 2);
        assert_eq!(list.type_name, "Zoo.Keeper");
    }

    #[test]
    fn test_empty_text_offers_it() {
        let list = complete("");
        assert_eq!(list.items[0], CompletionItem::new("it", CompletionKind::Variable));
        assert_eq!(list.type_name, "Zoo.Keeper");
        assert!(list.to_autocomplete_string(';', '?').starts_with("it?-1;badge?0"));
    }

    #[test]
    fn test_static_members_after_type_name() {
        let list = complete("DateTime.");
        assert!(list.is_static);
        let names: Vec<_> = list.names().collect();
        assert!(names.contains(&"Now"));
        assert!(names.contains(&"Parse"));
        assert!(!names.contains(&"Year"));

        let list = complete("keeper.");
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["Shift"]);
    }

    #[test]
    fn test_enum_fields_skipped_for_instances() {
        let list = complete("it.Diet.");
        assert_eq!(list.type_name, "Zoo.Diet");
        assert!(list.items.iter().all(|i| i.kind != CompletionKind::Field));
        assert!(list.names().any(|n| n == "ToString"));
    }

    #[test]
    fn test_declared_members_only() {
        let (mut provider, context) = provider();
        provider.preferences.include_inherited_members = false;
        let list = provider.complete(&context, "it.", 3).unwrap().unwrap();
        assert!(!list.names().any(|n| n == "Name" || n == "ToString"));
    }

    #[test]
    fn test_parse_failure_is_no_completion() {
        let (provider, context) = provider();
        assert_eq!(provider.complete(&context, "it.Missing.", 11).unwrap(), None);
        assert_eq!(provider.autocomplete_string(&context, "it.Missing.", 11).unwrap(), None);
    }

    #[test]
    fn test_unsupported_construct_propagates() {
        let (provider, context) = provider();
        let text = "it?.Name.";
        assert_matches!(
            provider.complete(&context, text, text.len()),
            Err(AnalyzerError::NotSupported { .. })
        );
        assert_matches!(
            provider.complete(&context, text, 100),
            Err(AnalyzerError::InvalidCaret { caret: 100, .. })
        );
    }

    #[test]
    fn test_serializes_kinds() {
        let json = serde_json::to_value(complete("it.")).unwrap();
        assert_eq!(json["items"][0]["kind"], "field");
        assert_eq!(json["type_name"], "Zoo.Keeper");
    }
}
