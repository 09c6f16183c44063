//! Legacy keyword normalization
//!
//! Older expressions spell predefined types with their lower-case CLR names
//! (`int32`, `datetime`). Those are rewritten to the current keywords so a
//! failed compilation can be retried once.

use crate::lexical::tokenize;
use crate::tokens::{Token, TokenId};

/// Legacy spelling and its replacement; matching is exact
pub const LEGACY_KEYWORDS: [(&str, &str); 14] = [
    ("boolean", "bool"),
    ("datetime", "DateTime"),
    ("datetimeoffset", "DateTimeOffset"),
    ("guid", "Guid"),
    ("int16", "short"),
    ("int32", "int"),
    ("int64", "long"),
    ("single", "float"),
    ("timespan", "TimeSpan"),
    ("uint32", "uint"),
    ("uint64", "ulong"),
    ("uint16", "ushort"),
    ("math", "Math"),
    ("convert", "Convert"),
];

fn legacy_replacement(word: &str) -> Option<&'static str> {
    LEGACY_KEYWORDS
        .iter()
        .find(|(legacy, _)| *legacy == word)
        .map(|(_, keyword)| *keyword)
}

/// Rewrite legacy keywords, or `None` when nothing changed
///
/// Identifiers directly after a `.` are member names and are left alone.
/// Text the lexer rejects is returned as `None`.
pub fn replace_legacy_keywords(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let tokens = tokenize(text).ok()?;

    let mut replacements: Vec<(&Token, &'static str)> = Vec::new();
    let mut previous: Option<TokenId> = None;
    for token in &tokens {
        if token.id == TokenId::Identifier && previous != Some(TokenId::Dot) {
            if let Some(keyword) = legacy_replacement(&token.text) {
                replacements.push((token, keyword));
            }
        }
        previous = Some(token.id);
    }

    if replacements.is_empty() {
        return None;
    }

    let mut result = text.to_string();
    for (token, keyword) in replacements.iter().rev() {
        result.replace_range(token.pos..token.pos + token.text.len(), keyword);
    }
    Some(result)
}
