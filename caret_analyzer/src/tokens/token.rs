//! Positioned tokens of the expression language
//!
//! Every operator has a dedicated symbol id. Word operators (`and`, `or`,
//! `not`, `mod`, `eq`, ...) are lexed as identifiers and then mapped onto the
//! matching symbol id, keeping their original text.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenId {
    /// End of input marker (position = text length)
    End,

    // === WORDS AND LITERALS ===
    Identifier,
    StringLiteral,
    IntegerLiteral,
    RealLiteral,

    // === PUNCTUATION ===
    Dot,              // .
    Comma,            // ,
    Colon,            // :
    OpenParen,        // (
    CloseParen,       // )
    OpenBracket,      // [
    CloseBracket,     // ]
    OpenCurlyParen,   // {
    CloseCurlyParen,  // }
    Question,         // ?
    NullCoalescing,   // ??
    NullPropagation,  // ?.
    Lambda,           // =>

    // === LOGICAL / BITWISE ===
    Exclamation,      // !
    DoubleAmpersand,  // &&
    Ampersand,        // &
    DoubleBar,        // ||
    Bar,              // |

    // === COMPARISON ===
    Equal,            // =
    DoubleEqual,      // ==
    ExclamationEqual, // !=
    LessGreater,      // <>
    LessThan,         // <
    LessThanEqual,    // <=
    GreaterThan,      // >
    GreaterThanEqual, // >=

    // === ARITHMETIC ===
    ShiftLeft,        // <<
    ShiftRight,       // >>
    Plus,             // +
    Minus,            // -
    Asterisk,         // *
    Slash,            // /
    Percent,          // %
}

impl TokenId {
    /// Canonical source spelling for symbols, a description for the rest
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenId::End => "end of expression",
            TokenId::Identifier => "identifier",
            TokenId::StringLiteral => "string literal",
            TokenId::IntegerLiteral => "integer literal",
            TokenId::RealLiteral => "real literal",
            TokenId::Dot => ".",
            TokenId::Comma => ",",
            TokenId::Colon => ":",
            TokenId::OpenParen => "(",
            TokenId::CloseParen => ")",
            TokenId::OpenBracket => "[",
            TokenId::CloseBracket => "]",
            TokenId::OpenCurlyParen => "{",
            TokenId::CloseCurlyParen => "}",
            TokenId::Question => "?",
            TokenId::NullCoalescing => "??",
            TokenId::NullPropagation => "?.",
            TokenId::Lambda => "=>",
            TokenId::Exclamation => "!",
            TokenId::DoubleAmpersand => "&&",
            TokenId::Ampersand => "&",
            TokenId::DoubleBar => "||",
            TokenId::Bar => "|",
            TokenId::Equal => "=",
            TokenId::DoubleEqual => "==",
            TokenId::ExclamationEqual => "!=",
            TokenId::LessGreater => "<>",
            TokenId::LessThan => "<",
            TokenId::LessThanEqual => "<=",
            TokenId::GreaterThan => ">",
            TokenId::GreaterThanEqual => ">=",
            TokenId::ShiftLeft => "<<",
            TokenId::ShiftRight => ">>",
            TokenId::Plus => "+",
            TokenId::Minus => "-",
            TokenId::Asterisk => "*",
            TokenId::Slash => "/",
            TokenId::Percent => "%",
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenId::StringLiteral | TokenId::IntegerLiteral | TokenId::RealLiteral
        )
    }

    pub fn is_numeric_literal(&self) -> bool {
        matches!(self, TokenId::IntegerLiteral | TokenId::RealLiteral)
    }

    pub fn is_comparison_operator(&self) -> bool {
        matches!(
            self,
            TokenId::Equal
                | TokenId::DoubleEqual
                | TokenId::ExclamationEqual
                | TokenId::LessGreater
                | TokenId::LessThan
                | TokenId::LessThanEqual
                | TokenId::GreaterThan
                | TokenId::GreaterThanEqual
        )
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a word operator onto its symbol id (case-insensitive)
pub fn classify_operator_word(word: &str) -> Option<TokenId> {
    match word.to_ascii_lowercase().as_str() {
        "eq" => Some(TokenId::Equal),
        "ne" | "neq" => Some(TokenId::ExclamationEqual),
        "lt" => Some(TokenId::LessThan),
        "le" => Some(TokenId::LessThanEqual),
        "gt" => Some(TokenId::GreaterThan),
        "ge" => Some(TokenId::GreaterThanEqual),
        "and" => Some(TokenId::DoubleAmpersand),
        "or" => Some(TokenId::DoubleBar),
        "not" => Some(TokenId::Exclamation),
        "mod" => Some(TokenId::Percent),
        _ => None,
    }
}

/// A token with its raw text and byte offset
///
/// Text is owned so the two permitted rewrites (identifier sanitizing and
/// unary-minus folding) can be applied in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub text: String,
    pub pos: usize,
}

impl Token {
    pub fn new(id: TokenId, text: impl Into<String>, pos: usize) -> Self {
        Self {
            id,
            text: text.into(),
            pos,
        }
    }

    pub fn end(pos: usize) -> Self {
        Self::new(TokenId::End, "", pos)
    }

    pub fn is(&self, id: TokenId) -> bool {
        self.id == id
    }

    pub fn is_end(&self) -> bool {
        self.id == TokenId::End
    }

    /// Byte offset just past the token's text
    pub fn end_pos(&self) -> usize {
        self.pos + self.text.len()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            TokenId::End => write!(f, "<end>@{}", self.pos),
            _ => write!(f, "{:?}('{}')@{}", self.id, self.text, self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_words() {
        assert_eq!(classify_operator_word("AND"), Some(TokenId::DoubleAmpersand));
        assert_eq!(classify_operator_word("neq"), Some(TokenId::ExclamationEqual));
        assert_eq!(classify_operator_word("Mod"), Some(TokenId::Percent));
        assert_eq!(classify_operator_word("in"), None);
        assert_eq!(classify_operator_word("it"), None);
    }

    #[test]
    fn test_token_helpers() {
        let token = Token::new(TokenId::IntegerLiteral, "42", 3);
        assert!(token.is(TokenId::IntegerLiteral));
        assert!(token.id.is_numeric_literal());
        assert_eq!(token.end_pos(), 5);
        assert_eq!(token.to_string(), "IntegerLiteral('42')@3");

        let end = Token::end(5);
        assert!(end.is_end());
        assert_eq!(end.to_string(), "<end>@5");
    }

    #[test]
    fn test_symbol_spelling() {
        assert_eq!(TokenId::NullPropagation.as_str(), "?.");
        assert_eq!(TokenId::LessGreater.to_string(), "<>");
        assert!(TokenId::LessGreater.is_comparison_operator());
        assert!(!TokenId::ShiftLeft.is_comparison_operator());
    }
}
