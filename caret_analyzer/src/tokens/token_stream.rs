//! Lazy, cheaply clonable token stream
//!
//! The stream owns a shared handle to the text plus a cursor. Cloning it
//! gives an independent cursor over the same text, which is how one-token
//! lookahead decisions are made without disturbing the main parse.

use crate::lexical::LexicalAnalyzer;
use crate::syntax::error::{ParseError, ParseErrorKind, ParseResult};
use crate::tokens::token::{Token, TokenId};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TokenStream {
    text: Arc<str>,
    /// Byte offset where the token after `current` starts scanning
    cursor: usize,
    current: Token,
}

impl TokenStream {
    /// Create a stream positioned on the first token
    pub fn new(text: impl Into<Arc<str>>) -> ParseResult<Self> {
        let text = text.into();
        let current = LexicalAnalyzer::new(&text).scan(0, None)?;
        let cursor = current.end_pos();
        Ok(Self {
            text,
            cursor,
            current,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Mutable access for the sanctioned rewrites of the current token
    pub fn current_mut(&mut self) -> &mut Token {
        &mut self.current
    }

    pub fn is_end(&self) -> bool {
        self.current.is_end()
    }

    /// Advance to the next token; at the end the `End` token repeats
    pub fn next_token(&mut self) -> ParseResult<()> {
        if self.current.is_end() {
            return Ok(());
        }
        let token = LexicalAnalyzer::new(&self.text).scan(self.cursor, Some(self.current.id))?;
        self.cursor = token.end_pos().max(self.cursor);
        self.current = token;
        Ok(())
    }

    /// The token after the current one, without advancing
    pub fn peek(&self) -> ParseResult<Token> {
        let mut lookahead = self.clone();
        lookahead.next_token()?;
        Ok(lookahead.current)
    }

    /// Fail with `kind` at the current token unless it has the expected id
    pub fn validate(&self, id: TokenId, kind: ParseErrorKind) -> ParseResult<()> {
        if self.current.id == id {
            Ok(())
        } else {
            Err(self.error(kind))
        }
    }

    /// Build an error positioned at the current token
    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.current.pos)
    }

    /// Whether the current token is the identifier `text` (case-insensitive)
    pub fn token_is_identifier(&self, text: &str) -> bool {
        self.current.id == TokenId::Identifier && self.current.text.eq_ignore_ascii_case(text)
    }

    /// Whether the current token is one of the identifiers (exact match) or one of the ids
    pub fn try_get_token(&self, identifiers: &[&str], ids: &[TokenId]) -> bool {
        (self.current.id == TokenId::Identifier
            && identifiers.contains(&self.current.text.as_str()))
            || ids.contains(&self.current.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_stream_walks_lazily() {
        let mut stream = TokenStream::new("a + b").unwrap();
        assert_eq!(stream.current().text, "a");
        stream.next_token().unwrap();
        assert!(stream.current().is(TokenId::Plus));
        stream.next_token().unwrap();
        stream.next_token().unwrap();
        assert!(stream.is_end());
        assert_eq!(stream.current().pos, 5);

        // advancing past the end stays on the end token
        stream.next_token().unwrap();
        assert!(stream.is_end());
    }

    #[test]
    fn test_clone_is_independent() {
        let stream = TokenStream::new("\"T\"(x)").unwrap();
        let mut lookahead = stream.clone();
        lookahead.next_token().unwrap();

        assert!(lookahead.current().is(TokenId::OpenParen));
        assert!(stream.current().is(TokenId::StringLiteral));
        assert_eq!(stream.peek().unwrap().id, TokenId::OpenParen);
    }

    #[test]
    fn test_lexer_errors_surface_lazily() {
        let mut stream = TokenStream::new("a #").unwrap();
        assert_matches!(
            stream.next_token(),
            Err(ParseError { kind: ParseErrorKind::InvalidCharacter('#'), position: 2 })
        );
    }

    #[test]
    fn test_validate_and_identifier_checks() {
        let stream = TokenStream::new("In (1)").unwrap();
        assert!(stream.token_is_identifier("in"));
        assert!(!stream.try_get_token(&["in", "not_in"], &[TokenId::Exclamation]));
        assert!(stream.try_get_token(&["In"], &[]));

        assert_matches!(
            stream.validate(TokenId::OpenParen, ParseErrorKind::OpenParenExpected),
            Err(ParseError { kind: ParseErrorKind::OpenParenExpected, position: 0 })
        );
        assert!(stream
            .validate(TokenId::Identifier, ParseErrorKind::IdentifierExpected)
            .is_ok());
    }

    #[test]
    fn test_current_mut_rewrites_token() {
        let mut stream = TokenStream::new("@class").unwrap();
        stream.current_mut().text = "class".to_string();
        assert_eq!(stream.current().text, "class");
    }
}
