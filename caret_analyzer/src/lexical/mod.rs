//! Lexical analysis of expression text
//!
//! Tokens are normally pulled one at a time through [`TokenStream`]; the
//! eager [`tokenize`] helper exists for rewriting passes and diagnostics that
//! need every token up front.

pub mod analyzer;
pub mod literals;

use crate::syntax::error::ParseResult;
use crate::tokens::{Token, TokenId, TokenStream};

pub use analyzer::LexicalAnalyzer;
pub use literals::{fold_negative_literal, parse_string_literal, sanitize_identifier, unescape};

/// Tokenize the whole text, including the trailing `End` token
pub fn tokenize(text: &str) -> ParseResult<Vec<Token>> {
    let mut stream = TokenStream::new(text)?;
    let mut tokens = Vec::new();

    loop {
        let token = stream.current().clone();
        let done = token.id == TokenId::End;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
        stream.next_token()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_empty_text() {
        let tokens = tokenize("   ").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_end());
        assert_eq!(tokens[0].pos, 3);
    }
}
