//! Core lexical analyzer
//!
//! Scans one token at a time from an arbitrary byte offset. The token stream
//! drives it lazily, so an expression that stops parsing early never pays
//! for tokenizing the rest of the text.

use crate::config::compile_time::lexical::*;
use crate::syntax::error::{ParseError, ParseErrorKind, ParseResult};
use crate::tokens::token::{classify_operator_word, Token, TokenId};

/// Stateless scanner over one piece of expression text
#[derive(Debug, Clone, Copy)]
pub struct LexicalAnalyzer<'a> {
    text: &'a str,
}

impl<'a> LexicalAnalyzer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.text.get(index..).and_then(|rest| rest.chars().next())
    }

    fn digit_at(&self, index: usize) -> bool {
        self.char_at(index).is_some_and(|c| c.is_ascii_digit())
    }

    fn skip_digits(&self, mut index: usize) -> usize {
        while self.digit_at(index) {
            index += 1;
        }
        index
    }

    /// Scan the token at or after `pos`.
    ///
    /// `previous` is the id of the token before it; word operators directly
    /// after a `.` stay identifiers so member names like `x.Or` survive.
    pub fn scan(&self, pos: usize, previous: Option<TokenId>) -> ParseResult<Token> {
        let mut start = pos;
        while let Some(c) = self.char_at(start) {
            if !c.is_whitespace() {
                break;
            }
            start += c.len_utf8();
        }

        let Some(ch) = self.char_at(start) else {
            return Ok(Token::end(self.text.len()));
        };
        let next = self.char_at(start + ch.len_utf8());

        let (id, length) = match ch {
            '!' if next == Some('=') => (TokenId::ExclamationEqual, 2),
            '!' => (TokenId::Exclamation, 1),
            '%' => (TokenId::Percent, 1),
            '&' if next == Some('&') => (TokenId::DoubleAmpersand, 2),
            '&' => (TokenId::Ampersand, 1),
            '(' => (TokenId::OpenParen, 1),
            ')' => (TokenId::CloseParen, 1),
            '{' => (TokenId::OpenCurlyParen, 1),
            '}' => (TokenId::CloseCurlyParen, 1),
            '*' => (TokenId::Asterisk, 1),
            '+' => (TokenId::Plus, 1),
            ',' => (TokenId::Comma, 1),
            '-' => (TokenId::Minus, 1),
            '.' => (TokenId::Dot, 1),
            '/' => (TokenId::Slash, 1),
            ':' => (TokenId::Colon, 1),
            '<' => match next {
                Some('=') => (TokenId::LessThanEqual, 2),
                Some('>') => (TokenId::LessGreater, 2),
                Some('<') => (TokenId::ShiftLeft, 2),
                _ => (TokenId::LessThan, 1),
            },
            '=' => match next {
                Some('=') => (TokenId::DoubleEqual, 2),
                Some('>') => (TokenId::Lambda, 2),
                _ => (TokenId::Equal, 1),
            },
            '>' => match next {
                Some('=') => (TokenId::GreaterThanEqual, 2),
                Some('>') => (TokenId::ShiftRight, 2),
                _ => (TokenId::GreaterThan, 1),
            },
            '?' => match next {
                Some('?') => (TokenId::NullCoalescing, 2),
                Some('.') => (TokenId::NullPropagation, 2),
                _ => (TokenId::Question, 1),
            },
            '[' => (TokenId::OpenBracket, 1),
            ']' => (TokenId::CloseBracket, 1),
            '|' if next == Some('|') => (TokenId::DoubleBar, 2),
            '|' => (TokenId::Bar, 1),
            '"' | '\'' => return self.scan_string(start, ch),
            c if is_identifier_start(c) => return self.scan_identifier(start, c, previous),
            c if c.is_ascii_digit() => return self.scan_number(start),
            c => return Err(ParseError::new(ParseErrorKind::InvalidCharacter(c), start)),
        };

        Ok(Token::new(id, &self.text[start..start + length], start))
    }

    /// Quoted literal; a backslash protects the next character and a doubled
    /// quote continues the same literal (`"a""b"` is one token)
    fn scan_string(&self, start: usize, quote: char) -> ParseResult<Token> {
        let unterminated = || {
            ParseError::new(ParseErrorKind::UnterminatedStringLiteral, self.text.len())
        };

        let mut index = start;
        loop {
            index += quote.len_utf8();
            loop {
                match self.char_at(index) {
                    None => return Err(unterminated()),
                    Some('\\') => {
                        index += 1;
                        let escaped = self.char_at(index).ok_or_else(unterminated)?;
                        index += escaped.len_utf8();
                    }
                    Some(c) if c == quote => break,
                    Some(c) => index += c.len_utf8(),
                }
            }
            index += quote.len_utf8();

            if self.char_at(index) != Some(quote) {
                break;
            }
        }

        let size = index - start;
        if size > MAX_STRING_SIZE {
            return Err(ParseError::new(
                ParseErrorKind::StringTooLarge { size },
                start,
            ));
        }

        Ok(Token::new(
            TokenId::StringLiteral,
            &self.text[start..index],
            start,
        ))
    }

    fn scan_identifier(
        &self,
        start: usize,
        first: char,
        previous: Option<TokenId>,
    ) -> ParseResult<Token> {
        let mut index = start + first.len_utf8();
        while let Some(c) = self.char_at(index) {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            index += c.len_utf8();
        }

        let text = &self.text[start..index];
        let length = text.chars().count();
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(ParseError::new(
                ParseErrorKind::IdentifierTooLong { length },
                start,
            ));
        }

        let id = if previous == Some(TokenId::Dot) {
            TokenId::Identifier
        } else {
            classify_operator_word(text).unwrap_or(TokenId::Identifier)
        };

        Ok(Token::new(id, text, start))
    }

    fn scan_number(&self, start: usize) -> ParseResult<Token> {
        let mut index = self.skip_digits(start);
        let mut id = TokenId::IntegerLiteral;

        let hex = &self.text[start..index] == "0"
            && matches!(self.char_at(index), Some('x') | Some('X'));
        if hex {
            index += 1;
            if !self.char_at(index).is_some_and(|c| c.is_ascii_hexdigit()) {
                return Err(ParseError::new(ParseErrorKind::DigitExpected, index));
            }
            while self.char_at(index).is_some_and(|c| c.is_ascii_hexdigit()) {
                index += 1;
            }
        }

        if let Some(suffix @ ('U' | 'u' | 'L' | 'l')) = self.char_at(index) {
            index += 1;
            let unsigned = suffix.eq_ignore_ascii_case(&'u');
            match self.char_at(index) {
                Some('L' | 'l') if unsigned => index += 1,
                Some('U' | 'u') if !unsigned => index += 1,
                _ => {}
            }
            return Ok(Token::new(id, &self.text[start..index], start));
        }

        if hex {
            return Ok(Token::new(id, &self.text[start..index], start));
        }

        // `1.` followed by anything but a digit is an integer and a member dot
        if self.char_at(index) == Some('.') && self.digit_at(index + 1) {
            id = TokenId::RealLiteral;
            index = self.skip_digits(index + 1);
        }

        if matches!(self.char_at(index), Some('e') | Some('E')) {
            id = TokenId::RealLiteral;
            index += 1;
            if matches!(self.char_at(index), Some('+') | Some('-')) {
                index += 1;
            }
            if !self.digit_at(index) {
                return Err(ParseError::new(ParseErrorKind::DigitExpected, index));
            }
            index = self.skip_digits(index);
        }

        if matches!(
            self.char_at(index),
            Some('F' | 'f' | 'D' | 'd' | 'M' | 'm')
        ) {
            id = TokenId::RealLiteral;
            index += 1;
        }

        Ok(Token::new(id, &self.text[start..index], start))
    }
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '@' | '_' | '$' | '^' | '~')
}
