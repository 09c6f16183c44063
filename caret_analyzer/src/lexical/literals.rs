//! Literal and identifier helpers
//!
//! String literal bodies use regular-expression style escapes (`\t`, `\x41`,
//! `\u00e9`, `\101`, `\cA`, ...). Under the two-double-quote dialect a
//! doubled `""` additionally collapses to a single `"`.

use crate::config::runtime::StringLiteralParsing;
use crate::syntax::error::{ParseError, ParseErrorKind, ParseResult};
use crate::tokens::token::Token;

/// Strip the quotes of a string or character literal and unescape its body.
///
/// `position` is reported with any failure (the offset of the literal token).
pub fn parse_string_literal(
    text: &str,
    position: usize,
    dialect: StringLiteralParsing,
) -> ParseResult<String> {
    let fail = |kind| ParseError::new(kind, position);

    let mut chars = text.chars();
    let (Some(quote), Some(last)) = (chars.next(), chars.next_back()) else {
        return Err(fail(ParseErrorKind::InvalidStringLength));
    };
    if quote != '"' && quote != '\'' {
        return Err(fail(ParseErrorKind::InvalidStringQuoteCharacter));
    }
    if last != quote {
        return Err(fail(ParseErrorKind::UnexpectedUnclosedString));
    }

    let body = chars.as_str();
    let unescaped = unescape(body).map_err(|e| fail(ParseErrorKind::InvalidEscapeSequence(e)))?;

    Ok(match dialect {
        StringLiteralParsing::Default => unescaped,
        StringLiteralParsing::EscapeDoubleQuoteByTwoDoubleQuotes => unescaped.replace("\"\"", "\""),
    })
}

/// Resolve backslash escapes; the message names the offending sequence
pub fn unescape(body: &str) -> Result<String, String> {
    if !body.contains('\\') {
        return Ok(body.to_string());
    }

    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        let Some(escape) = chars.next() else {
            return Err("illegal \\ at end of literal".to_string());
        };

        let decoded = match escape {
            'a' => '\u{07}',
            'b' => '\u{08}',
            't' => '\t',
            'r' => '\r',
            'v' => '\u{0B}',
            'f' => '\u{0C}',
            'n' => '\n',
            'e' => '\u{1B}',
            '0'..='7' => {
                let mut value = escape as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&d @ '0'..='7') => {
                            value = value * 8 + (d as u32 - '0' as u32);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                // three octal digits can exceed a byte; only the low byte counts
                char::from_u32(value & 0xFF).unwrap_or('\u{FFFD}')
            }
            'x' => scan_hex(&mut chars, 2, escape)?,
            'u' => scan_hex(&mut chars, 4, escape)?,
            'c' => {
                let control = chars
                    .next()
                    .ok_or_else(|| "missing control character after \\c".to_string())?;
                let upper = control.to_ascii_uppercase();
                let code = (upper as u32).wrapping_sub('@' as u32);
                if code >= 0x20 {
                    return Err(format!("unrecognized control character \\c{}", control));
                }
                char::from_u32(code).unwrap_or('\u{FFFD}')
            }
            c if c.is_alphanumeric() || c == '_' => {
                return Err(format!("unrecognized escape sequence \\{}", c));
            }
            c => c,
        };

        result.push(decoded);
    }

    Ok(result)
}

fn scan_hex(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    escape: char,
) -> Result<char, String> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next_if(|c| c.is_ascii_hexdigit())
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| format!("insufficient hex digits after \\{}", escape))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| format!("\\{}{:X} is not a valid character", escape, value))
}

/// Strip a leading `@` escape from an identifier (`@class` names `class`)
pub fn sanitize_identifier(name: &str) -> &str {
    match name.strip_prefix('@') {
        Some(rest) if !rest.is_empty() => rest,
        _ => name,
    }
}

/// Fold a unary minus into the numeric literal that follows it
pub fn fold_negative_literal(minus: &Token, literal: &mut Token) {
    literal.text = format!("-{}", literal.text);
    literal.pos = minus.pos;
}
