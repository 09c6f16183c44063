//! Fragment locator: a caret-aware partial parser
//!
//! Walks the full operator-precedence grammar without building anything.
//! Its only product is a stack of primary start offsets: entering a primary
//! pushes the current token offset, and finishing one pops it again only if
//! input remains. Whatever primary is still open when the walk stops (end of
//! text or a grammar error) marks the start of the trailing fragment.

use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::config::runtime::ParsingPreferences;
use crate::lexical::literals::{fold_negative_literal, parse_string_literal, sanitize_identifier};
use crate::logging::codes;
use crate::syntax::error::{AnalyzerError, AnalyzerResult, ParseError, ParseErrorKind};
use crate::tokens::{TokenId, TokenStream};
use crate::{log_debug, log_success};

const OUT_KEYWORDS: [&str; 2] = ["out", "$out"];
const DISCARD_VARIABLE: &str = "_";

/// Best-effort result of a locate pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFragment {
    /// Byte offset where the trailing fragment starts
    pub fragment_start: usize,
    /// `text[fragment_start..]`
    pub fragment: String,
    /// The grammar error that stopped the walk early, if any
    pub stopped_by: Option<ParseError>,
}

/// Recovers the trailing primary fragment of a truncated expression
#[derive(Debug, Clone)]
pub struct FragmentLocator {
    preferences: ParsingPreferences,
}

impl FragmentLocator {
    pub fn new(preferences: ParsingPreferences) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &ParsingPreferences {
        &self.preferences
    }

    /// Locate the trailing fragment of `text`.
    ///
    /// Grammar errors never fail the call; they are recorded in
    /// `stopped_by`. Only the null-propagation rejection escapes.
    pub fn locate(&self, text: &str) -> AnalyzerResult<LocatedFragment> {
        let mut stack = Vec::new();

        let stopped_by = match TokenStream::new(text) {
            Ok(tokens) => {
                let mut walker = LocatorWalk {
                    tokens,
                    stack: &mut stack,
                    depth: 0,
                    preferences: &self.preferences,
                };
                match walker.parse_conditional() {
                    Ok(()) => None,
                    Err(AnalyzerError::Parse(error)) => Some(error),
                    Err(other) => return Err(other),
                }
            }
            Err(error) => Some(error),
        };

        let fragment_start = stack.last().copied().unwrap_or(0);
        let fragment = text.get(fragment_start..).unwrap_or_default().to_string();

        if let Some(error) = &stopped_by {
            log_debug!("Fragment locator stopped early",
                "error" => error,
                "fragment_start" => fragment_start
            );
        }
        log_success!(codes::success::FRAGMENT_LOCATED, "Trailing fragment located",
            "fragment_start" => fragment_start,
            "fragment" => fragment.as_str()
        );

        Ok(LocatedFragment {
            fragment_start,
            fragment,
            stopped_by,
        })
    }
}

/// Per-call walk state
struct LocatorWalk<'a> {
    tokens: TokenStream,
    stack: &'a mut Vec<usize>,
    depth: usize,
    preferences: &'a ParsingPreferences,
}

impl LocatorWalk<'_> {
    // === HELPERS ===

    fn id(&self) -> TokenId {
        self.tokens.current().id
    }

    fn pos(&self) -> usize {
        self.tokens.current().pos
    }

    fn next(&mut self) -> AnalyzerResult<()> {
        Ok(self.tokens.next_token()?)
    }

    fn validate(&self, id: TokenId, kind: ParseErrorKind) -> AnalyzerResult<()> {
        Ok(self.tokens.validate(id, kind)?)
    }

    fn fail<T>(&self, kind: ParseErrorKind) -> AnalyzerResult<T> {
        Err(self.tokens.error(kind).into())
    }

    /// Run `rule` one recursion level deeper, bounded by `MAX_PARSE_DEPTH`
    fn nested(&mut self, rule: fn(&mut Self) -> AnalyzerResult<()>) -> AnalyzerResult<()> {
        if self.depth >= MAX_PARSE_DEPTH {
            return self.fail(ParseErrorKind::MaxParseDepth);
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    // === OPERATOR PRECEDENCE ===

    /// `out _` marker, only at argument positions; the discard is the whole argument
    fn parse_out_keyword(&mut self) -> AnalyzerResult<()> {
        if self.tokens.try_get_token(&OUT_KEYWORDS, &[]) {
            self.next()?;
            if self.tokens.current().text != DISCARD_VARIABLE {
                return self.fail(ParseErrorKind::OutKeywordRequiresDiscard);
            }
            return self.next();
        }
        self.parse_conditional()
    }

    /// `?:`
    fn parse_conditional(&mut self) -> AnalyzerResult<()> {
        self.nested(|walk| {
            walk.parse_null_coalescing()?;
            if walk.id() == TokenId::Question {
                walk.next()?;
                walk.parse_conditional()?;
                walk.validate(TokenId::Colon, ParseErrorKind::ColonExpected)?;
                walk.next()?;
                walk.parse_conditional()?;
            }
            Ok(())
        })
    }

    /// `??`
    fn parse_null_coalescing(&mut self) -> AnalyzerResult<()> {
        self.parse_lambda()?;
        if self.id() == TokenId::NullCoalescing {
            self.next()?;
            self.parse_conditional()?;
        }
        Ok(())
    }

    /// `=>` projection; the trailing `(` check does not consume the token
    fn parse_lambda(&mut self) -> AnalyzerResult<()> {
        self.parse_or()?;
        if self.id() == TokenId::Lambda {
            self.next()?;
            if matches!(self.id(), TokenId::Identifier | TokenId::OpenParen) {
                self.parse_conditional()?;
            }
            self.validate(TokenId::OpenParen, ParseErrorKind::OpenParenExpected)?;
        }
        Ok(())
    }

    /// `||`, `or`
    fn parse_or(&mut self) -> AnalyzerResult<()> {
        self.parse_and()?;
        while self.id() == TokenId::DoubleBar {
            self.next()?;
            self.parse_and()?;
        }
        Ok(())
    }

    /// `&&`, `and`
    fn parse_and(&mut self) -> AnalyzerResult<()> {
        self.parse_in()?;
        while self.id() == TokenId::DoubleAmpersand {
            self.next()?;
            self.parse_in()?;
        }
        Ok(())
    }

    /// `in`, `not in`, `not_in`, `! in` against a literal list or a single operand
    fn parse_in(&mut self) -> AnalyzerResult<()> {
        self.parse_bitwise()?;
        while self
            .tokens
            .try_get_token(&["in", "not_in", "not"], &[TokenId::Exclamation])
        {
            let operator = self.tokens.current().clone();
            if operator.text == "not" || operator.id == TokenId::Exclamation {
                self.next()?;
                if !self.tokens.token_is_identifier("in") {
                    return Err(ParseError::new(
                        ParseErrorKind::TokenExpected("in".to_string()),
                        operator.pos,
                    )
                    .into());
                }
            }

            self.next()?;

            if self.id() == TokenId::OpenParen {
                while self.id() != TokenId::CloseParen {
                    self.next()?;
                    // unary, so `in (-1, !flag)` works
                    self.parse_unary()?;
                    if self.id() == TokenId::End {
                        return Err(ParseError::new(
                            ParseErrorKind::CloseParenOrCommaExpected,
                            operator.pos,
                        )
                        .into());
                    }
                }
                self.next()?;
            } else if self.id() == TokenId::Identifier {
                self.parse_primary()?;
            } else {
                return Err(ParseError::new(
                    ParseErrorKind::OpenParenOrIdentifierExpected,
                    operator.pos,
                )
                .into());
            }
        }
        Ok(())
    }

    /// `&`, `|`
    fn parse_bitwise(&mut self) -> AnalyzerResult<()> {
        self.parse_comparison()?;
        while matches!(self.id(), TokenId::Ampersand | TokenId::Bar) {
            self.next()?;
            self.parse_comparison()?;
        }
        Ok(())
    }

    /// `=`, `==`, `!=`, `<>`, `<`, `<=`, `>`, `>=`
    fn parse_comparison(&mut self) -> AnalyzerResult<()> {
        self.parse_shift()?;
        while self.id().is_comparison_operator() {
            self.next()?;
            self.parse_shift()?;
        }
        Ok(())
    }

    /// `<<`, `>>`
    fn parse_shift(&mut self) -> AnalyzerResult<()> {
        self.parse_additive()?;
        while matches!(self.id(), TokenId::ShiftLeft | TokenId::ShiftRight) {
            self.next()?;
            self.parse_additive()?;
        }
        Ok(())
    }

    /// `+`, `-`
    fn parse_additive(&mut self) -> AnalyzerResult<()> {
        self.parse_multiplicative()?;
        while matches!(self.id(), TokenId::Plus | TokenId::Minus) {
            self.next()?;
            self.parse_multiplicative()?;
        }
        Ok(())
    }

    /// `*`, `/`, `%`, `mod`
    fn parse_multiplicative(&mut self) -> AnalyzerResult<()> {
        self.parse_unary()?;
        while matches!(
            self.id(),
            TokenId::Asterisk | TokenId::Slash | TokenId::Percent
        ) || self.tokens.token_is_identifier("mod")
        {
            self.next()?;
            self.parse_unary()?;
        }
        Ok(())
    }

    /// `-`, `!`, `not`; a minus directly before a numeric literal becomes part of it
    fn parse_unary(&mut self) -> AnalyzerResult<()> {
        self.nested(|walk| {
            let is_unary = matches!(walk.id(), TokenId::Minus | TokenId::Exclamation)
                || walk.tokens.token_is_identifier("not");
            if !is_unary {
                return walk.parse_primary();
            }

            let operator = walk.tokens.current().clone();
            walk.next()?;

            if operator.id == TokenId::Minus && walk.id().is_numeric_literal() {
                fold_negative_literal(&operator, walk.tokens.current_mut());
                return walk.parse_primary();
            }

            walk.parse_unary()
        })
    }

    // === PRIMARY EXPRESSIONS ===

    fn parse_primary(&mut self) -> AnalyzerResult<()> {
        self.stack.push(self.pos());
        self.parse_primary_start()?;

        loop {
            match self.id() {
                TokenId::Dot => {
                    self.next()?;
                    self.parse_member_access()?;
                }
                TokenId::NullPropagation => {
                    return Err(AnalyzerError::null_propagation(self.pos()));
                }
                TokenId::OpenBracket => self.parse_element_access()?,
                _ => break,
            }
        }

        // consumed as part of a larger expression, so not the trailing fragment
        if self.id() != TokenId::End {
            self.stack.pop();
        }
        Ok(())
    }

    fn parse_primary_start(&mut self) -> AnalyzerResult<()> {
        match self.id() {
            TokenId::Identifier => {
                if self.tokens.token_is_identifier("new") {
                    self.parse_new()
                } else {
                    self.parse_member_access()
                }
            }
            TokenId::StringLiteral => self.parse_string_literal(),
            TokenId::IntegerLiteral | TokenId::RealLiteral => self.next(),
            TokenId::OpenParen => self.parse_paren_expression(),
            _ => self.fail(ParseErrorKind::ExpressionExpected),
        }
    }

    /// String literal, possibly the target of a string cast (`"T"(x)`, `"T"?(x)`)
    fn parse_string_literal(&mut self) -> AnalyzerResult<()> {
        // The lookahead only matters to a typed compiler; the walk is identical.
        let mut lookahead = self.tokens.clone();
        lookahead.next_token()?;
        if lookahead.current().id == TokenId::Question {
            lookahead.next_token()?;
        }

        let dialect = self.preferences.string_literal_parsing;
        let mut text = self.tokens.current().text.clone();
        let value = parse_string_literal(&text, self.pos(), dialect)?;

        if text.starts_with('\'') {
            if value.chars().count() > 1 {
                return self.fail(ParseErrorKind::InvalidCharacterLiteral);
            }
            return self.next();
        }

        self.next()?;
        while self.id() == TokenId::StringLiteral {
            text.push_str(&self.tokens.current().text);
            self.next()?;
        }

        parse_string_literal(&text, self.pos(), dialect)?;
        Ok(())
    }

    fn parse_paren_expression(&mut self) -> AnalyzerResult<()> {
        self.validate(TokenId::OpenParen, ParseErrorKind::OpenParenExpected)?;
        self.next()?;
        self.parse_conditional()?;
        self.validate(TokenId::CloseParen, ParseErrorKind::CloseParenOrOperatorExpected)?;
        self.next()
    }

    /// `new(...)`, `new T(...)`, `new[] {...}`, `new {...}`
    fn parse_new(&mut self) -> AnalyzerResult<()> {
        self.next()?;
        if !matches!(
            self.id(),
            TokenId::OpenParen | TokenId::OpenCurlyParen | TokenId::OpenBracket | TokenId::Identifier
        ) {
            return self.fail(ParseErrorKind::OpenParenOrIdentifierExpected);
        }

        if self.id() == TokenId::Identifier {
            self.next()?;
            while matches!(self.id(), TokenId::Dot | TokenId::Plus) {
                self.next()?;
                if self.id() != TokenId::Identifier {
                    return self.fail(ParseErrorKind::IdentifierExpected);
                }
                self.next()?;
            }

            if !matches!(
                self.id(),
                TokenId::OpenParen | TokenId::OpenBracket | TokenId::OpenCurlyParen
            ) {
                return self.fail(ParseErrorKind::OpenParenExpected);
            }
        }

        let mut array_initializer = false;
        if self.id() == TokenId::OpenBracket {
            self.next()?;
            self.validate(TokenId::CloseBracket, ParseErrorKind::CloseBracketExpected)?;
            self.next()?;
            self.validate(TokenId::OpenCurlyParen, ParseErrorKind::OpenCurlyParenExpected)?;
            array_initializer = true;
        }

        self.next()?;

        while !matches!(self.id(), TokenId::CloseParen | TokenId::CloseCurlyParen) {
            self.parse_conditional()?;
            if !array_initializer && self.tokens.token_is_identifier("as") {
                self.next()?;
                self.get_identifier_as()?;
            }

            if self.id() != TokenId::Comma {
                break;
            }
            self.next()?;
        }

        if !matches!(self.id(), TokenId::CloseParen | TokenId::CloseCurlyParen) {
            return self.fail(ParseErrorKind::CloseParenOrCommaExpected);
        }
        self.next()
    }

    fn parse_member_access(&mut self) -> AnalyzerResult<()> {
        self.get_identifier()?;
        self.next()?;

        if self.id() == TokenId::Lambda {
            self.next()?;
            return self.parse_conditional();
        }

        // enum values or nested classes: `A.B.MyEnum.Value`, `A.B+Nested.Member`
        if matches!(self.id(), TokenId::Dot | TokenId::Plus) {
            self.parse_enum_or_nested_class()?;
        }

        if self.id() == TokenId::OpenParen {
            self.parse_argument_list()?;
        }
        Ok(())
    }

    fn parse_enum_or_nested_class(&mut self) -> AnalyzerResult<()> {
        while matches!(self.id(), TokenId::Dot | TokenId::Plus) {
            self.next()?;
            if self.id() == TokenId::Identifier {
                self.next()?;
            }
        }

        if self.id() == TokenId::Identifier {
            self.parse_member_access()?;
        }
        Ok(())
    }

    fn parse_argument_list(&mut self) -> AnalyzerResult<()> {
        self.validate(TokenId::OpenParen, ParseErrorKind::OpenParenExpected)?;
        self.next()?;
        if self.id() != TokenId::CloseParen {
            self.parse_arguments()?;
        }
        self.validate(TokenId::CloseParen, ParseErrorKind::CloseParenOrCommaExpected)?;
        self.next()
    }

    fn parse_arguments(&mut self) -> AnalyzerResult<()> {
        loop {
            self.parse_out_keyword()?;
            if self.id() != TokenId::Comma {
                return Ok(());
            }
            self.next()?;
        }
    }

    fn parse_element_access(&mut self) -> AnalyzerResult<()> {
        self.validate(TokenId::OpenBracket, ParseErrorKind::OpenParenExpected)?;
        self.next()?;
        self.parse_arguments()?;
        self.validate(TokenId::CloseBracket, ParseErrorKind::CloseBracketOrCommaExpected)?;
        self.next()
    }

    // === IDENTIFIERS ===

    /// Validate and sanitize the current identifier (`@class` names `class`)
    fn get_identifier(&mut self) -> AnalyzerResult<()> {
        self.validate(TokenId::Identifier, ParseErrorKind::IdentifierExpected)?;
        let token = self.tokens.current_mut();
        let sanitized = sanitize_identifier(&token.text).to_string();
        token.text = sanitized;
        Ok(())
    }

    /// Alias after `as`; dotted names are joined when enabled
    fn get_identifier_as(&mut self) -> AnalyzerResult<String> {
        self.validate(TokenId::Identifier, ParseErrorKind::IdentifierExpected)?;

        if !self.preferences.support_dot_in_property_names {
            let name = sanitize_identifier(&self.tokens.current().text).to_string();
            self.next()?;
            return Ok(name);
        }

        let mut name = String::new();
        while matches!(self.id(), TokenId::Dot | TokenId::Identifier) {
            name.push_str(&self.tokens.current().text);
            self.next()?;
        }
        Ok(sanitize_identifier(&name).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::StringLiteralParsing;
    use assert_matches::assert_matches;

    fn locator() -> FragmentLocator {
        FragmentLocator::new(ParsingPreferences {
            string_literal_parsing: StringLiteralParsing::Default,
            support_dot_in_property_names: false,
            retry_legacy_keywords: true,
            case_insensitive_members: true,
        })
    }

    fn fragment(text: &str) -> String {
        locator().locate(text).unwrap().fragment
    }

    #[test]
    fn test_single_member_chain_is_whole_text() {
        let located = locator().locate("it.Name").unwrap();
        assert_eq!(located.fragment_start, 0);
        assert_eq!(located.fragment, "it.Name");
        assert_eq!(located.stopped_by, None);
    }

    #[test]
    fn test_trailing_operand_of_binary_operator() {
        assert_eq!(fragment("it.Count - it.Name"), "it.Name");
        assert_eq!(fragment("a == b && c.D"), "c.D");
        assert_eq!(fragment("x ? y : z.Length"), "z.Length");
        assert_eq!(fragment("a ?? b"), "b");
    }

    #[test]
    fn test_plus_after_member_continues_nested_class_chain() {
        // `A.B+C` names a nested class, so `+` after a member keeps the chain open
        assert_eq!(fragment("it.Count + it.Name"), "it.Count + it.Name");
        assert_eq!(fragment("1 + it.Name"), "it.Name");
    }

    #[test]
    fn test_open_argument_list() {
        // argument list never closed: the innermost open primary wins
        let located = locator().locate("it.Method(1, it.Name").unwrap();
        assert_eq!(located.fragment, "it.Name");
        assert_matches!(
            located.stopped_by,
            Some(ParseError { kind: ParseErrorKind::CloseParenOrCommaExpected, .. })
        );

        // nothing after the comma: the call expression itself stays open
        let located = locator().locate("it.Method(1, 2").unwrap();
        assert_eq!(located.fragment, "2");
    }

    #[test]
    fn test_open_argument_list_with_trailing_comma() {
        // the end token opened a primary, so the fragment is empty
        let located = locator().locate("it.Method(1, ").unwrap();
        assert_eq!(located.fragment_start, 13);
        assert_eq!(located.fragment, "");
        assert_matches!(
            located.stopped_by,
            Some(ParseError { kind: ParseErrorKind::ExpressionExpected, position: 13 })
        );
    }

    #[test]
    fn test_closed_call_is_one_fragment() {
        assert_eq!(fragment("it.Name.Substring(0, 2).Length"), "it.Name.Substring(0, 2).Length");
        assert_eq!(fragment("Math.Max(it.A, 1)"), "Math.Max(it.A, 1)");
        assert_eq!(fragment("it.Items[0].Price"), "it.Items[0].Price");
    }

    #[test]
    fn test_parenthesized_fragment() {
        assert_eq!(fragment("(it.A + it.B).ToString"), "(it.A + it.B).ToString");
        assert_eq!(fragment("1 + (it.A"), "it.A");
    }

    #[test]
    fn test_unary_minus_folds_into_literal() {
        let located = locator().locate("-1").unwrap();
        assert_eq!(located.fragment_start, 0);
        assert_eq!(located.fragment, "-1");

        let located = locator().locate("- 1").unwrap();
        assert_eq!(located.fragment, "- 1");

        // minus before an identifier is not folded
        assert_eq!(fragment("-it.Value"), "it.Value");
    }

    #[test]
    fn test_in_operator_lists() {
        for text in ["x in (1,2,3)", "x in (-1, 2)", "x not in (1)", "x not_in (1)", "x !in (1)"] {
            let located = locator().locate(text).unwrap();
            assert_eq!(located.stopped_by, None, "{}", text);
        }
        assert_eq!(fragment("x in y"), "y");
    }

    #[test]
    fn test_in_operator_errors() {
        assert_matches!(
            locator().locate("x not y").unwrap().stopped_by,
            Some(ParseError { kind: ParseErrorKind::TokenExpected(ref t), position: 2 }) if t == "in"
        );
        assert_matches!(
            locator().locate("x in 5").unwrap().stopped_by,
            Some(ParseError { kind: ParseErrorKind::OpenParenOrIdentifierExpected, position: 2 })
        );
        assert_matches!(
            locator().locate("x in (1, 2").unwrap().stopped_by,
            Some(ParseError { kind: ParseErrorKind::CloseParenOrCommaExpected, position: 2 })
        );
    }

    #[test]
    fn test_null_propagation_is_not_swallowed() {
        let result = locator().locate("it?.Name");
        assert_matches!(result, Err(AnalyzerError::NotSupported { position: 2, .. }));
    }

    #[test]
    fn test_out_keyword_requires_discard() {
        let located = locator().locate("it.TryGet(out _, it.Name").unwrap();
        assert_eq!(located.fragment, "it.Name");

        assert_matches!(
            locator().locate("it.TryGet(out x)").unwrap().stopped_by,
            Some(ParseError { kind: ParseErrorKind::OutKeywordRequiresDiscard, position: 14 })
        );
    }

    #[test]
    fn test_lambda_requires_open_paren_after_body() {
        // body parsed, then the non-consuming '(' check fails at the end
        let located = locator().locate("it.Items.Where(x => x.Price").unwrap();
        assert_eq!(located.fragment, "x.Price");
    }

    #[test]
    fn test_new_expressions() {
        assert_eq!(
            locator().locate("new (A as X, B as Y)").unwrap().stopped_by,
            None
        );
        assert_eq!(locator().locate("new[] { 1, 2 }").unwrap().stopped_by, None);
        assert_eq!(locator().locate("new Point(1, 2)").unwrap().stopped_by, None);
        assert_eq!(fragment("new (A as X, it.B"), "it.B");
        assert_matches!(
            locator().locate("new 5").unwrap().stopped_by,
            Some(ParseError { kind: ParseErrorKind::OpenParenOrIdentifierExpected, position: 4 })
        );
        assert_matches!(
            locator().locate("new System.").unwrap().stopped_by,
            Some(ParseError { kind: ParseErrorKind::IdentifierExpected, .. })
        );
    }

    #[test]
    fn test_dotted_as_alias() {
        let mut preferences = locator().preferences().clone();
        preferences.support_dot_in_property_names = true;
        let located = FragmentLocator::new(preferences)
            .locate("new (A as a.b, B as c)")
            .unwrap();
        assert_eq!(located.stopped_by, None);
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(fragment("\"abc\".Length"), "\"abc\".Length");
        assert_eq!(fragment("\"a\" \"b\""), "\"a\" \"b\"");
        assert_matches!(
            locator().locate("'ab'").unwrap().stopped_by,
            Some(ParseError { kind: ParseErrorKind::InvalidCharacterLiteral, position: 0 })
        );
        assert_eq!(locator().locate("'a'").unwrap().stopped_by, None);
    }

    #[test]
    fn test_enum_and_nested_class_chains() {
        assert_eq!(fragment("DayOfWeek.Monday"), "DayOfWeek.Monday");
        assert_eq!(fragment("Outer+Inner.Value"), "Outer+Inner.Value");
    }

    #[test]
    fn test_lexer_failure_keeps_partial_state() {
        let located = locator().locate("it.Name + #").unwrap();
        assert_matches!(
            located.stopped_by,
            Some(ParseError { kind: ParseErrorKind::InvalidCharacter('#'), position: 10 })
        );
        // `+` kept the first primary open when the lexer failed
        assert_eq!(located.fragment, "it.Name + #");
    }

    #[test]
    fn test_empty_text() {
        let located = locator().locate("").unwrap();
        assert_eq!(located.fragment, "");
        assert_matches!(
            located.stopped_by,
            Some(ParseError { kind: ParseErrorKind::ExpressionExpected, position: 0 })
        );
    }

    #[test]
    fn test_depth_limit() {
        let text = format!("{}1", "(".repeat(MAX_PARSE_DEPTH * 2));
        let located = locator().locate(&text).unwrap();
        assert_matches!(
            located.stopped_by,
            Some(ParseError { kind: ParseErrorKind::MaxParseDepth, .. })
        );
    }
}
