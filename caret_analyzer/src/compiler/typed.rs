//! Typed recursive descent over the expression grammar
//!
//! Same precedence ladder as the fragment locator, but every rule returns
//! the static type of what it parsed. Nothing is evaluated and no tree is
//! built; the result of a compile is a single `TypeRef`.

use crate::compiler::operators::{
    self, is_arithmetic, is_integral, negate, promote, promote_unary, temporal_result,
    BinaryOperator,
};
use crate::compiler::ExpressionCompiler;
use crate::config::compile_time::compilation::MAX_SCOPE_DEPTH;
use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::config::runtime::ParsingPreferences;
use crate::lexical::literals::{fold_negative_literal, parse_string_literal, sanitize_identifier};
use crate::log_success;
use crate::logging::codes;
use crate::syntax::error::{AnalyzerError, AnalyzerResult, ParseError, ParseErrorKind};
use crate::tokens::{Token, TokenId, TokenStream};
use crate::types::builtin::{
    alias_full_name, BOOLEAN, CHAR, DECIMAL, DOUBLE, INT32, INT64, OBJECT, SINGLE, STRING,
    UINT32, UINT64,
};
use crate::types::members::{find_indexers, find_methods, find_value_member, Binding};
use crate::types::{array_of, ParameterInfo, TypeBuilder, TypeRef, TypeRegistry};
use std::sync::Arc;

const OUT_KEYWORDS: [&str; 2] = ["out", "$out"];
const DISCARD_VARIABLE: &str = "_";

/// Reference compiler over a [`TypeRegistry`]
#[derive(Debug, Clone)]
pub struct TypeCompiler {
    registry: Arc<TypeRegistry>,
    preferences: ParsingPreferences,
}

impl TypeCompiler {
    pub fn new(registry: Arc<TypeRegistry>, preferences: ParsingPreferences) -> Self {
        Self {
            registry,
            preferences,
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn preferences(&self) -> &ParsingPreferences {
        &self.preferences
    }
}

impl ExpressionCompiler for TypeCompiler {
    fn compile(&self, context: &TypeRef, text: &str) -> AnalyzerResult<TypeRef> {
        let tokens = TokenStream::new(text)?;
        let mut walk = TypedWalk {
            registry: &self.registry,
            preferences: &self.preferences,
            tokens,
            scopes: vec![Scope {
                it: context.clone(),
                parameter: None,
            }],
            depth: 0,
        };

        let result = walk.parse_conditional()?;
        if !walk.tokens.is_end() {
            return walk.fail(ParseErrorKind::SyntaxError);
        }

        log_success!(codes::success::EXPRESSION_COMPILED, "Expression compiled",
            "text" => text,
            "type" => result.ty.full_name()
        );
        Ok(result.ty)
    }
}

// ============================================================================
// OPERANDS AND SCOPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Literal {
    None,
    /// Integer literal; converts to any numeric type
    Integer,
    Null,
    /// `out _` argument; matches any parameter
    Discard,
}

#[derive(Debug, Clone)]
struct Operand {
    ty: TypeRef,
    literal: Literal,
    /// Name a `new (...)` member takes when it has no `as` clause
    name: Option<String>,
}

impl Operand {
    fn value(ty: TypeRef) -> Self {
        Self {
            ty,
            literal: Literal::None,
            name: None,
        }
    }

    fn named(ty: TypeRef, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::value(ty)
        }
    }

    fn literal(ty: TypeRef, literal: Literal) -> Self {
        Self {
            literal,
            ..Self::value(ty)
        }
    }

    fn type_name(&self) -> String {
        self.ty.full_name()
    }
}

/// Binding of `it` (and optionally a lambda parameter) for one nesting level
#[derive(Debug, Clone)]
struct Scope {
    it: TypeRef,
    parameter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceOperator {
    Any,
    All,
    Count,
    LongCount,
    Where,
    Select,
    First,
    FirstOrDefault,
    Last,
    LastOrDefault,
    Single,
    SingleOrDefault,
    Sum,
    Average,
    Min,
    Max,
    Contains,
    OrderBy,
    OrderByDescending,
    Skip,
    Take,
    Distinct,
    Reverse,
    ToArray,
    ToList,
}

const SEQUENCE_OPERATORS: [(&str, SequenceOperator); 25] = [
    ("Any", SequenceOperator::Any),
    ("All", SequenceOperator::All),
    ("Count", SequenceOperator::Count),
    ("LongCount", SequenceOperator::LongCount),
    ("Where", SequenceOperator::Where),
    ("Select", SequenceOperator::Select),
    ("First", SequenceOperator::First),
    ("FirstOrDefault", SequenceOperator::FirstOrDefault),
    ("Last", SequenceOperator::Last),
    ("LastOrDefault", SequenceOperator::LastOrDefault),
    ("Single", SequenceOperator::Single),
    ("SingleOrDefault", SequenceOperator::SingleOrDefault),
    ("Sum", SequenceOperator::Sum),
    ("Average", SequenceOperator::Average),
    ("Min", SequenceOperator::Min),
    ("Max", SequenceOperator::Max),
    ("Contains", SequenceOperator::Contains),
    ("OrderBy", SequenceOperator::OrderBy),
    ("OrderByDescending", SequenceOperator::OrderByDescending),
    ("Skip", SequenceOperator::Skip),
    ("Take", SequenceOperator::Take),
    ("Distinct", SequenceOperator::Distinct),
    ("Reverse", SequenceOperator::Reverse),
    ("ToArray", SequenceOperator::ToArray),
    ("ToList", SequenceOperator::ToList),
];

impl SequenceOperator {
    fn lookup(name: &str, case_insensitive: bool) -> Option<Self> {
        SEQUENCE_OPERATORS
            .iter()
            .find(|(candidate, _)| {
                if case_insensitive {
                    candidate.eq_ignore_ascii_case(name)
                } else {
                    *candidate == name
                }
            })
            .map(|(_, op)| *op)
    }

    /// Whether the single argument is evaluated with `it` bound to the element
    fn takes_lambda(self) -> bool {
        !matches!(
            self,
            SequenceOperator::Contains | SequenceOperator::Skip | SequenceOperator::Take
        )
    }
}

// ============================================================================
// WALK
// ============================================================================

struct TypedWalk<'a> {
    registry: &'a TypeRegistry,
    preferences: &'a ParsingPreferences,
    tokens: TokenStream,
    scopes: Vec<Scope>,
    depth: usize,
}

impl TypedWalk<'_> {
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

    fn fail_at<T>(&self, kind: ParseErrorKind, position: usize) -> AnalyzerResult<T> {
        Err(ParseError::new(kind, position).into())
    }

    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> AnalyzerResult<T>) -> AnalyzerResult<T> {
        if self.depth >= MAX_PARSE_DEPTH {
            return self.fail(ParseErrorKind::MaxParseDepth);
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn scope(&self) -> &Scope {
        // the root scope is pushed at construction and never popped
        &self.scopes[self.scopes.len() - 1]
    }

    fn context(&self) -> &TypeRef {
        &self.scopes[0].it
    }

    /// Resolve a member or parameter type name
    fn resolve(&self, name: &str, position: usize) -> AnalyzerResult<TypeRef> {
        self.registry
            .get(name)
            .ok_or_else(|| ParseError::new(ParseErrorKind::TypeNotFound(name.to_string()), position).into())
    }

    fn builtin(&self, name: &str) -> AnalyzerResult<Operand> {
        let position = self.pos();
        Ok(Operand::value(self.resolve(name, position)?))
    }

    fn incompatible(&self, op: &Token, left: &Operand, right: &Operand) -> AnalyzerError {
        ParseError::new(
            ParseErrorKind::IncompatibleOperands {
                op: op.text.clone(),
                left: left.ty.name.clone(),
                right: right.ty.name.clone(),
            },
            op.pos,
        )
        .into()
    }

    // === CONVERSIONS ===

    /// Implicit conversion of `operand` to `target`
    fn converts(&self, operand: &Operand, target: &TypeRef) -> bool {
        match operand.literal {
            Literal::Discard => return true,
            Literal::Null => return !target.is_value_type(),
            Literal::Integer if is_arithmetic(&target.full_name()) => return true,
            _ => {}
        }
        operand.ty == *target
            || operators::is_implicit_numeric(&operand.type_name(), &target.full_name())
            || self.registry.is_assignable(&operand.ty, target)
    }

    /// Explicit conversion, as written `int(x)` or `"System.Int32"(x)`
    fn casts(&self, operand: &Operand, target: &TypeRef) -> bool {
        let from = operand.type_name();
        let to = target.full_name();
        let numeric_like = |name: &str, ty: &TypeRef| is_arithmetic(name) || ty.is_enum();
        self.converts(operand, target)
            || self.registry.is_assignable(target, &operand.ty)
            || (numeric_like(&from, &operand.ty) && numeric_like(&to, target))
    }

    /// Common type of two branches
    fn unify(&self, a: Operand, b: Operand, position: usize) -> AnalyzerResult<Operand> {
        if a.literal == Literal::Null {
            return Ok(Operand { name: None, ..b });
        }
        if b.literal == Literal::Null || a.ty == b.ty || self.converts(&b, &a.ty) {
            return Ok(Operand::value(a.ty));
        }
        if self.converts(&a, &b.ty) {
            return Ok(Operand::value(b.ty));
        }
        self.fail_at(
            ParseErrorKind::NeitherTypeConvertsToOther {
                left: a.ty.name.clone(),
                right: b.ty.name.clone(),
            },
            position,
        )
    }

    /// Integer literals take the numeric type of the other side
    fn adapt_literals(left: &Operand, right: &Operand) -> (String, String) {
        let (l, r) = (left.type_name(), right.type_name());
        if left.literal == Literal::Integer && is_arithmetic(&r) {
            (r.clone(), r)
        } else if right.literal == Literal::Integer && is_arithmetic(&l) {
            (l.clone(), l)
        } else {
            (l, r)
        }
    }

    fn require_boolean(&self, operand: &Operand, position: usize) -> AnalyzerResult<()> {
        if operand.type_name() == BOOLEAN {
            Ok(())
        } else {
            self.fail_at(ParseErrorKind::ExpressionTypeMismatch("Boolean".to_string()), position)
        }
    }

    // === OPERATOR PRECEDENCE ===

    /// `out _` discard or a full expression, at argument positions
    fn parse_argument(&mut self) -> AnalyzerResult<Operand> {
        if self.tokens.try_get_token(&OUT_KEYWORDS, &[]) {
            self.next()?;
            if self.tokens.current().text != DISCARD_VARIABLE {
                return self.fail(ParseErrorKind::OutKeywordRequiresDiscard);
            }
            self.next()?;
            let object = self.builtin(OBJECT)?;
            return Ok(Operand::literal(object.ty, Literal::Discard));
        }
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> AnalyzerResult<Operand> {
        self.nested(|walk| {
            let position = walk.pos();
            let test = walk.parse_null_coalescing()?;
            if walk.id() != TokenId::Question {
                return Ok(test);
            }

            walk.require_boolean(&test, position)?;
            let question = walk.pos();
            walk.next()?;
            let when_true = walk.parse_conditional()?;
            walk.validate(TokenId::Colon, ParseErrorKind::ColonExpected)?;
            walk.next()?;
            let when_false = walk.parse_conditional()?;
            walk.unify(when_true, when_false, question)
        })
    }

    fn parse_null_coalescing(&mut self) -> AnalyzerResult<Operand> {
        let left = self.parse_lambda()?;
        if self.id() != TokenId::NullCoalescing {
            return Ok(left);
        }

        let operator = self.tokens.current().clone();
        self.next()?;
        let right = self.parse_conditional()?;

        if left.literal == Literal::Null {
            return Ok(Operand::value(right.ty));
        }
        if self.converts(&right, &left.ty) {
            return Ok(Operand::value(left.ty));
        }
        if self.converts(&left, &right.ty) {
            return Ok(Operand::value(right.ty));
        }
        Err(self.incompatible(&operator, &left, &right))
    }

    /// A lambda is only meaningful as a sequence operator argument
    fn parse_lambda(&mut self) -> AnalyzerResult<Operand> {
        let left = self.parse_or()?;
        if self.id() == TokenId::Lambda {
            return self.fail(ParseErrorKind::SyntaxError);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> AnalyzerResult<Operand> {
        let mut left = self.parse_and()?;
        while self.id() == TokenId::DoubleBar {
            let operator = self.tokens.current().clone();
            self.next()?;
            let right = self.parse_and()?;
            left = self.logical(&operator, left, right)?;
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> AnalyzerResult<Operand> {
        let mut left = self.parse_in()?;
        while self.id() == TokenId::DoubleAmpersand {
            let operator = self.tokens.current().clone();
            self.next()?;
            let right = self.parse_in()?;
            left = self.logical(&operator, left, right)?;
        }
        Ok(left)
    }

    fn logical(&self, operator: &Token, left: Operand, right: Operand) -> AnalyzerResult<Operand> {
        if left.type_name() == BOOLEAN && right.type_name() == BOOLEAN {
            Ok(Operand::value(left.ty))
        } else {
            Err(self.incompatible(operator, &left, &right))
        }
    }

    fn parse_in(&mut self) -> AnalyzerResult<Operand> {
        let mut left = self.parse_bitwise()?;
        while self
            .tokens
            .try_get_token(&["in", "not_in", "not"], &[TokenId::Exclamation])
        {
            let operator = self.tokens.current().clone();
            if operator.text == "not" || operator.id == TokenId::Exclamation {
                self.next()?;
                if !self.tokens.token_is_identifier("in") {
                    return self.fail_at(ParseErrorKind::TokenExpected("in".to_string()), operator.pos);
                }
            }
            self.next()?;

            if self.id() == TokenId::OpenParen {
                loop {
                    self.next()?;
                    let element = self.parse_unary()?;
                    if !self.equatable(&left, &element) {
                        return Err(self.incompatible(&operator, &left, &element));
                    }
                    match self.id() {
                        TokenId::Comma => continue,
                        TokenId::CloseParen => break,
                        TokenId::End => {
                            return self.fail_at(ParseErrorKind::CloseParenOrCommaExpected, operator.pos)
                        }
                        _ => return self.fail(ParseErrorKind::CloseParenOrCommaExpected),
                    }
                }
                self.next()?;
            } else if self.id() == TokenId::Identifier {
                let sequence = self.parse_primary()?;
                let Some(element) = self.registry.element_type(&sequence.ty) else {
                    return self.fail_at(
                        ParseErrorKind::IncompatibleOperand {
                            op: operator.text.clone(),
                            operand: sequence.ty.name.clone(),
                        },
                        operator.pos,
                    );
                };
                let element = Operand::value(element);
                if !self.equatable(&left, &element) {
                    return Err(self.incompatible(&operator, &left, &element));
                }
            } else {
                return self.fail_at(ParseErrorKind::OpenParenOrIdentifierExpected, operator.pos);
            }

            left = self.builtin(BOOLEAN)?;
        }
        Ok(left)
    }

    fn parse_bitwise(&mut self) -> AnalyzerResult<Operand> {
        let mut left = self.parse_comparison()?;
        while matches!(self.id(), TokenId::Ampersand | TokenId::Bar) {
            let operator = self.tokens.current().clone();
            self.next()?;
            let right = self.parse_comparison()?;

            let (l, r) = Self::adapt_literals(&left, &right);
            left = if l == BOOLEAN && r == BOOLEAN {
                Operand::value(left.ty)
            } else if is_integral(&l) && is_integral(&r) {
                match promote(&l, &r) {
                    Some(result) => self.builtin(result)?,
                    None => return Err(self.incompatible(&operator, &left, &right)),
                }
            } else if left.ty.is_enum() && left.ty == right.ty {
                Operand::value(left.ty)
            } else {
                return Err(self.incompatible(&operator, &left, &right));
            };
        }
        Ok(left)
    }

    /// Whether `==` accepts the pair
    fn equatable(&self, left: &Operand, right: &Operand) -> bool {
        let (l, r) = Self::adapt_literals(left, right);
        left.literal == Literal::Null
            || right.literal == Literal::Null
            || left.ty == right.ty
            || promote(&l, &r).is_some()
            || self.registry.is_assignable(&left.ty, &right.ty)
            || self.registry.is_assignable(&right.ty, &left.ty)
            || (left.ty.is_enum() && right.literal == Literal::Integer)
            || (right.ty.is_enum() && left.literal == Literal::Integer)
    }

    fn parse_comparison(&mut self) -> AnalyzerResult<Operand> {
        let mut left = self.parse_shift()?;
        while self.id().is_comparison_operator() {
            let operator = self.tokens.current().clone();
            let Some(op) = BinaryOperator::from_token(operator.id) else {
                return self.fail(ParseErrorKind::SyntaxError);
            };
            self.next()?;
            let right = self.parse_shift()?;

            let valid = if op.is_equality() {
                self.equatable(&left, &right)
            } else {
                let (l, r) = Self::adapt_literals(&left, &right);
                promote(&l, &r).is_some()
                    || (left.ty == right.ty
                        && (operators::is_ordered(&l) || left.ty.is_enum()))
            };
            if !valid {
                return Err(self.incompatible(&operator, &left, &right));
            }
            left = self.builtin(BOOLEAN)?;
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> AnalyzerResult<Operand> {
        let mut left = self.parse_additive()?;
        while matches!(self.id(), TokenId::ShiftLeft | TokenId::ShiftRight) {
            let operator = self.tokens.current().clone();
            self.next()?;
            let right = self.parse_additive()?;

            let count_ok = right.literal == Literal::Integer
                || operators::is_implicit_numeric(&right.type_name(), INT32);
            match promote_unary(&left.type_name()) {
                Some(result) if is_integral(result) && count_ok => left = self.builtin(result)?,
                _ => return Err(self.incompatible(&operator, &left, &right)),
            }
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> AnalyzerResult<Operand> {
        let mut left = self.parse_multiplicative()?;
        while matches!(self.id(), TokenId::Plus | TokenId::Minus) {
            let operator = self.tokens.current().clone();
            self.next()?;
            let right = self.parse_multiplicative()?;
            left = self.arithmetic(&operator, left, right)?;
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> AnalyzerResult<Operand> {
        let mut left = self.parse_unary()?;
        while matches!(
            self.id(),
            TokenId::Asterisk | TokenId::Slash | TokenId::Percent
        ) || self.tokens.token_is_identifier("mod")
        {
            let mut operator = self.tokens.current().clone();
            if operator.id == TokenId::Identifier {
                operator.id = TokenId::Percent;
            }
            self.next()?;
            let right = self.parse_unary()?;
            left = self.arithmetic(&operator, left, right)?;
        }
        Ok(left)
    }

    fn arithmetic(&self, operator: &Token, left: Operand, right: Operand) -> AnalyzerResult<Operand> {
        let Some(op) = BinaryOperator::from_token(operator.id) else {
            return Err(self.incompatible(operator, &left, &right));
        };
        let (l, r) = Self::adapt_literals(&left, &right);

        if operators::is_concatenation(op, &l, &r) {
            return self.builtin(STRING);
        }
        if let Some(result) = temporal_result(op, &l, &r) {
            return self.builtin(result);
        }
        match promote(&l, &r) {
            Some(result) => self.builtin(result),
            None => Err(self.incompatible(operator, &left, &right)),
        }
    }

    fn parse_unary(&mut self) -> AnalyzerResult<Operand> {
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

            let operand = walk.parse_unary()?;
            let name = operand.type_name();
            let result = if operator.id == TokenId::Minus {
                negate(&name)
            } else if name == BOOLEAN {
                Some(BOOLEAN)
            } else {
                promote_unary(&name).filter(|t| is_integral(t))
            };

            match result {
                Some(result) => walk.builtin(result),
                None => walk.fail_at(
                    ParseErrorKind::IncompatibleOperand {
                        op: operator.text.clone(),
                        operand: operand.ty.name.clone(),
                    },
                    operator.pos,
                ),
            }
        })
    }

    // === PRIMARY EXPRESSIONS ===

    fn parse_primary(&mut self) -> AnalyzerResult<Operand> {
        let mut expression = self.parse_primary_start()?;
        loop {
            match self.id() {
                TokenId::Dot => {
                    self.next()?;
                    expression = self.parse_member_access(expression, Binding::Instance)?;
                }
                TokenId::NullPropagation => {
                    return Err(AnalyzerError::null_propagation(self.pos()));
                }
                TokenId::OpenBracket => expression = self.parse_element_access(expression)?,
                _ => return Ok(expression),
            }
        }
    }

    fn parse_primary_start(&mut self) -> AnalyzerResult<Operand> {
        match self.id() {
            TokenId::Identifier => self.parse_identifier(),
            TokenId::StringLiteral => self.parse_string_literal(),
            TokenId::IntegerLiteral => self.parse_integer_literal(),
            TokenId::RealLiteral => self.parse_real_literal(),
            TokenId::OpenParen => self.parse_paren_expression(),
            _ => self.fail(ParseErrorKind::ExpressionExpected),
        }
    }

    fn parse_paren_expression(&mut self) -> AnalyzerResult<Operand> {
        self.validate(TokenId::OpenParen, ParseErrorKind::OpenParenExpected)?;
        self.next()?;
        let inner = self.parse_conditional()?;
        self.validate(TokenId::CloseParen, ParseErrorKind::CloseParenOrOperatorExpected)?;
        self.next()?;
        Ok(inner)
    }

    fn parse_integer_literal(&mut self) -> AnalyzerResult<Operand> {
        let token = self.tokens.current().clone();
        let Some(name) = integer_literal_type(&token.text) else {
            return self.fail(ParseErrorKind::InvalidIntegerLiteral(token.text));
        };
        let ty = self.builtin(name)?.ty;
        self.next()?;
        Ok(Operand::literal(ty, Literal::Integer))
    }

    fn parse_real_literal(&mut self) -> AnalyzerResult<Operand> {
        let token = self.tokens.current().clone();
        let Some(name) = real_literal_type(&token.text) else {
            return self.fail(ParseErrorKind::InvalidRealLiteral(token.text));
        };
        let operand = self.builtin(name)?;
        self.next()?;
        Ok(operand)
    }

    fn parse_string_literal(&mut self) -> AnalyzerResult<Operand> {
        let token = self.tokens.current().clone();
        let dialect = self.preferences.string_literal_parsing;

        let mut lookahead = self.tokens.clone();
        lookahead.next_token()?;
        if lookahead.current().id == TokenId::Question {
            lookahead.next_token()?;
        }
        let is_cast = lookahead.current().id == TokenId::OpenParen;

        let value = parse_string_literal(&token.text, token.pos, dialect)?;

        if token.text.starts_with('\'') {
            if value.chars().count() != 1 {
                return self.fail(ParseErrorKind::InvalidCharacterLiteral);
            }
            let operand = self.builtin(CHAR)?;
            self.next()?;
            return Ok(operand);
        }

        if is_cast {
            self.tokens = lookahead;
            let arguments = self.parse_argument_list()?;
            let target = self
                .registry
                .get(&value)
                .or_else(|| self.registry.find_accessible(&value, Some(self.context())));
            let Some(target) = target else {
                return self.fail_at(ParseErrorKind::TypeNotFound(value), token.pos);
            };
            return self.convert_to(target, &arguments, token.pos);
        }

        let mut text = token.text.clone();
        self.next()?;
        while self.id() == TokenId::StringLiteral {
            text.push_str(&self.tokens.current().text);
            self.next()?;
        }
        parse_string_literal(&text, token.pos, dialect)?;
        self.builtin(STRING)
    }

    /// `T(x)` as a conversion, or a constructor call
    fn convert_to(
        &self,
        target: TypeRef,
        arguments: &[Operand],
        position: usize,
    ) -> AnalyzerResult<Operand> {
        let constructed = self
            .select_overload(
                target.constructors.iter().map(|c| (c.parameters.as_slice(), ())),
                arguments,
            )
            .is_some();
        let converted = matches!(arguments, [single] if self.casts(single, &target));

        if constructed || converted {
            Ok(Operand::value(target))
        } else {
            self.fail_at(ParseErrorKind::NoMatchingConstructor(target.name.clone()), position)
        }
    }

    fn parse_identifier(&mut self) -> AnalyzerResult<Operand> {
        let token = self.tokens.current().clone();
        let name = sanitize_identifier(&token.text).to_string();

        match name.to_ascii_lowercase().as_str() {
            "it" => {
                self.next()?;
                return Ok(Operand::value(self.scope().it.clone()));
            }
            "parent" | "outerit" => {
                if self.scopes.len() < 2 {
                    return self.fail(ParseErrorKind::NoParentInScope(name));
                }
                let outer = self.scopes[self.scopes.len() - 2].it.clone();
                self.next()?;
                return Ok(Operand::value(outer));
            }
            "true" | "false" => {
                let operand = self.builtin(BOOLEAN)?;
                self.next()?;
                return Ok(operand);
            }
            "null" => {
                let object = self.builtin(OBJECT)?;
                self.next()?;
                return Ok(Operand::literal(object.ty, Literal::Null));
            }
            "iif" => return self.parse_iif(),
            "np" => return self.parse_np(),
            "new" => return self.parse_new(),
            _ => {}
        }

        let parameter = self
            .scopes
            .iter()
            .rev()
            .find(|scope| scope.parameter.as_deref() == Some(name.as_str()))
            .map(|scope| scope.it.clone());
        if let Some(ty) = parameter {
            self.next()?;
            return Ok(Operand::named(ty, &name));
        }

        if let Some(ty) = self.parse_type_name()? {
            return self.parse_type_access(ty, token.pos);
        }

        let it = self.scope().it.clone();
        if !self.has_member(&it, &name)? {
            return self.fail(ParseErrorKind::UnknownIdentifier(name));
        }
        self.parse_member_access(Operand::value(it), Binding::Instance)
    }

    /// Whether the identifier at the cursor can be read as a member of `ty`
    fn has_member(&self, ty: &TypeRef, name: &str) -> AnalyzerResult<bool> {
        let case_insensitive = self.preferences.case_insensitive_members;
        if find_value_member(self.registry, ty, name, Binding::Instance, case_insensitive).is_some()
            || !find_methods(self.registry, ty, name, Binding::Instance, case_insensitive).is_empty()
        {
            return Ok(true);
        }
        let is_call = self.tokens.peek()?.id == TokenId::OpenParen;
        Ok(is_call
            && self.registry.element_type(ty).is_some()
            && SequenceOperator::lookup(name, case_insensitive).is_some())
    }

    /// Consume a (possibly qualified) type name at the cursor
    fn parse_type_name(&mut self) -> AnalyzerResult<Option<TypeRef>> {
        let name = sanitize_identifier(&self.tokens.current().text).to_string();
        let context = self.context().clone();

        let direct = alias_full_name(&name)
            .and_then(|full| self.registry.get(full))
            .or_else(|| self.registry.find_accessible(&name, Some(&context)));
        if let Some(ty) = direct {
            self.next()?;
            return Ok(Some(ty));
        }

        if !self.registry.is_namespace_prefix(&name, Some(&context)) {
            return Ok(None);
        }

        let mut lookahead = self.tokens.clone();
        let mut qualified = name;
        loop {
            lookahead.next_token()?;
            if !matches!(lookahead.current().id, TokenId::Dot | TokenId::Plus) {
                return Ok(None);
            }
            lookahead.next_token()?;
            if lookahead.current().id != TokenId::Identifier {
                return Ok(None);
            }
            qualified.push('.');
            qualified.push_str(sanitize_identifier(&lookahead.current().text));

            if let Some(ty) = self.registry.find_accessible(&qualified, Some(&context)) {
                self.tokens = lookahead;
                self.next()?;
                return Ok(Some(ty));
            }
            if !self.registry.is_namespace_prefix(&qualified, Some(&context)) {
                return Ok(None);
            }
        }
    }

    /// A type name must be followed by a static member access or a conversion
    fn parse_type_access(&mut self, ty: TypeRef, position: usize) -> AnalyzerResult<Operand> {
        match self.id() {
            TokenId::OpenParen => {
                let arguments = self.parse_argument_list()?;
                self.convert_to(ty, &arguments, position)
            }
            TokenId::Dot => {
                self.next()?;
                self.parse_member_access(Operand::value(ty), Binding::Static)
            }
            _ => self.fail(ParseErrorKind::DotOrOpenParenExpected),
        }
    }

    fn parse_member_access(&mut self, target: Operand, binding: Binding) -> AnalyzerResult<Operand> {
        self.validate(TokenId::Identifier, ParseErrorKind::IdentifierExpected)?;
        let token = self.tokens.current().clone();
        let name = sanitize_identifier(&token.text).to_string();
        let case_insensitive = self.preferences.case_insensitive_members;
        let ty = target.ty;
        self.next()?;

        if self.id() == TokenId::OpenParen {
            let methods = find_methods(self.registry, &ty, &name, binding, case_insensitive);

            if methods.is_empty() && binding == Binding::Instance {
                let sequence = self.registry.element_type(&ty).zip(SequenceOperator::lookup(&name, case_insensitive));
                if let Some((element, op)) = sequence {
                    return self.parse_sequence_operator(op, element, &name);
                }
            }

            let arguments = self.parse_argument_list()?;
            let selected = self.select_overload(
                methods.iter().map(|m| (m.parameters.as_slice(), m)),
                &arguments,
            );
            return match selected {
                Some(method) => Ok(Operand::value(self.resolve(&method.return_type, token.pos)?)),
                None => self.fail_at(
                    ParseErrorKind::NoApplicableMethod {
                        method: name,
                        type_name: ty.name.clone(),
                    },
                    token.pos,
                ),
            };
        }

        match find_value_member(self.registry, &ty, &name, binding, case_insensitive) {
            Some(member) => Ok(Operand::named(
                self.resolve(&member.type_name, token.pos)?,
                &member.name,
            )),
            None => self.fail_at(
                ParseErrorKind::UnknownPropertyOrField {
                    member: name,
                    type_name: ty.name.clone(),
                },
                token.pos,
            ),
        }
    }

    fn parse_element_access(&mut self, target: Operand) -> AnalyzerResult<Operand> {
        let position = self.pos();
        self.validate(TokenId::OpenBracket, ParseErrorKind::OpenParenExpected)?;
        self.next()?;
        let arguments = self.parse_arguments()?;
        self.validate(TokenId::CloseBracket, ParseErrorKind::CloseBracketOrCommaExpected)?;
        self.next()?;

        let indexers = find_indexers(self.registry, &target.ty);
        let selected = self.select_overload(
            indexers.iter().map(|i| (i.parameters.as_slice(), i)),
            &arguments,
        );
        match selected {
            Some(indexer) => Ok(Operand::value(self.resolve(&indexer.type_name, position)?)),
            None => self.fail_at(
                ParseErrorKind::NoApplicableIndexer(target.ty.name.clone()),
                position,
            ),
        }
    }

    fn parse_argument_list(&mut self) -> AnalyzerResult<Vec<Operand>> {
        self.validate(TokenId::OpenParen, ParseErrorKind::OpenParenExpected)?;
        self.next()?;
        let arguments = if self.id() != TokenId::CloseParen {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        self.validate(TokenId::CloseParen, ParseErrorKind::CloseParenOrCommaExpected)?;
        self.next()?;
        Ok(arguments)
    }

    fn parse_arguments(&mut self) -> AnalyzerResult<Vec<Operand>> {
        let mut arguments = Vec::new();
        loop {
            arguments.push(self.parse_argument()?);
            if self.id() != TokenId::Comma {
                return Ok(arguments);
            }
            self.next()?;
        }
    }

    /// Number of exactly matching parameters, or `None` when not applicable
    fn applicability(&self, parameters: &[ParameterInfo], arguments: &[Operand]) -> Option<usize> {
        if parameters.len() != arguments.len() {
            return None;
        }
        let mut exact = 0;
        for (parameter, argument) in parameters.iter().zip(arguments) {
            let target = self.registry.get(&parameter.type_name)?;
            if !self.converts(argument, &target) {
                return None;
            }
            if matches!(argument.literal, Literal::None | Literal::Integer) && argument.ty == target {
                exact += 1;
            }
        }
        Some(exact)
    }

    /// Best applicable candidate; ties go to the first declared
    fn select_overload<'p, T>(
        &self,
        candidates: impl Iterator<Item = (&'p [ParameterInfo], T)>,
        arguments: &[Operand],
    ) -> Option<T> {
        let mut best: Option<(usize, T)> = None;
        for (parameters, candidate) in candidates {
            if let Some(score) = self.applicability(parameters, arguments) {
                if best.as_ref().map_or(true, |(top, _)| score > *top) {
                    best = Some((score, candidate));
                }
            }
        }
        best.map(|(_, candidate)| candidate)
    }

    // === KEYWORD FORMS ===

    /// `iif(test, a, b)`
    fn parse_iif(&mut self) -> AnalyzerResult<Operand> {
        let position = self.pos();
        self.next()?;
        let arguments = self.parse_argument_list()?;
        let [test, when_true, when_false]: [Operand; 3] = arguments.try_into().map_err(|_| {
            AnalyzerError::from(ParseError::new(
                ParseErrorKind::ArgumentCountMismatch {
                    function: "iif".to_string(),
                    expected: 3,
                },
                position,
            ))
        })?;
        self.require_boolean(&test, position)?;
        self.unify(when_true, when_false, position)
    }

    /// `np(x)` or `np(x, fallback)`; the type is that of `x`
    fn parse_np(&mut self) -> AnalyzerResult<Operand> {
        let position = self.pos();
        self.next()?;
        let mut arguments = self.parse_argument_list()?.into_iter();
        match (arguments.next(), arguments.next(), arguments.next()) {
            (Some(value), None, None) => Ok(Operand::value(value.ty)),
            (Some(value), Some(fallback), None) => self.unify(value, fallback, position),
            _ => self.fail_at(
                ParseErrorKind::ArgumentCountMismatch {
                    function: "np".to_string(),
                    expected: 1,
                },
                position,
            ),
        }
    }

    /// `new(...)`, `new T(...)`, `new T[] {...}`, `new[] {...}`, `new T {...}`
    fn parse_new(&mut self) -> AnalyzerResult<Operand> {
        let position = self.pos();
        self.next()?;
        if !matches!(
            self.id(),
            TokenId::OpenParen | TokenId::OpenCurlyParen | TokenId::OpenBracket | TokenId::Identifier
        ) {
            return self.fail(ParseErrorKind::OpenParenOrIdentifierExpected);
        }

        let mut target: Option<TypeRef> = None;
        if self.id() == TokenId::Identifier {
            let start = self.pos();
            let mut name = sanitize_identifier(&self.tokens.current().text).to_string();
            self.next()?;
            while matches!(self.id(), TokenId::Dot | TokenId::Plus) {
                self.next()?;
                if self.id() != TokenId::Identifier {
                    return self.fail(ParseErrorKind::IdentifierExpected);
                }
                name.push('.');
                name.push_str(sanitize_identifier(&self.tokens.current().text));
                self.next()?;
            }

            if !matches!(
                self.id(),
                TokenId::OpenParen | TokenId::OpenBracket | TokenId::OpenCurlyParen
            ) {
                return self.fail(ParseErrorKind::OpenParenExpected);
            }

            let ty = self
                .registry
                .get(&name)
                .or_else(|| self.registry.find_accessible(&name, Some(self.context())));
            match ty {
                Some(ty) if self.id() == TokenId::OpenParen => {
                    let arguments = self.parse_argument_list()?;
                    return self.convert_to(ty, &arguments, start);
                }
                Some(ty) => target = Some(ty),
                None => return self.fail_at(ParseErrorKind::TypeNotFound(name), start),
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

        let mut members: Vec<(String, Operand)> = Vec::new();
        let mut elements: Vec<Operand> = Vec::new();
        while !matches!(self.id(), TokenId::CloseParen | TokenId::CloseCurlyParen) {
            let member_position = self.pos();
            let value = self.parse_conditional()?;

            if array_initializer {
                elements.push(value);
            } else {
                let alias = if self.tokens.token_is_identifier("as") {
                    self.next()?;
                    Some(self.get_identifier_as()?)
                } else {
                    value.name.clone()
                };
                match alias {
                    Some(alias) => members.push((alias, value)),
                    None => return self.fail_at(ParseErrorKind::MissingAsClause, member_position),
                }
            }

            if self.id() != TokenId::Comma {
                break;
            }
            self.next()?;
        }

        if !matches!(self.id(), TokenId::CloseParen | TokenId::CloseCurlyParen) {
            return self.fail(ParseErrorKind::CloseParenOrCommaExpected);
        }
        self.next()?;

        if array_initializer {
            let element = match target {
                Some(ty) => ty,
                None => {
                    let mut common: Option<Operand> = None;
                    for element in elements {
                        common = Some(match common {
                            Some(current) => self.unify(current, element, position)?,
                            None => element,
                        });
                    }
                    match common {
                        Some(operand) => operand.ty,
                        None => self.builtin(OBJECT)?.ty,
                    }
                }
            };
            return Ok(Operand::value(array_of(&element)));
        }

        if let Some(ty) = target {
            return Ok(Operand::value(ty));
        }
        Ok(Operand::value(anonymous_type(&members)))
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

    // === SEQUENCE OPERATORS ===

    fn parse_sequence_operator(
        &mut self,
        op: SequenceOperator,
        element: TypeRef,
        name: &str,
    ) -> AnalyzerResult<Operand> {
        let position = self.pos();
        self.validate(TokenId::OpenParen, ParseErrorKind::OpenParenExpected)?;
        self.next()?;

        let mut arguments = Vec::new();
        if self.id() != TokenId::CloseParen {
            if op.takes_lambda() {
                arguments.push(self.parse_scoped_argument(element.clone())?);
            } else {
                arguments = self.parse_arguments()?;
            }
        }
        self.validate(TokenId::CloseParen, ParseErrorKind::CloseParenOrCommaExpected)?;
        self.next()?;

        let count_mismatch = |expected: usize| -> AnalyzerResult<Operand> {
            Err(ParseError::new(
                ParseErrorKind::ArgumentCountMismatch {
                    function: name.to_string(),
                    expected,
                },
                position,
            )
            .into())
        };

        use SequenceOperator::*;
        match (op, arguments.as_slice()) {
            (Any, []) => self.builtin(BOOLEAN),
            (Any | All, [predicate]) => {
                self.require_boolean(predicate, position)?;
                self.builtin(BOOLEAN)
            }
            (Count, []) => self.builtin(INT32),
            (LongCount, []) => self.builtin(INT64),
            (Count | LongCount, [predicate]) => {
                self.require_boolean(predicate, position)?;
                self.builtin(if op == Count { INT32 } else { INT64 })
            }
            (Where, [predicate]) => {
                self.require_boolean(predicate, position)?;
                Ok(Operand::value(array_of(&element)))
            }
            (Select, [selector]) => Ok(Operand::value(array_of(&selector.ty))),
            (First | FirstOrDefault | Last | LastOrDefault | Single | SingleOrDefault, []) => {
                Ok(Operand::value(element))
            }
            (First | FirstOrDefault | Last | LastOrDefault | Single | SingleOrDefault, [predicate]) => {
                self.require_boolean(predicate, position)?;
                Ok(Operand::value(element))
            }
            (Sum | Min | Max | Average, []) => self.aggregate(op, Operand::value(element), position),
            (Sum | Min | Max | Average, [selector]) => self.aggregate(op, selector.clone(), position),
            (Contains, [value]) => {
                if !self.converts(value, &element) {
                    return self.fail_at(ParseErrorKind::ExpressionTypeMismatch(element.name.clone()), position);
                }
                self.builtin(BOOLEAN)
            }
            (OrderBy | OrderByDescending, [_]) => Ok(Operand::value(array_of(&element))),
            (Skip | Take, [count]) => {
                let int32 = self.builtin(INT32)?.ty;
                if !self.converts(count, &int32) {
                    return self.fail_at(ParseErrorKind::ExpressionTypeMismatch("Int32".to_string()), position);
                }
                Ok(Operand::value(array_of(&element)))
            }
            (Distinct | Reverse | ToArray | ToList, []) => Ok(Operand::value(array_of(&element))),

            (Distinct | Reverse | ToArray | ToList, _) => count_mismatch(0),
            _ => count_mismatch(1),
        }
    }

    /// Argument evaluated with `it` bound to the element, optionally `x => body`
    fn parse_scoped_argument(&mut self, element: TypeRef) -> AnalyzerResult<Operand> {
        if self.scopes.len() >= MAX_SCOPE_DEPTH {
            return self.fail(ParseErrorKind::MaxParseDepth);
        }

        let mut parameter = None;
        if self.id() == TokenId::Identifier && self.tokens.peek()?.id == TokenId::Lambda {
            parameter = Some(sanitize_identifier(&self.tokens.current().text).to_string());
            self.next()?;
            self.next()?;
        }

        self.scopes.push(Scope {
            it: element,
            parameter,
        });
        let result = self.parse_conditional();
        self.scopes.pop();
        result
    }

    fn aggregate(&self, op: SequenceOperator, value: Operand, position: usize) -> AnalyzerResult<Operand> {
        let name = value.type_name();
        match op {
            SequenceOperator::Min | SequenceOperator::Max => Ok(Operand::value(value.ty)),
            _ if !is_arithmetic(&name) || name == CHAR => self.fail_at(
                ParseErrorKind::IncompatibleOperand {
                    op: format!("{:?}", op),
                    operand: value.ty.name.clone(),
                },
                position,
            ),
            SequenceOperator::Average if name != DECIMAL && name != SINGLE => self.builtin(DOUBLE),
            _ => Ok(Operand::value(value.ty)),
        }
    }
}

// ============================================================================
// LITERALS AND SYNTHESIZED TYPES
// ============================================================================

/// Type of an integer literal from its magnitude and `U`/`L` suffix
fn integer_literal_type(text: &str) -> Option<&'static str> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = body.trim_end_matches(['u', 'U', 'l', 'L']);
    let suffix = body[digits.len()..].to_ascii_uppercase();

    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u64>().ok()?,
    };

    if negative {
        return match suffix.as_str() {
            "" if value <= 1 << 31 => Some(INT32),
            "" | "L" if value <= 1 << 63 => Some(INT64),
            _ => None,
        };
    }

    match suffix.as_str() {
        "" if value <= i32::MAX as u64 => Some(INT32),
        "" if value <= u32::MAX as u64 => Some(UINT32),
        "" | "L" if value <= i64::MAX as u64 => Some(INT64),
        "U" if value <= u32::MAX as u64 => Some(UINT32),
        "" | "L" | "U" | "UL" | "LU" => Some(UINT64),
        _ => None,
    }
}

/// Type of a real literal from its `F`/`D`/`M` suffix
fn real_literal_type(text: &str) -> Option<&'static str> {
    let body = text.strip_prefix('-').unwrap_or(text);
    let (digits, name) = match body.chars().last() {
        Some('F' | 'f') => (&body[..body.len() - 1], SINGLE),
        Some('M' | 'm') => (&body[..body.len() - 1], DECIMAL),
        Some('D' | 'd') => (&body[..body.len() - 1], DOUBLE),
        _ => (body, DOUBLE),
    };
    digits.parse::<f64>().ok().map(|_| name)
}

/// Structural type for `new (a as X, b as Y)`; identical shapes share a name
fn anonymous_type(members: &[(String, Operand)]) -> TypeRef {
    let shape = members
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value.type_name()))
        .collect::<Vec<_>>()
        .join(",");
    let mut builder = TypeBuilder::class("", &format!("<>f__AnonymousType({})", shape));
    for (name, value) in members {
        builder = builder.property(name, &value.type_name());
    }
    builder.build_ref()
}
