//! Error types shared by the lexer, the fragment locator and the compiler
//!
//! A `ParseError` is a message key plus the byte offset of the offending
//! token. It is used for control flow inside the locator and only surfaces to
//! callers when type resolution also fails. `AnalyzerError` is the public
//! error of every analyzer entry point.

use crate::config::compile_time::lexical::{MAX_IDENTIFIER_LENGTH, MAX_SOURCE_LENGTH, MAX_STRING_SIZE};
use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::logging::{codes, Code};

pub type ParseResult<T> = Result<T, ParseError>;
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Message keys for grammar, lexical and typing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    // === LEXICAL ===
    #[error("Syntax error '{0}'")]
    InvalidCharacter(char),

    #[error("Unterminated string literal")]
    UnterminatedStringLiteral,

    #[error("Digit expected")]
    DigitExpected,

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("String literal too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },

    // === STRING LITERALS ===
    #[error("String literal must be at least two characters long")]
    InvalidStringLength,

    #[error("String literal must start with a single or double quote")]
    InvalidStringQuoteCharacter,

    #[error("String literal is not closed by a matching quote")]
    UnexpectedUnclosedString,

    #[error("Invalid escape sequence: {0}")]
    InvalidEscapeSequence(String),

    #[error("Character literal must contain exactly one character")]
    InvalidCharacterLiteral,

    // === SYNTAX ===
    #[error("Expression expected")]
    ExpressionExpected,

    #[error("'{0}' expected")]
    TokenExpected(String),

    #[error("':' expected")]
    ColonExpected,

    #[error("'(' expected")]
    OpenParenExpected,

    #[error("'{{' expected")]
    OpenCurlyParenExpected,

    #[error("'(' or identifier expected")]
    OpenParenOrIdentifierExpected,

    #[error("')' or operator expected")]
    CloseParenOrOperatorExpected,

    #[error("')' or ',' expected")]
    CloseParenOrCommaExpected,

    #[error("']' expected")]
    CloseBracketExpected,

    #[error("']' or ',' expected")]
    CloseBracketOrCommaExpected,

    #[error("'.' or '(' or string literal expected")]
    DotOrOpenParenExpected,

    #[error("Identifier expected")]
    IdentifierExpected,

    #[error("When using an out variable, a discard '_' is required")]
    OutKeywordRequiresDiscard,

    #[error("Syntax error")]
    SyntaxError,

    #[error("Expression nesting exceeds the maximum depth of {MAX_PARSE_DEPTH}")]
    MaxParseDepth,

    // === TYPING ===
    #[error("Unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("No property or field '{member}' exists in type '{type_name}'")]
    UnknownPropertyOrField { member: String, type_name: String },

    #[error("No applicable method '{method}' exists in type '{type_name}'")]
    NoApplicableMethod { method: String, type_name: String },

    #[error("No applicable indexer exists in type '{0}'")]
    NoApplicableIndexer(String),

    #[error("No matching constructor in type '{0}'")]
    NoMatchingConstructor(String),

    #[error("Operator '{op}' incompatible with operand types '{left}' and '{right}'")]
    IncompatibleOperands {
        op: String,
        left: String,
        right: String,
    },

    #[error("Operator '{op}' incompatible with operand type '{operand}'")]
    IncompatibleOperand { op: String, operand: String },

    #[error("Neither of the types '{left}' and '{right}' converts to the other")]
    NeitherTypeConvertsToOther { left: String, right: String },

    #[error("Expression of type '{0}' expected")]
    ExpressionTypeMismatch(String),

    #[error("The '{function}' function requires {expected} arguments")]
    ArgumentCountMismatch { function: String, expected: usize },

    #[error("Type '{0}' not found")]
    TypeNotFound(String),

    #[error("Type '{0}' is referenced by the type model but not registered")]
    UnresolvedType(String),

    #[error("Expression is missing an 'as' clause")]
    MissingAsClause,

    #[error("Invalid integer literal '{0}'")]
    InvalidIntegerLiteral(String),

    #[error("Invalid real literal '{0}'")]
    InvalidRealLiteral(String),

    #[error("No enclosing scope for '{0}'")]
    NoParentInScope(String),
}

impl ParseErrorKind {
    pub fn error_code(&self) -> Code {
        use ParseErrorKind::*;
        match self {
            InvalidCharacter(_) => codes::lexical::INVALID_CHARACTER,
            UnterminatedStringLiteral => codes::lexical::UNTERMINATED_STRING,
            DigitExpected | InvalidIntegerLiteral(_) | InvalidRealLiteral(_) => {
                codes::lexical::INVALID_NUMBER
            }
            IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            InvalidEscapeSequence(_) => codes::lexical::INVALID_ESCAPE,
            InvalidStringLength
            | InvalidStringQuoteCharacter
            | UnexpectedUnclosedString
            | InvalidCharacterLiteral => codes::lexical::INVALID_STRING_LITERAL,

            ExpressionExpected => codes::syntax::EXPRESSION_EXPECTED,
            TokenExpected(_)
            | ColonExpected
            | OpenParenExpected
            | OpenCurlyParenExpected
            | OpenParenOrIdentifierExpected
            | CloseParenOrOperatorExpected
            | CloseParenOrCommaExpected
            | CloseBracketExpected
            | CloseBracketOrCommaExpected
            | IdentifierExpected
            | SyntaxError => codes::syntax::TOKEN_EXPECTED,
            OutKeywordRequiresDiscard => codes::syntax::INVALID_OUT_KEYWORD,
            MaxParseDepth => codes::syntax::MAX_DEPTH_EXCEEDED,

            UnknownIdentifier(_) | NoParentInScope(_) => codes::compilation::UNKNOWN_IDENTIFIER,
            UnknownPropertyOrField { .. } => codes::compilation::UNKNOWN_MEMBER,
            NoApplicableMethod { .. } | NoMatchingConstructor(_) | ArgumentCountMismatch { .. } => {
                codes::compilation::NO_APPLICABLE_METHOD
            }
            NoApplicableIndexer(_) => codes::compilation::NO_APPLICABLE_INDEXER,
            IncompatibleOperands { .. }
            | IncompatibleOperand { .. }
            | NeitherTypeConvertsToOther { .. } => codes::compilation::INCOMPATIBLE_OPERANDS,
            DotOrOpenParenExpected => codes::compilation::TYPE_ACCESS_INCOMPLETE,
            TypeNotFound(_) | UnresolvedType(_) => codes::compilation::UNRESOLVED_TYPE,
            ExpressionTypeMismatch(_) | MissingAsClause => codes::compilation::TYPE_MISMATCH,
        }
    }
}

/// A message key raised at a byte offset of the analysed text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (at index {position})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    pub fn error_code(&self) -> Code {
        self.kind.error_code()
    }
}

/// Public failure of the analyzer entry points
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A construct the grammar deliberately rejects; never swallowed
    #[error("{message} (at index {position})")]
    NotSupported { message: String, position: usize },

    #[error("Caret {caret} is outside the text or not on a character boundary (length {length})")]
    InvalidCaret { caret: usize, length: usize },

    #[error("Expression text is {length} bytes (max {MAX_SOURCE_LENGTH})")]
    SourceTooLarge { length: usize },
}

impl AnalyzerError {
    pub fn error_code(&self) -> Code {
        match self {
            AnalyzerError::Parse(e) => e.error_code(),
            AnalyzerError::NotSupported { .. } => codes::syntax::UNSUPPORTED_CONSTRUCT,
            AnalyzerError::InvalidCaret { .. } => codes::syntax::INVALID_CARET,
            AnalyzerError::SourceTooLarge { .. } => codes::syntax::SOURCE_TOO_LARGE,
        }
    }

    /// Whether this is a grammar or typing failure (as opposed to a rejected construct or bad input)
    pub fn is_parse_error(&self) -> bool {
        matches!(self, AnalyzerError::Parse(_))
    }

    /// Offset in the analysed text, when the error has one
    pub fn position(&self) -> Option<usize> {
        match self {
            AnalyzerError::Parse(e) => Some(e.position),
            AnalyzerError::NotSupported { position, .. } => Some(*position),
            AnalyzerError::InvalidCaret { .. } | AnalyzerError::SourceTooLarge { .. } => None,
        }
    }

    pub(crate) fn null_propagation(position: usize) -> Self {
        AnalyzerError::NotSupported {
            message: "An expression tree lambda may not contain a null propagating operator. \
                      Use the 'np()' or 'np(...)' (null-propagation) function instead."
                .to_string(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_includes_position() {
        let error = ParseError::new(ParseErrorKind::CloseParenOrCommaExpected, 14);
        assert_eq!(error.to_string(), "')' or ',' expected (at index 14)");
        assert_eq!(error.error_code(), codes::syntax::TOKEN_EXPECTED);
    }

    #[test]
    fn test_token_expected_message() {
        let error = ParseError::new(ParseErrorKind::TokenExpected("in".to_string()), 6);
        assert_eq!(error.to_string(), "'in' expected (at index 6)");
    }

    #[test]
    fn test_analyzer_error_codes() {
        let parse: AnalyzerError = ParseError::new(ParseErrorKind::ExpressionExpected, 0).into();
        assert!(parse.is_parse_error());
        assert_eq!(parse.error_code(), codes::syntax::EXPRESSION_EXPECTED);
        assert_eq!(parse.position(), Some(0));

        let np = AnalyzerError::null_propagation(2);
        assert!(!np.is_parse_error());
        assert_eq!(np.error_code(), codes::syntax::UNSUPPORTED_CONSTRUCT);
        assert!(np.to_string().contains("np(...)"));

        let caret = AnalyzerError::InvalidCaret { caret: 9, length: 3 };
        assert_eq!(caret.position(), None);
        assert!(!codes::is_recoverable(caret.error_code().as_str()));
    }

    #[test]
    fn test_typing_errors_map_to_compilation_codes() {
        let kind = ParseErrorKind::UnknownPropertyOrField {
            member: "Nme".to_string(),
            type_name: "Customer".to_string(),
        };
        assert_eq!(kind.error_code(), codes::compilation::UNKNOWN_MEMBER);
        assert_eq!(
            kind.to_string(),
            "No property or field 'Nme' exists in type 'Customer'"
        );
        assert_eq!(
            ParseErrorKind::DotOrOpenParenExpected.error_code(),
            codes::compilation::TYPE_ACCESS_INCOMPLETE
        );
    }
}
