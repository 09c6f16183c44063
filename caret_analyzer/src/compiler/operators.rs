//! Operator typing tables
//!
//! Pure functions over full type names. The typed parser layers literal
//! adaptation, `null` and reference conversions on top of these.

use crate::tokens::TokenId;
use crate::types::builtin::{
    BOOLEAN, CHAR, DATE_TIME, DATE_TIME_OFFSET, DECIMAL, DOUBLE, INT16, INT32, INT64, SINGLE,
    STRING, TIME_SPAN, UINT16, UINT32, UINT64,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    OrElse,
    AndAlso,
    BitwiseAnd,
    BitwiseOr,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub fn from_token(id: TokenId) -> Option<Self> {
        use BinaryOperator::*;
        Some(match id {
            TokenId::DoubleBar => OrElse,
            TokenId::DoubleAmpersand => AndAlso,
            TokenId::Ampersand => BitwiseAnd,
            TokenId::Bar => BitwiseOr,
            TokenId::Equal | TokenId::DoubleEqual => Equal,
            TokenId::ExclamationEqual | TokenId::LessGreater => NotEqual,
            TokenId::LessThan => LessThan,
            TokenId::LessThanEqual => LessThanOrEqual,
            TokenId::GreaterThan => GreaterThan,
            TokenId::GreaterThanEqual => GreaterThanOrEqual,
            TokenId::ShiftLeft => ShiftLeft,
            TokenId::ShiftRight => ShiftRight,
            TokenId::Plus => Add,
            TokenId::Minus => Subtract,
            TokenId::Asterisk => Multiply,
            TokenId::Slash => Divide,
            TokenId::Percent => Modulo,
            _ => return None,
        })
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOperator::Equal | BinaryOperator::NotEqual)
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOperator::LessThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanOrEqual
        )
    }
}

pub fn is_integral(name: &str) -> bool {
    matches!(
        name,
        "System.SByte"
            | "System.Byte"
            | "System.Int16"
            | "System.UInt16"
            | "System.Int32"
            | "System.UInt32"
            | "System.Int64"
            | "System.UInt64"
    )
}

fn is_signed_integral(name: &str) -> bool {
    matches!(name, "System.SByte" | "System.Int16" | "System.Int32" | "System.Int64")
}

/// Numeric or `Char`, the operands arithmetic accepts
pub fn is_arithmetic(name: &str) -> bool {
    name == CHAR || is_integral(name) || matches!(name, "System.Single" | "System.Double" | "System.Decimal")
}

/// Implicit numeric conversions
pub fn is_implicit_numeric(from: &str, to: &str) -> bool {
    if from == to {
        return is_arithmetic(from);
    }
    let targets: &[&str] = match from {
        "System.SByte" => &[INT16, INT32, INT64, SINGLE, DOUBLE, DECIMAL],
        "System.Byte" => &[INT16, UINT16, INT32, UINT32, INT64, UINT64, SINGLE, DOUBLE, DECIMAL],
        "System.Int16" => &[INT32, INT64, SINGLE, DOUBLE, DECIMAL],
        "System.UInt16" => &[INT32, UINT32, INT64, UINT64, SINGLE, DOUBLE, DECIMAL],
        "System.Int32" => &[INT64, SINGLE, DOUBLE, DECIMAL],
        "System.UInt32" => &[INT64, UINT64, SINGLE, DOUBLE, DECIMAL],
        "System.Int64" | "System.UInt64" => &[SINGLE, DOUBLE, DECIMAL],
        "System.Char" => &[UINT16, INT32, UINT32, INT64, UINT64, SINGLE, DOUBLE, DECIMAL],
        "System.Single" => &[DOUBLE],
        _ => &[],
    };
    targets.contains(&to)
}

/// Binary numeric promotion; `None` when the operands have no common type
pub fn promote(left: &str, right: &str) -> Option<&'static str> {
    if !is_arithmetic(left) || !is_arithmetic(right) {
        return None;
    }
    let either = |name: &str| left == name || right == name;

    if either(DECIMAL) {
        return (!either(SINGLE) && !either(DOUBLE)).then_some(DECIMAL);
    }
    if either(DOUBLE) {
        return Some(DOUBLE);
    }
    if either(SINGLE) {
        return Some(SINGLE);
    }
    if either(UINT64) {
        return (!is_signed_integral(left) && !is_signed_integral(right)).then_some(UINT64);
    }
    if either(INT64) {
        return Some(INT64);
    }
    if either(UINT32) {
        let signed = is_signed_integral(left) || is_signed_integral(right);
        return Some(if signed { INT64 } else { UINT32 });
    }
    Some(INT32)
}

/// Unary numeric promotion (at least `Int32`)
pub fn promote_unary(operand: &str) -> Option<&'static str> {
    promote(operand, operand)
}

/// Result of unary minus
pub fn negate(operand: &str) -> Option<&'static str> {
    match operand {
        "System.UInt64" => None,
        "System.UInt32" => Some(INT64),
        "System.TimeSpan" => Some(TIME_SPAN),
        other => promote_unary(other),
    }
}

/// Date and time arithmetic
pub fn temporal_result(op: BinaryOperator, left: &str, right: &str) -> Option<&'static str> {
    match (op, left, right) {
        (BinaryOperator::Add, "System.DateTime", "System.TimeSpan")
        | (BinaryOperator::Subtract, "System.DateTime", "System.TimeSpan") => Some(DATE_TIME),
        (BinaryOperator::Add, "System.DateTimeOffset", "System.TimeSpan")
        | (BinaryOperator::Subtract, "System.DateTimeOffset", "System.TimeSpan") => {
            Some(DATE_TIME_OFFSET)
        }
        (BinaryOperator::Subtract, "System.DateTime", "System.DateTime")
        | (BinaryOperator::Subtract, "System.DateTimeOffset", "System.DateTimeOffset")
        | (BinaryOperator::Add, "System.TimeSpan", "System.TimeSpan")
        | (BinaryOperator::Subtract, "System.TimeSpan", "System.TimeSpan") => Some(TIME_SPAN),
        _ => None,
    }
}

/// Types whose values of the same type can be ordered with `<` and friends
pub fn is_ordered(name: &str) -> bool {
    is_arithmetic(name)
        || matches!(name, "System.String" | "System.DateTime" | "System.DateTimeOffset" | "System.TimeSpan" | "System.Guid")
}

/// Whether a boolean-typed operand
pub fn is_boolean(name: &str) -> bool {
    name == BOOLEAN
}

/// `+` with a string on either side concatenates
pub fn is_concatenation(op: BinaryOperator, left: &str, right: &str) -> bool {
    op == BinaryOperator::Add && (left == STRING || right == STRING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtin::BYTE;

    #[test]
    fn test_binary_promotion() {
        assert_eq!(promote(BYTE, BYTE), Some(INT32));
        assert_eq!(promote(INT32, INT64), Some(INT64));
        assert_eq!(promote(INT32, UINT32), Some(INT64));
        assert_eq!(promote(UINT16, UINT32), Some(UINT32));
        assert_eq!(promote(INT32, DOUBLE), Some(DOUBLE));
        assert_eq!(promote(SINGLE, INT64), Some(SINGLE));
        assert_eq!(promote(DECIMAL, INT32), Some(DECIMAL));
        assert_eq!(promote(CHAR, CHAR), Some(INT32));
        assert_eq!(promote(DECIMAL, DOUBLE), None);
        assert_eq!(promote(UINT64, INT32), None);
        assert_eq!(promote(STRING, INT32), None);
    }

    #[test]
    fn test_unary_promotion() {
        assert_eq!(negate(INT16), Some(INT32));
        assert_eq!(negate(UINT32), Some(INT64));
        assert_eq!(negate(UINT64), None);
        assert_eq!(negate(DOUBLE), Some(DOUBLE));
        assert_eq!(negate(TIME_SPAN), Some(TIME_SPAN));
        assert_eq!(negate(BOOLEAN), None);
    }

    #[test]
    fn test_implicit_numeric_conversions() {
        assert!(is_implicit_numeric(INT32, DOUBLE));
        assert!(is_implicit_numeric(CHAR, INT32));
        assert!(is_implicit_numeric(INT32, INT32));
        assert!(!is_implicit_numeric(DOUBLE, INT32));
        assert!(!is_implicit_numeric(INT64, UINT64));
        assert!(!is_implicit_numeric(STRING, STRING));
    }

    #[test]
    fn test_temporal_arithmetic() {
        assert_eq!(temporal_result(BinaryOperator::Subtract, DATE_TIME, DATE_TIME), Some(TIME_SPAN));
        assert_eq!(temporal_result(BinaryOperator::Add, DATE_TIME, TIME_SPAN), Some(DATE_TIME));
        assert_eq!(temporal_result(BinaryOperator::Add, DATE_TIME, DATE_TIME), None);
        assert_eq!(
            temporal_result(BinaryOperator::Subtract, DATE_TIME_OFFSET, TIME_SPAN),
            Some(DATE_TIME_OFFSET)
        );
    }

    #[test]
    fn test_operator_tokens() {
        assert_eq!(BinaryOperator::from_token(TokenId::LessGreater), Some(BinaryOperator::NotEqual));
        assert!(BinaryOperator::Equal.is_equality());
        assert!(BinaryOperator::GreaterThanOrEqual.is_relational());
        assert_eq!(BinaryOperator::from_token(TokenId::Dot), None);
        assert!(is_concatenation(BinaryOperator::Add, INT32, STRING));
        assert!(!is_concatenation(BinaryOperator::Multiply, STRING, STRING));
    }
}
