//! Predefined types available to every expression
//!
//! The member surface is the practical subset editors complete on. Built
//! once per process and shared.

use crate::types::info::{TypeBuilder, TypeInfo, TypeRef};
use std::sync::{Arc, OnceLock};

pub const OBJECT: &str = "System.Object";
pub const BOOLEAN: &str = "System.Boolean";
pub const CHAR: &str = "System.Char";
pub const STRING: &str = "System.String";
pub const SBYTE: &str = "System.SByte";
pub const BYTE: &str = "System.Byte";
pub const INT16: &str = "System.Int16";
pub const UINT16: &str = "System.UInt16";
pub const INT32: &str = "System.Int32";
pub const UINT32: &str = "System.UInt32";
pub const INT64: &str = "System.Int64";
pub const UINT64: &str = "System.UInt64";
pub const SINGLE: &str = "System.Single";
pub const DOUBLE: &str = "System.Double";
pub const DECIMAL: &str = "System.Decimal";
pub const DATE_TIME: &str = "System.DateTime";
pub const DATE_TIME_OFFSET: &str = "System.DateTimeOffset";
pub const TIME_SPAN: &str = "System.TimeSpan";
pub const GUID: &str = "System.Guid";
pub const MATH: &str = "System.Math";
pub const CONVERT: &str = "System.Convert";
pub const DAY_OF_WEEK: &str = "System.DayOfWeek";

/// Type names a bare identifier may denote, in match order
pub const WELL_KNOWN_TYPES: [&str; 21] = [
    OBJECT,
    BOOLEAN,
    CHAR,
    STRING,
    SBYTE,
    BYTE,
    INT16,
    UINT16,
    INT32,
    UINT32,
    INT64,
    UINT64,
    SINGLE,
    DOUBLE,
    DECIMAL,
    DATE_TIME,
    DATE_TIME_OFFSET,
    TIME_SPAN,
    GUID,
    MATH,
    CONVERT,
];

/// Numeric types ordered by widening rank
pub const NUMERIC_TYPES: [&str; 11] = [
    SBYTE, BYTE, INT16, UINT16, INT32, UINT32, INT64, UINT64, SINGLE, DOUBLE, DECIMAL,
];

/// Full name for a keyword alias such as `int` or `string`
pub fn alias_full_name(alias: &str) -> Option<&'static str> {
    Some(match alias {
        "object" => OBJECT,
        "bool" => BOOLEAN,
        "char" => CHAR,
        "string" => STRING,
        "sbyte" => SBYTE,
        "byte" => BYTE,
        "short" => INT16,
        "ushort" => UINT16,
        "int" => INT32,
        "uint" => UINT32,
        "long" => INT64,
        "ulong" => UINT64,
        "float" => SINGLE,
        "double" => DOUBLE,
        "decimal" => DECIMAL,
        _ => return None,
    })
}

pub fn is_numeric(full_name: &str) -> bool {
    NUMERIC_TYPES.contains(&full_name)
}

/// All predefined types, built on first use
pub fn builtin_types() -> &'static [TypeRef] {
    static BUILTINS: OnceLock<Vec<TypeRef>> = OnceLock::new();
    BUILTINS.get_or_init(|| build_all().into_iter().map(Arc::new).collect())
}

fn build_all() -> Vec<TypeInfo> {
    let mut types = vec![
        object(),
        boolean(),
        char_type(),
        string(),
    ];
    types.extend(NUMERIC_TYPES.iter().map(|name| numeric(name)));
    types.push(date_time());
    types.push(date_time_offset());
    types.push(time_span());
    types.push(guid());
    types.push(math());
    types.push(convert());
    types.push(
        TypeBuilder::enumeration(
            "System",
            "DayOfWeek",
            &["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"],
        )
        .build(),
    );
    types
}

fn simple_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

fn object() -> TypeInfo {
    TypeBuilder::class("System", "Object")
        .method("ToString", &[], STRING)
        .method("Equals", &[OBJECT], BOOLEAN)
        .method("GetHashCode", &[], INT32)
        .static_method("ReferenceEquals", &[OBJECT, OBJECT], BOOLEAN)
        .static_method("Equals", &[OBJECT, OBJECT], BOOLEAN)
        .constructor(&[])
        .build()
}

fn boolean() -> TypeInfo {
    TypeBuilder::structure("System", "Boolean")
        .static_field("TrueString", STRING)
        .static_field("FalseString", STRING)
        .method("CompareTo", &[BOOLEAN], INT32)
        .method("Equals", &[BOOLEAN], BOOLEAN)
        .static_method("Parse", &[STRING], BOOLEAN)
        .static_method("TryParse", &[STRING, BOOLEAN], BOOLEAN)
        .build()
}

fn char_type() -> TypeInfo {
    let mut builder = TypeBuilder::structure("System", "Char")
        .static_field("MaxValue", CHAR)
        .static_field("MinValue", CHAR)
        .method("CompareTo", &[CHAR], INT32)
        .method("Equals", &[CHAR], BOOLEAN)
        .static_method("ToUpper", &[CHAR], CHAR)
        .static_method("ToLower", &[CHAR], CHAR)
        .static_method("GetNumericValue", &[CHAR], DOUBLE)
        .static_method("Parse", &[STRING], CHAR);
    for test in ["IsDigit", "IsLetter", "IsLetterOrDigit", "IsWhiteSpace", "IsUpper", "IsLower", "IsPunctuation"] {
        builder = builder.static_method(test, &[CHAR], BOOLEAN);
    }
    builder.build()
}

fn string() -> TypeInfo {
    TypeBuilder::class("System", "String")
        .element_type(CHAR)
        .static_field("Empty", STRING)
        .property("Length", INT32)
        .indexer(&[INT32], CHAR)
        .constructor(&[CHAR, INT32])
        .method("Contains", &[STRING], BOOLEAN)
        .method("Contains", &[CHAR], BOOLEAN)
        .method("StartsWith", &[STRING], BOOLEAN)
        .method("EndsWith", &[STRING], BOOLEAN)
        .method("IndexOf", &[STRING], INT32)
        .method("IndexOf", &[CHAR], INT32)
        .method("IndexOf", &[STRING, INT32], INT32)
        .method("LastIndexOf", &[STRING], INT32)
        .method("LastIndexOf", &[CHAR], INT32)
        .method("Substring", &[INT32], STRING)
        .method("Substring", &[INT32, INT32], STRING)
        .method("ToUpper", &[], STRING)
        .method("ToLower", &[], STRING)
        .method("ToUpperInvariant", &[], STRING)
        .method("ToLowerInvariant", &[], STRING)
        .method("Trim", &[], STRING)
        .method("TrimStart", &[], STRING)
        .method("TrimEnd", &[], STRING)
        .method("Replace", &[STRING, STRING], STRING)
        .method("Replace", &[CHAR, CHAR], STRING)
        .method("Split", &[CHAR], "System.String[]")
        .method("PadLeft", &[INT32], STRING)
        .method("PadLeft", &[INT32, CHAR], STRING)
        .method("PadRight", &[INT32], STRING)
        .method("PadRight", &[INT32, CHAR], STRING)
        .method("Insert", &[INT32, STRING], STRING)
        .method("Remove", &[INT32], STRING)
        .method("Remove", &[INT32, INT32], STRING)
        .method("CompareTo", &[STRING], INT32)
        .method("Equals", &[STRING], BOOLEAN)
        .method("ToCharArray", &[], "System.Char[]")
        .static_method("IsNullOrEmpty", &[STRING], BOOLEAN)
        .static_method("IsNullOrWhiteSpace", &[STRING], BOOLEAN)
        .static_method("Concat", &[STRING, STRING], STRING)
        .static_method("Concat", &[OBJECT, OBJECT], STRING)
        .static_method("Join", &[STRING, "System.String[]"], STRING)
        .static_method("Format", &[STRING, OBJECT], STRING)
        .static_method("Format", &[STRING, OBJECT, OBJECT], STRING)
        .static_method("Compare", &[STRING, STRING], INT32)
        .static_method("Equals", &[STRING, STRING], BOOLEAN)
        .build()
}

fn numeric(full_name: &str) -> TypeInfo {
    let mut builder = TypeBuilder::structure("System", simple_name(full_name))
        .static_field("MaxValue", full_name)
        .static_field("MinValue", full_name)
        .method("CompareTo", &[full_name], INT32)
        .method("Equals", &[full_name], BOOLEAN)
        .method("ToString", &[STRING], STRING)
        .static_method("Parse", &[STRING], full_name)
        .static_method("TryParse", &[STRING, full_name], BOOLEAN);

    if full_name == SINGLE || full_name == DOUBLE {
        builder = builder
            .static_field("NaN", full_name)
            .static_field("PositiveInfinity", full_name)
            .static_field("NegativeInfinity", full_name)
            .static_field("Epsilon", full_name)
            .static_method("IsNaN", &[full_name], BOOLEAN)
            .static_method("IsInfinity", &[full_name], BOOLEAN);
    }
    if full_name == DECIMAL {
        builder = builder
            .static_field("Zero", DECIMAL)
            .static_field("One", DECIMAL)
            .static_method("Round", &[DECIMAL, INT32], DECIMAL)
            .static_method("Truncate", &[DECIMAL], DECIMAL);
    }
    builder.build()
}

fn date_time() -> TypeInfo {
    let mut builder = TypeBuilder::structure("System", "DateTime")
        .constructor(&[INT64])
        .constructor(&[INT32, INT32, INT32])
        .constructor(&[INT32, INT32, INT32, INT32, INT32, INT32])
        .static_field("MinValue", DATE_TIME)
        .static_field("MaxValue", DATE_TIME)
        .static_property("Now", DATE_TIME)
        .static_property("UtcNow", DATE_TIME)
        .static_property("Today", DATE_TIME);
    for component in ["Year", "Month", "Day", "Hour", "Minute", "Second", "Millisecond", "DayOfYear"] {
        builder = builder.property(component, INT32);
    }
    builder
        .property("Ticks", INT64)
        .property("DayOfWeek", DAY_OF_WEEK)
        .property("Date", DATE_TIME)
        .property("TimeOfDay", TIME_SPAN)
        .method("AddDays", &[DOUBLE], DATE_TIME)
        .method("AddHours", &[DOUBLE], DATE_TIME)
        .method("AddMinutes", &[DOUBLE], DATE_TIME)
        .method("AddSeconds", &[DOUBLE], DATE_TIME)
        .method("AddMilliseconds", &[DOUBLE], DATE_TIME)
        .method("AddMonths", &[INT32], DATE_TIME)
        .method("AddYears", &[INT32], DATE_TIME)
        .method("AddTicks", &[INT64], DATE_TIME)
        .method("Add", &[TIME_SPAN], DATE_TIME)
        .method("Subtract", &[TIME_SPAN], DATE_TIME)
        .method("Subtract", &[DATE_TIME], TIME_SPAN)
        .method("ToString", &[STRING], STRING)
        .method("ToUniversalTime", &[], DATE_TIME)
        .method("ToLocalTime", &[], DATE_TIME)
        .method("CompareTo", &[DATE_TIME], INT32)
        .static_method("Parse", &[STRING], DATE_TIME)
        .static_method("TryParse", &[STRING, DATE_TIME], BOOLEAN)
        .static_method("DaysInMonth", &[INT32, INT32], INT32)
        .static_method("IsLeapYear", &[INT32], BOOLEAN)
        .build()
}

fn date_time_offset() -> TypeInfo {
    let mut builder = TypeBuilder::structure("System", "DateTimeOffset")
        .constructor(&[DATE_TIME])
        .constructor(&[DATE_TIME, TIME_SPAN])
        .static_field("MinValue", DATE_TIME_OFFSET)
        .static_field("MaxValue", DATE_TIME_OFFSET)
        .static_property("Now", DATE_TIME_OFFSET)
        .static_property("UtcNow", DATE_TIME_OFFSET);
    for component in ["Year", "Month", "Day", "Hour", "Minute", "Second", "Millisecond", "DayOfYear"] {
        builder = builder.property(component, INT32);
    }
    builder
        .property("Ticks", INT64)
        .property("DayOfWeek", DAY_OF_WEEK)
        .property("DateTime", DATE_TIME)
        .property("UtcDateTime", DATE_TIME)
        .property("LocalDateTime", DATE_TIME)
        .property("Offset", TIME_SPAN)
        .property("TimeOfDay", TIME_SPAN)
        .method("AddDays", &[DOUBLE], DATE_TIME_OFFSET)
        .method("AddHours", &[DOUBLE], DATE_TIME_OFFSET)
        .method("AddMinutes", &[DOUBLE], DATE_TIME_OFFSET)
        .method("AddSeconds", &[DOUBLE], DATE_TIME_OFFSET)
        .method("AddMilliseconds", &[DOUBLE], DATE_TIME_OFFSET)
        .method("Add", &[TIME_SPAN], DATE_TIME_OFFSET)
        .method("Subtract", &[TIME_SPAN], DATE_TIME_OFFSET)
        .method("Subtract", &[DATE_TIME_OFFSET], TIME_SPAN)
        .method("ToUnixTimeSeconds", &[], INT64)
        .method("ToUnixTimeMilliseconds", &[], INT64)
        .method("ToString", &[STRING], STRING)
        .static_method("FromUnixTimeSeconds", &[INT64], DATE_TIME_OFFSET)
        .static_method("FromUnixTimeMilliseconds", &[INT64], DATE_TIME_OFFSET)
        .static_method("Parse", &[STRING], DATE_TIME_OFFSET)
        .build()
}

fn time_span() -> TypeInfo {
    let mut builder = TypeBuilder::structure("System", "TimeSpan")
        .constructor(&[INT64])
        .constructor(&[INT32, INT32, INT32])
        .constructor(&[INT32, INT32, INT32, INT32])
        .static_field("Zero", TIME_SPAN)
        .static_field("MaxValue", TIME_SPAN)
        .static_field("MinValue", TIME_SPAN);
    for component in ["Days", "Hours", "Minutes", "Seconds", "Milliseconds"] {
        builder = builder.property(component, INT32);
    }
    for total in ["TotalDays", "TotalHours", "TotalMinutes", "TotalSeconds", "TotalMilliseconds"] {
        builder = builder.property(total, DOUBLE);
    }
    for factory in ["FromDays", "FromHours", "FromMinutes", "FromSeconds", "FromMilliseconds"] {
        builder = builder.static_method(factory, &[DOUBLE], TIME_SPAN);
    }
    builder
        .property("Ticks", INT64)
        .method("Add", &[TIME_SPAN], TIME_SPAN)
        .method("Subtract", &[TIME_SPAN], TIME_SPAN)
        .method("Negate", &[], TIME_SPAN)
        .method("Duration", &[], TIME_SPAN)
        .method("ToString", &[STRING], STRING)
        .static_method("FromTicks", &[INT64], TIME_SPAN)
        .static_method("Parse", &[STRING], TIME_SPAN)
        .build()
}

fn guid() -> TypeInfo {
    TypeBuilder::structure("System", "Guid")
        .constructor(&[STRING])
        .static_field("Empty", GUID)
        .method("ToByteArray", &[], "System.Byte[]")
        .method("ToString", &[STRING], STRING)
        .method("CompareTo", &[GUID], INT32)
        .static_method("NewGuid", &[], GUID)
        .static_method("Parse", &[STRING], GUID)
        .build()
}

fn math() -> TypeInfo {
    let mut builder = TypeBuilder::static_class("System", "Math")
        .static_field("PI", DOUBLE)
        .static_field("E", DOUBLE);

    for ty in [SBYTE, INT16, INT32, INT64, SINGLE, DOUBLE, DECIMAL] {
        builder = builder
            .static_method("Abs", &[ty], ty)
            .static_method("Sign", &[ty], INT32);
    }
    for ty in [BYTE, SBYTE, INT16, UINT16, INT32, UINT32, INT64, UINT64, SINGLE, DOUBLE, DECIMAL] {
        builder = builder
            .static_method("Max", &[ty, ty], ty)
            .static_method("Min", &[ty, ty], ty)
            .static_method("Clamp", &[ty, ty, ty], ty);
    }
    for unary in [
        "Sqrt", "Exp", "Log", "Log10", "Sin", "Cos", "Tan", "Asin", "Acos", "Atan", "Sinh", "Cosh",
        "Tanh",
    ] {
        builder = builder.static_method(unary, &[DOUBLE], DOUBLE);
    }
    for rounding in ["Round", "Floor", "Ceiling", "Truncate"] {
        builder = builder
            .static_method(rounding, &[DOUBLE], DOUBLE)
            .static_method(rounding, &[DECIMAL], DECIMAL);
    }
    builder
        .static_method("Round", &[DOUBLE, INT32], DOUBLE)
        .static_method("Round", &[DECIMAL, INT32], DECIMAL)
        .static_method("Pow", &[DOUBLE, DOUBLE], DOUBLE)
        .static_method("Log", &[DOUBLE, DOUBLE], DOUBLE)
        .static_method("Atan2", &[DOUBLE, DOUBLE], DOUBLE)
        .build()
}

fn convert() -> TypeInfo {
    let mut builder = TypeBuilder::static_class("System", "Convert");
    let targets = [
        ("ToBoolean", BOOLEAN),
        ("ToChar", CHAR),
        ("ToSByte", SBYTE),
        ("ToByte", BYTE),
        ("ToInt16", INT16),
        ("ToUInt16", UINT16),
        ("ToInt32", INT32),
        ("ToUInt32", UINT32),
        ("ToInt64", INT64),
        ("ToUInt64", UINT64),
        ("ToSingle", SINGLE),
        ("ToDouble", DOUBLE),
        ("ToDecimal", DECIMAL),
        ("ToDateTime", DATE_TIME),
        ("ToString", STRING),
    ];
    for (method, returns) in targets {
        builder = builder
            .static_method(method, &[OBJECT], returns)
            .static_method(method, &[STRING], returns);
    }
    builder
        .static_method("ToBase64String", &["System.Byte[]"], STRING)
        .static_method("FromBase64String", &[STRING], "System.Byte[]")
        .static_method("ChangeType", &[OBJECT, OBJECT], OBJECT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_well_known_type_is_built() {
        for name in WELL_KNOWN_TYPES {
            assert!(
                builtin_types().iter().any(|t| t.full_name() == name),
                "missing {}",
                name
            );
        }
        assert!(builtin_types().iter().any(|t| t.full_name() == DAY_OF_WEEK));
    }

    #[test]
    fn test_builtins_are_shared() {
        let first = builtin_types();
        let second = builtin_types();
        assert!(Arc::ptr_eq(&first[0], &second[0]));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(alias_full_name("int"), Some(INT32));
        assert_eq!(alias_full_name("string"), Some(STRING));
        assert_eq!(alias_full_name("Int"), None);
        assert_eq!(alias_full_name("DateTime"), None);
    }

    #[test]
    fn test_numeric_surface() {
        let int32 = builtin_types()
            .iter()
            .find(|t| t.full_name() == INT32)
            .unwrap();
        assert!(int32.is_value_type());
        assert!(int32.fields.iter().any(|f| f.name == "MaxValue" && f.is_static));
        assert!(int32.methods.iter().any(|m| m.name == "Parse" && m.return_type == INT32));

        let math = builtin_types().iter().find(|t| t.full_name() == MATH).unwrap();
        assert!(math.methods.iter().all(|m| m.is_static));
        assert!(is_numeric(DECIMAL));
        assert!(!is_numeric(STRING));
    }
}
