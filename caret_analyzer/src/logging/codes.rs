//! Consolidated error codes and classification system
//!
//! Single source of truth for all codes, their metadata, and classification
//! functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Configuration and type model loading error codes
pub mod config {
    use super::Code;

    pub const CONFIG_READ_FAILED: Code = Code::new("E005");
    pub const CONFIG_PARSE_FAILED: Code = Code::new("E006");
    pub const MODEL_READ_FAILED: Code = Code::new("E007");
    pub const MODEL_PARSE_FAILED: Code = Code::new("E008");
    pub const MODEL_INVALID: Code = Code::new("E009");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const INVALID_ESCAPE: Code = Code::new("E025");
    pub const INVALID_STRING_LITERAL: Code = Code::new("E026");
}

/// Grammar error codes raised by the fragment locator and the compiler
pub mod syntax {
    use super::Code;

    pub const EXPRESSION_EXPECTED: Code = Code::new("E040");
    pub const TOKEN_EXPECTED: Code = Code::new("E041");
    pub const INVALID_OUT_KEYWORD: Code = Code::new("E042");
    pub const MAX_DEPTH_EXCEEDED: Code = Code::new("E043");
    pub const UNSUPPORTED_CONSTRUCT: Code = Code::new("E044");
    pub const SOURCE_TOO_LARGE: Code = Code::new("E045");
    pub const INVALID_CARET: Code = Code::new("E046");
}

/// Type checking error codes raised by the expression compiler
pub mod compilation {
    use super::Code;

    pub const UNKNOWN_IDENTIFIER: Code = Code::new("E060");
    pub const UNKNOWN_MEMBER: Code = Code::new("E061");
    pub const NO_APPLICABLE_METHOD: Code = Code::new("E062");
    pub const NO_APPLICABLE_INDEXER: Code = Code::new("E063");
    pub const INCOMPATIBLE_OPERANDS: Code = Code::new("E064");
    pub const TYPE_ACCESS_INCOMPLETE: Code = Code::new("E065");
    pub const UNRESOLVED_TYPE: Code = Code::new("E066");
    pub const TYPE_MISMATCH: Code = Code::new("E067");
}

/// Fragment resolution error codes
pub mod resolution {
    use super::Code;

    pub const FRAGMENT_UNRESOLVED: Code = Code::new("E080");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const CONFIG_LOADED: Code = Code::new("I002");
    pub const TYPE_MODEL_LOADED: Code = Code::new("I003");
    pub const FRAGMENT_LOCATED: Code = Code::new("I010");
    pub const EXPRESSION_COMPILED: Code = Code::new("I011");
    pub const LEGACY_KEYWORDS_REWRITTEN: Code = Code::new("I012");
    pub const CLASS_IDENTIFIER_MATCHED: Code = Code::new("I013");
    pub const ANALYSIS_COMPLETED: Code = Code::new("I014");
    pub const COMPLETION_LIST_BUILT: Code = Code::new("I015");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn register(
    registry: &mut HashMap<&'static str, ErrorMetadata>,
    code: Code,
    category: &'static str,
    severity: Severity,
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
) {
    registry.insert(
        code.as_str(),
        ErrorMetadata::new(
            code.as_str(),
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        ),
    );
}

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        register(
            &mut registry,
            system::INTERNAL_ERROR,
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal system error",
            "File a bug report with the expression that triggered it",
        );
        register(
            &mut registry,
            system::INITIALIZATION_FAILURE,
            "System",
            Severity::Critical,
            false,
            true,
            "System initialization failure",
            "Check logging configuration and environment variables",
        );

        // Configuration errors
        register(
            &mut registry,
            config::CONFIG_READ_FAILED,
            "Configuration",
            Severity::Medium,
            true,
            false,
            "Configuration file could not be read",
            "Check the configuration path and permissions",
        );
        register(
            &mut registry,
            config::CONFIG_PARSE_FAILED,
            "Configuration",
            Severity::Medium,
            true,
            false,
            "Configuration file is not valid TOML for the expected schema",
            "Fix the reported key or remove it to use the default",
        );
        register(
            &mut registry,
            config::MODEL_READ_FAILED,
            "Configuration",
            Severity::High,
            false,
            true,
            "Type model file could not be read",
            "Check the model path and permissions",
        );
        register(
            &mut registry,
            config::MODEL_PARSE_FAILED,
            "Configuration",
            Severity::High,
            false,
            true,
            "Type model file is not valid TOML or JSON",
            "Fix the model file syntax",
        );
        register(
            &mut registry,
            config::MODEL_INVALID,
            "Configuration",
            Severity::High,
            false,
            true,
            "Type model declares duplicate or unknown types",
            "Declare each type once and name an existing context type",
        );

        // Lexical errors
        register(
            &mut registry,
            lexical::INVALID_CHARACTER,
            "Lexical",
            Severity::Low,
            true,
            false,
            "Character not valid in an expression",
            "Remove or quote the character",
        );
        register(
            &mut registry,
            lexical::UNTERMINATED_STRING,
            "Lexical",
            Severity::Low,
            true,
            false,
            "String literal is missing its closing quote",
            "Close the string literal",
        );
        register(
            &mut registry,
            lexical::INVALID_NUMBER,
            "Lexical",
            Severity::Low,
            true,
            false,
            "Numeric literal is malformed or out of range",
            "Check digits, exponent and suffix",
        );
        register(
            &mut registry,
            lexical::IDENTIFIER_TOO_LONG,
            "Lexical",
            Severity::Medium,
            true,
            false,
            "Identifier exceeds the maximum length",
            "Shorten the identifier",
        );
        register(
            &mut registry,
            lexical::STRING_TOO_LARGE,
            "Lexical",
            Severity::Medium,
            true,
            false,
            "String literal exceeds the maximum size",
            "Split the literal",
        );
        register(
            &mut registry,
            lexical::INVALID_ESCAPE,
            "Lexical",
            Severity::Low,
            true,
            false,
            "String literal contains an invalid escape sequence",
            "Use a recognized escape or double the backslash",
        );
        register(
            &mut registry,
            lexical::INVALID_STRING_LITERAL,
            "Lexical",
            Severity::Low,
            true,
            false,
            "String or character literal is malformed",
            "Check quoting and literal length",
        );

        // Syntax errors
        register(
            &mut registry,
            syntax::EXPRESSION_EXPECTED,
            "Syntax",
            Severity::Low,
            true,
            false,
            "An expression was expected",
            "Complete the expression",
        );
        register(
            &mut registry,
            syntax::TOKEN_EXPECTED,
            "Syntax",
            Severity::Low,
            true,
            false,
            "A specific token was expected",
            "Insert the expected token",
        );
        register(
            &mut registry,
            syntax::INVALID_OUT_KEYWORD,
            "Syntax",
            Severity::Low,
            true,
            false,
            "Out arguments must use the discard variable",
            "Write 'out _'",
        );
        register(
            &mut registry,
            syntax::MAX_DEPTH_EXCEEDED,
            "Syntax",
            Severity::High,
            true,
            false,
            "Expression nesting exceeds the maximum depth",
            "Simplify the expression",
        );
        register(
            &mut registry,
            syntax::UNSUPPORTED_CONSTRUCT,
            "Syntax",
            Severity::Medium,
            false,
            false,
            "Expression uses a construct that cannot be analyzed",
            "Use np(...) instead of the null propagating operator",
        );
        register(
            &mut registry,
            syntax::SOURCE_TOO_LARGE,
            "Syntax",
            Severity::High,
            false,
            false,
            "Expression text exceeds the maximum analyzable size",
            "Analyze a smaller expression",
        );
        register(
            &mut registry,
            syntax::INVALID_CARET,
            "Syntax",
            Severity::Medium,
            false,
            false,
            "Caret offset lies outside the text or inside a character",
            "Pass a caret offset on a character boundary",
        );

        // Compilation errors
        register(
            &mut registry,
            compilation::UNKNOWN_IDENTIFIER,
            "Compilation",
            Severity::Low,
            true,
            false,
            "Identifier is not a keyword, type, parameter or member",
            "Check the identifier spelling",
        );
        register(
            &mut registry,
            compilation::UNKNOWN_MEMBER,
            "Compilation",
            Severity::Low,
            true,
            false,
            "Type has no such property or field",
            "Check the member name against the type",
        );
        register(
            &mut registry,
            compilation::NO_APPLICABLE_METHOD,
            "Compilation",
            Severity::Low,
            true,
            false,
            "No overload accepts the given arguments",
            "Check the argument count and types",
        );
        register(
            &mut registry,
            compilation::NO_APPLICABLE_INDEXER,
            "Compilation",
            Severity::Low,
            true,
            false,
            "Type cannot be indexed with the given arguments",
            "Check the index arguments",
        );
        register(
            &mut registry,
            compilation::INCOMPATIBLE_OPERANDS,
            "Compilation",
            Severity::Low,
            true,
            false,
            "Operator cannot be applied to the operand types",
            "Convert the operands to compatible types",
        );
        register(
            &mut registry,
            compilation::TYPE_ACCESS_INCOMPLETE,
            "Compilation",
            Severity::Low,
            true,
            false,
            "Type name used without a member access or conversion",
            "Follow the type name with '.' or '('",
        );
        register(
            &mut registry,
            compilation::UNRESOLVED_TYPE,
            "Compilation",
            Severity::Medium,
            true,
            false,
            "Type name is not registered",
            "Register the type in the type model",
        );
        register(
            &mut registry,
            compilation::TYPE_MISMATCH,
            "Compilation",
            Severity::Low,
            true,
            false,
            "Expression has the wrong type for its position",
            "Convert the expression to the expected type",
        );

        // Resolution errors
        register(
            &mut registry,
            resolution::FRAGMENT_UNRESOLVED,
            "Resolution",
            Severity::Low,
            true,
            false,
            "Fragment neither compiles nor names a well-known type",
            "Keep typing; completion is unavailable for this fragment",
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_has_metadata() {
        let codes = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            config::CONFIG_READ_FAILED,
            config::CONFIG_PARSE_FAILED,
            config::MODEL_READ_FAILED,
            config::MODEL_PARSE_FAILED,
            config::MODEL_INVALID,
            lexical::INVALID_CHARACTER,
            lexical::UNTERMINATED_STRING,
            lexical::INVALID_NUMBER,
            lexical::IDENTIFIER_TOO_LONG,
            lexical::STRING_TOO_LARGE,
            lexical::INVALID_ESCAPE,
            lexical::INVALID_STRING_LITERAL,
            syntax::EXPRESSION_EXPECTED,
            syntax::TOKEN_EXPECTED,
            syntax::INVALID_OUT_KEYWORD,
            syntax::MAX_DEPTH_EXCEEDED,
            syntax::UNSUPPORTED_CONSTRUCT,
            syntax::SOURCE_TOO_LARGE,
            syntax::INVALID_CARET,
            compilation::UNKNOWN_IDENTIFIER,
            compilation::UNKNOWN_MEMBER,
            compilation::NO_APPLICABLE_METHOD,
            compilation::NO_APPLICABLE_INDEXER,
            compilation::INCOMPATIBLE_OPERANDS,
            compilation::TYPE_ACCESS_INCOMPLETE,
            compilation::UNRESOLVED_TYPE,
            compilation::TYPE_MISMATCH,
            resolution::FRAGMENT_UNRESOLVED,
        ];

        for code in codes {
            let metadata = get_error_metadata(code.as_str());
            assert!(metadata.is_some(), "missing metadata for {}", code);
            assert_eq!(metadata.unwrap().code, code.as_str());
        }
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
        assert!(is_recoverable("E999"));
        assert!(!requires_halt("E999"));
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_severity(system::INTERNAL_ERROR.as_str()), Severity::Critical);
        assert!(requires_halt(config::MODEL_INVALID.as_str()));
        assert!(!is_recoverable(syntax::UNSUPPORTED_CONSTRUCT.as_str()));
        assert_eq!(get_category(compilation::UNKNOWN_MEMBER.as_str()), "Compilation");
    }
}
