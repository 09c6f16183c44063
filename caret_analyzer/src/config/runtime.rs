// RUNTIME PREFERENCES (User Experience)

use crate::logging::{codes, Code};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variables consulted by the preference defaults
pub mod env_vars {
    pub const STRING_LITERAL_PARSING: &str = "CARET_STRING_LITERAL_PARSING";
    pub const SUPPORT_DOT_IN_PROPERTY_NAMES: &str = "CARET_SUPPORT_DOT_IN_PROPERTY_NAMES";
    pub const RETRY_LEGACY_KEYWORDS: &str = "CARET_RETRY_LEGACY_KEYWORDS";
    pub const CASE_INSENSITIVE_MEMBERS: &str = "CARET_CASE_INSENSITIVE_MEMBERS";
    pub const COMPLETION_SEPARATOR: &str = "CARET_COMPLETION_SEPARATOR";
    pub const COMPLETION_TYPE_SEPARATOR: &str = "CARET_COMPLETION_TYPE_SEPARATOR";
    pub const COMPLETION_INCLUDE_INHERITED: &str = "CARET_COMPLETION_INCLUDE_INHERITED";
    pub const LOGGING_USE_STRUCTURED: &str = "CARET_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "CARET_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "CARET_LOGGING_MIN_LEVEL";
}

// ============================================================================
// PARSING
// ============================================================================

/// How string literal bodies are unescaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringLiteralParsing {
    /// Backslash escapes only
    #[default]
    Default,
    /// Backslash escapes, then `""` collapses to `"`
    EscapeDoubleQuoteByTwoDoubleQuotes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingPreferences {
    /// Quoting dialect applied to string literals
    pub string_literal_parsing: StringLiteralParsing,

    /// Whether `as` aliases inside `new(...)` may contain dots
    pub support_dot_in_property_names: bool,

    /// Whether a failed compilation is retried after rewriting legacy keywords
    pub retry_legacy_keywords: bool,

    /// Whether member names match regardless of case
    pub case_insensitive_members: bool,
}

impl Default for ParsingPreferences {
    fn default() -> Self {
        Self {
            string_literal_parsing: env::var(env_vars::STRING_LITERAL_PARSING)
                .ok()
                .and_then(|v| parse_string_literal_parsing(&v))
                .unwrap_or_default(),
            support_dot_in_property_names: env::var(env_vars::SUPPORT_DOT_IN_PROPERTY_NAMES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            retry_legacy_keywords: env::var(env_vars::RETRY_LEGACY_KEYWORDS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            case_insensitive_members: env::var(env_vars::CASE_INSENSITIVE_MEMBERS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

fn parse_string_literal_parsing(value: &str) -> Option<StringLiteralParsing> {
    match value.to_lowercase().as_str() {
        "default" | "backslash" => Some(StringLiteralParsing::Default),
        "escape_double_quote_by_two_double_quotes" | "double_quote" | "two_double_quotes" => {
            Some(StringLiteralParsing::EscapeDoubleQuoteByTwoDoubleQuotes)
        }
        _ => None,
    }
}

// ============================================================================
// COMPLETION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionPreferences {
    /// Separator placed between entries of the rendered list
    pub separator: char,

    /// Separator placed between an entry name and its icon index
    pub type_separator: char,

    /// Whether members declared on base types are listed
    pub include_inherited_members: bool,
}

impl Default for CompletionPreferences {
    fn default() -> Self {
        Self {
            separator: env::var(env_vars::COMPLETION_SEPARATOR)
                .ok()
                .and_then(|v| single_char(&v))
                .unwrap_or(';'),
            type_separator: env::var(env_vars::COMPLETION_TYPE_SEPARATOR)
                .ok()
                .and_then(|v| single_char(&v))
                .unwrap_or('?'),
            include_inherited_members: env::var(env_vars::COMPLETION_INCLUDE_INHERITED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

// ============================================================================
// LOGGING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

// ============================================================================
// AGGREGATE CONFIGURATION
// ============================================================================

/// Failures while loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn error_code(&self) -> Code {
        match self {
            ConfigError::Read { .. } => codes::config::CONFIG_READ_FAILED,
            ConfigError::Parse(_) => codes::config::CONFIG_PARSE_FAILED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub parsing: ParsingPreferences,
    pub completion: CompletionPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections and keys fall back to defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_parse_string_literal_parsing() {
        assert_eq!(
            parse_string_literal_parsing("two_double_quotes"),
            Some(StringLiteralParsing::EscapeDoubleQuoteByTwoDoubleQuotes)
        );
        assert_eq!(
            parse_string_literal_parsing("Default"),
            Some(StringLiteralParsing::Default)
        );
        assert_eq!(parse_string_literal_parsing("raw"), None);
    }

    #[test]
    fn test_single_char() {
        assert_eq!(single_char(";"), Some(';'));
        assert_eq!(single_char(""), None);
        assert_eq!(single_char("ab"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [parsing]
            string_literal_parsing = "escape_double_quote_by_two_double_quotes"
            support_dot_in_property_names = true

            [completion]
            separator = "|"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.parsing.string_literal_parsing,
            StringLiteralParsing::EscapeDoubleQuoteByTwoDoubleQuotes
        );
        assert!(config.parsing.support_dot_in_property_names);
        assert_eq!(config.completion.separator, '|');
        assert_eq!(
            config.completion.type_separator,
            CompletionPreferences::default().type_separator
        );
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = RuntimeConfig::from_toml_str("[parsing]\nretry_legacy_keywords = \"maybe\"");
        assert_matches!(result, Err(ConfigError::Parse(_)));
        assert_eq!(
            result.unwrap_err().error_code(),
            codes::config::CONFIG_PARSE_FAILED
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nmin_log_level = \"debug\"").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_missing_file() {
        let result = RuntimeConfig::load("/definitely/not/here/caret.toml");
        assert_matches!(result, Err(ConfigError::Read { .. }));
    }
}
