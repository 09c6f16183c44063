//! Configuration for the caret analyzer
//!
//! Security limits live in [`constants::compile_time`] and cannot change at
//! runtime. User preferences live in [`runtime`] and are read from the
//! environment or from a TOML file.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{
    CompletionPreferences, ConfigError, LoggingPreferences, ParsingPreferences, RuntimeConfig,
    StringLiteralParsing,
};
