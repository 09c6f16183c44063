//! Global logging module for the caret analyzer
//!
//! Provides thread-safe, write-only global logging behind a clean macro
//! interface. Logging before initialization is a silent no-op, so library
//! callers that never initialize it pay only an atomic load per event.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
#[cfg(feature = "logging")]
pub use service::FacadeLogger;
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system from runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::syntax::EXPRESSION_EXPECTED,
        codes::compilation::UNKNOWN_IDENTIFIER,
    ] {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (CLI bridges and tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized")?;

    Ok(())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether debug events would reach a logger (used by `log_debug!`)
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn build_event(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    let max_length = config::get_max_log_message_length();
    if event.message.len() > max_length {
        let mut cut = max_length;
        while !event.message.is_char_boundary(cut) {
            cut -= 1;
        }
        event.message.truncate(cut);
    }

    for (key, value) in context.into_iter().take(config::get_max_context_entries()) {
        event = event.with_context(key, value);
    }
    event
}

fn dispatch(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = build_event(LogEvent::error(code, message), context);
    if let Some(s) = span {
        event = event.with_span(s);
    }
    dispatch(event);
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(build_event(LogEvent::success(code, message), context));
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(build_event(LogEvent::info(message), context));
}

/// Log warning with context (used by log_warning! macro)
pub fn log_warning_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(build_event(LogEvent::warning(message), context));
}

/// Log debug with context (used by log_debug! macro)
pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(build_event(LogEvent::debug(message), context));
}

// ============================================================================
// SAFE FALLBACK LOGGING
// ============================================================================

/// Safe error logging (falls back to stderr when uninitialized)
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

/// Get system diagnostics
pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));
    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_event_truncates_long_messages() {
        let long = "é".repeat(config::get_max_log_message_length());
        let event = build_event(LogEvent::info(&long), vec![("k", "v")]);

        assert!(event.message.len() <= config::get_max_log_message_length());
        assert!(event.message.chars().all(|c| c == 'é'));
        assert_eq!(event.context.get("k"), Some(&"v".to_string()));
    }

    #[test]
    fn test_build_event_caps_context() {
        let keys: Vec<String> = (0..config::get_max_context_entries() + 5)
            .map(|i| format!("key{}", i))
            .collect();
        let context: Vec<(&str, &str)> = keys.iter().map(|k| (k.as_str(), "v")).collect();

        let event = build_event(LogEvent::debug("many"), context);
        assert_eq!(event.context.len(), config::get_max_context_entries());
    }

    #[test]
    fn test_safe_logging() {
        safe_log_error(codes::system::INTERNAL_ERROR, "Test error");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Initialized:"));
    }
}
