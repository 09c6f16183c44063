//! Logging service implementation

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with configuration awareness
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    /// Create new logging service with specified logger and minimum level
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Create service with configuration-aware settings
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let logger: Arc<dyn Logger> = if config::use_structured_logging() {
            Arc::new(StructuredLogger::new(min_level))
        } else if config::use_console_logging() {
            Arc::new(ConsoleLogger::new(min_level))
        } else {
            Arc::new(NullLogger)
        };

        Self::new(logger, min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Check if level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Log an event
    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Create the service described by the runtime logging preferences
pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

/// Discards every event
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Simple console logger
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.level {
                LogLevel::Error => eprintln!("{}", event.format()),
                _ => println!("{}", event.format()),
            }
        }
    }
}

/// Structured logger for JSON output and better tooling integration
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            let line = event.format_json().unwrap_or_else(|_| event.format());
            match event.level {
                LogLevel::Error => eprintln!("{}", line),
                _ => println!("{}", line),
            }
        }
    }
}

/// Forwards events into the `log` facade so a host application's logger
/// (for example `env_logger`) receives them
#[cfg(feature = "logging")]
pub struct FacadeLogger;

#[cfg(feature = "logging")]
impl Logger for FacadeLogger {
    fn log(&self, event: &LogEvent) {
        let level = match event.level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        };
        log::log!(target: "caret_analyzer", level, "{}", event.format());
    }
}

/// Memory logger for testing
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn events(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events().clone()
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.events()
            .iter()
            .filter(|e| e.is_error())
            .cloned()
            .collect()
    }

    pub fn get_events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.events()
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.events()
            .iter()
            .any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.events()
            .iter()
            .any(|e| e.is_info() && e.code == code)
    }

    /// Number of stored events at `level`
    pub fn count_at(&self, level: LogLevel) -> usize {
        self.events().iter().filter(|e| e.level == level).count()
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events();

        let max_events = config::get_error_buffer_size();
        if events.len() >= max_events {
            let remove_count = events.len() - max_events + 1;
            events.drain(0..remove_count);
        }

        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Info);

        service.log_error(codes::syntax::EXPRESSION_EXPECTED, "Expression expected");
        service.log_success(codes::success::ANALYSIS_COMPLETED, "done");
        service.log_debug("dropped");

        assert_eq!(memory.event_count(), 2);
        assert_eq!(memory.count_at(LogLevel::Error), 1);
        assert_eq!(memory.count_at(LogLevel::Debug), 0);
        assert!(memory.has_error_with_code(codes::syntax::EXPRESSION_EXPECTED));
        assert!(memory.has_success_with_code(codes::success::ANALYSIS_COMPLETED));
    }

    #[test]
    fn test_set_min_level() {
        let memory = Arc::new(MemoryLogger::new());
        let mut service = LoggingService::new(memory.clone(), LogLevel::Error);
        service.log_warning("hidden");
        assert_eq!(memory.event_count(), 0);

        service.set_min_level(LogLevel::Debug);
        service.log_warning("shown");
        service.log_debug("shown too");
        assert_eq!(memory.event_count(), 2);
        assert_eq!(service.min_level(), LogLevel::Debug);
    }

    #[test]
    fn test_memory_logger_queries() {
        let memory = MemoryLogger::new();
        memory.log(&LogEvent::error(codes::compilation::UNKNOWN_MEMBER, "a"));
        memory.log(&LogEvent::error(codes::compilation::UNKNOWN_MEMBER, "b"));
        memory.log(&LogEvent::warning("c"));

        assert_eq!(memory.get_errors().len(), 2);
        assert_eq!(
            memory
                .get_events_with_code(codes::compilation::UNKNOWN_MEMBER)
                .len(),
            2
        );

        memory.clear();
        assert_eq!(memory.event_count(), 0);
    }
}
