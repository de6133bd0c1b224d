//! Logging collaborator used by the retry executor.
//!
//! The executor reports every attempt boundary as a [`RetryEvent`] through the
//! narrow [`Logger`] trait, so callers choose the sink without the executor
//! depending on any particular logging framework.

use std::collections::BTreeMap;
use std::fmt;

/// Component name attached to every event.
pub const COMPONENT: &str = "RetryExecutor";

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Trace level.
    Trace = 0,
    /// Debug level.
    Debug = 1,
    /// Info level.
    #[default]
    Info = 2,
    /// Warning level.
    Warn = 3,
    /// Error level.
    Error = 4,
    /// Off (no logging).
    Off = 5,
}

impl LogLevel {
    /// Returns the upper-case label for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Off => "OFF",
        }
    }
}

impl From<LogLevel> for tracing::level_filters::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Off => tracing::level_filters::LevelFilter::OFF,
        }
    }
}

/// A structured event emitted at an attempt boundary.
#[derive(Clone, Copy)]
pub struct RetryEvent<'a> {
    /// Always [`COMPONENT`].
    pub component: &'static str,
    /// Executor operation that emitted the event.
    pub operation: &'static str,
    /// Attempt counter at the time of the event.
    pub attempt_number: u64,
    /// Human-readable description.
    pub message: &'a str,
    /// Error attached to failure and exhaustion events.
    pub error: Option<&'a (dyn std::error::Error + 'static)>,
}

impl<'a> RetryEvent<'a> {
    /// Creates an event without an attached error.
    pub fn new(operation: &'static str, attempt_number: u64, message: &'a str) -> Self {
        Self {
            component: COMPONENT,
            operation,
            attempt_number,
            message,
            error: None,
        }
    }

    /// Attaches the causing error.
    pub fn with_error(mut self, error: &'a (dyn std::error::Error + 'static)) -> Self {
        self.error = Some(error);
        self
    }

    /// Renders the structured fields as an ordered map.
    pub fn context(&self) -> BTreeMap<&'static str, String> {
        let mut ctx = BTreeMap::new();
        ctx.insert("component", self.component.to_string());
        ctx.insert("operation", self.operation.to_string());
        ctx.insert("attempt_number", self.attempt_number.to_string());
        if let Some(err) = self.error {
            ctx.insert("error", err.to_string());
        }
        ctx
    }
}

impl fmt::Debug for RetryEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryEvent")
            .field("component", &self.component)
            .field("operation", &self.operation)
            .field("attempt_number", &self.attempt_number)
            .field("message", &self.message)
            .field("error", &self.error.map(ToString::to_string))
            .finish()
    }
}

/// Logger interface.
pub trait Logger: Send + Sync {
    /// Logs an event at the specified level.
    fn log(&self, level: LogLevel, event: &RetryEvent<'_>);

    /// Logs at info level.
    fn info(&self, event: &RetryEvent<'_>) {
        self.log(LogLevel::Info, event);
    }

    /// Logs at error level.
    fn error(&self, event: &RetryEvent<'_>) {
        self.log(LogLevel::Error, event);
    }
}

/// Logger that forwards events to the `tracing` ecosystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, event: &RetryEvent<'_>) {
        let error = event.error.map(ToString::to_string);
        let error = error.as_deref().unwrap_or("");
        macro_rules! emit {
            ($mac:ident) => {
                tracing::$mac!(
                    component = event.component,
                    operation = event.operation,
                    attempt_number = event.attempt_number,
                    error = error,
                    "{}",
                    event.message
                )
            };
        }
        match level {
            LogLevel::Trace => emit!(trace),
            LogLevel::Debug => emit!(debug),
            LogLevel::Info => emit!(info),
            LogLevel::Warn => emit!(warn),
            LogLevel::Error => emit!(error),
            LogLevel::Off => {}
        }
    }
}

/// Console logger writing one line per event.
pub struct ConsoleLogger {
    min_level: LogLevel,
    include_timestamps: bool,
}

impl ConsoleLogger {
    /// Creates a console logger that drops events below `min_level`.
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
            include_timestamps: true,
        }
    }

    /// Disables the timestamp prefix.
    pub fn without_timestamps(mut self) -> Self {
        self.include_timestamps = false;
        self
    }

    /// Formats an event as a single line, or `None` if it is filtered out.
    pub fn format(&self, level: LogLevel, event: &RetryEvent<'_>) -> Option<String> {
        if level == LogLevel::Off || level < self.min_level {
            return None;
        }

        let mut parts = Vec::with_capacity(4);

        if self.include_timestamps {
            parts.push(format!("[{}]", chrono::Utc::now().to_rfc3339()));
        }
        parts.push(format!("[{}]", level.as_str()));
        parts.push(event.message.to_string());

        if let Ok(json) = serde_json::to_string(&event.context()) {
            parts.push(json);
        }

        Some(parts.join(" "))
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, event: &RetryEvent<'_>) {
        let Some(line) = self.format(level, event) else {
            return;
        };

        match level {
            LogLevel::Error | LogLevel::Warn => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }
}

impl fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogger")
            .field("min_level", &self.min_level)
            .field("include_timestamps", &self.include_timestamps)
            .finish()
    }
}

/// No-op logger that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _event: &RetryEvent<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Off);
    }

    #[test]
    fn test_event_context() {
        let err = std::io::Error::other("disk on fire");
        let event = RetryEvent::new("execute", 2, "Execution failed").with_error(&err);
        let ctx = event.context();

        assert_eq!(ctx["component"], "RetryExecutor");
        assert_eq!(ctx["operation"], "execute");
        assert_eq!(ctx["attempt_number"], "2");
        assert_eq!(ctx["error"], "disk on fire");
    }

    #[test]
    fn test_console_logger_filters_below_min_level() {
        let logger = ConsoleLogger::new(LogLevel::Error).without_timestamps();
        let event = RetryEvent::new("execute", 0, "Attempt started");

        assert!(logger.format(LogLevel::Info, &event).is_none());
        assert!(logger.format(LogLevel::Off, &event).is_none());

        let line = logger.format(LogLevel::Error, &event).unwrap();
        assert!(line.starts_with("[ERROR] Attempt started "));
        assert!(line.contains(r#""attempt_number":"0""#));
    }

    #[test]
    fn test_console_logger_timestamps() {
        let logger = ConsoleLogger::default();
        let event = RetryEvent::new("execute_blocking", 1, "hello");
        let line = logger.format(LogLevel::Info, &event).unwrap();
        assert!(line.starts_with('['));
        assert!(line.contains("[INFO] hello"));
    }
}
