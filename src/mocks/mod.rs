//! Mock implementations for testing.
//!
//! Provides a recording logger, a logger that always panics, and a
//! scripted operation that fails a fixed number of times.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::observability::{LogLevel, Logger, RetryEvent};

/// A recorded logging event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Level the event was logged at.
    pub level: LogLevel,
    /// Component name.
    pub component: &'static str,
    /// Executor operation.
    pub operation: &'static str,
    /// Attempt counter.
    pub attempt_number: u64,
    /// Event message.
    pub message: String,
    /// Rendered attached error.
    pub error: Option<String>,
}

/// Logger that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingLogger {
    /// Creates an empty recording logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns events recorded at `level`.
    pub fn events_at(&self, level: LogLevel) -> Vec<RecordedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    /// Returns the recorded messages in order.
    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, event: &RetryEvent<'_>) {
        let recorded = RecordedEvent {
            level,
            component: event.component,
            operation: event.operation,
            attempt_number: event.attempt_number,
            message: event.message.to_string(),
            error: event.error.map(ToString::to_string),
        };
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);
    }
}

/// Logger that panics on every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingLogger;

impl Logger for PanickingLogger {
    fn log(&self, _level: LogLevel, event: &RetryEvent<'_>) {
        panic!("logging sink unavailable: {}", event.message);
    }
}

/// Error produced by [`FailingOperation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MockError {
    message: String,
}

impl MockError {
    /// Creates a mock error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Operation that fails its first `failures` invocations, then succeeds
/// returning the 1-based invocation number.
#[derive(Debug)]
pub struct FailingOperation {
    failures: u32,
    invocations: AtomicU32,
}

impl FailingOperation {
    /// Creates an operation that fails `failures` times before succeeding.
    pub fn failing_times(failures: u32) -> Self {
        Self {
            failures,
            invocations: AtomicU32::new(0),
        }
    }

    /// Creates an operation that never succeeds.
    pub fn always() -> Self {
        Self::failing_times(u32::MAX)
    }

    /// Invokes the operation.
    pub fn call(&self) -> Result<u32, MockError> {
        let n = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            Err(MockError::new(format!("transient failure #{n}")))
        } else {
            Ok(n)
        }
    }

    /// Returns how many times the operation has been invoked.
    pub fn invocations(&self) -> u32 {
        self.invocations.load(Ordering::SeqCst)
    }
}
