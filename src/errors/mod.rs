//! Error types for the retry executor.
//!
//! Intermediate failures never leave the executor. The only error a caller
//! has to handle is [`RetryError::Exhausted`], raised once every permitted
//! attempt has either failed or left the exit condition unsatisfied.

use std::fmt;
use thiserror::Error;

/// Boxed error type used to carry operation failures across attempts.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for retry executor operations.
pub type RetryResult<T> = Result<T, RetryError>;

/// Error type returned by the retry executor.
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every permitted attempt was used without success.
    #[error(transparent)]
    Exhausted(#[from] RetryExhaustedError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },
}

impl RetryError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        RetryError::Configuration {
            message: message.into(),
        }
    }

    /// Returns the exhaustion details if this is an exhaustion error.
    pub fn as_exhausted(&self) -> Option<&RetryExhaustedError> {
        match self {
            RetryError::Exhausted(err) => Some(err),
            RetryError::Configuration { .. } => None,
        }
    }

    /// Returns true if retries were exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted(_))
    }
}

/// How the last counted attempt ended before the executor gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The operation itself returned an error.
    Failed,
    /// The operation succeeded but the exit condition returned false.
    ExitConditionNotMet,
}

/// Opaque handle identifying the operation that was retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    name: &'static str,
    type_name: &'static str,
}

impl OperationHandle {
    /// Creates a handle for an operation of type `F` executed through `name`.
    pub fn of<F>(name: &'static str) -> Self {
        Self {
            name,
            type_name: std::any::type_name::<F>(),
        }
    }

    /// Returns the executor operation the call went through.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the Rust type name of the retried callable.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.type_name)
    }
}

/// Terminal error raised when the retry limit has been exceeded.
#[derive(Debug)]
pub struct RetryExhaustedError {
    message: String,
    operation: OperationHandle,
    cause: Option<BoxError>,
    last_outcome: AttemptOutcome,
    attempts: u64,
}

impl RetryExhaustedError {
    /// Builds the error from the post-increment attempt counter.
    ///
    /// `attempt_number` is at least one whenever exhaustion is reached, so the
    /// reported re-execution count equals the configured retry limit.
    pub(crate) fn new(
        attempt_number: u64,
        operation: OperationHandle,
        cause: Option<BoxError>,
        last_outcome: AttemptOutcome,
    ) -> Self {
        Self {
            message: format!(
                "Attempted to re-execute {} times",
                attempt_number.saturating_sub(1)
            ),
            operation,
            cause,
            last_outcome,
            attempts: attempt_number,
        }
    }

    /// Returns the exhaustion message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the handle of the operation that was retried.
    pub fn operation(&self) -> &OperationHandle {
        &self.operation
    }

    /// Returns the last error raised by the operation, if any.
    ///
    /// Exit-condition-driven retries do not replace this value, so it may be
    /// stale or absent when the exit condition was the reason for giving up.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Consumes the error and returns the last operation error, if any.
    pub fn into_cause(self) -> Option<BoxError> {
        self.cause
    }

    /// Returns how the final attempt ended.
    pub fn last_outcome(&self) -> AttemptOutcome {
        self.last_outcome
    }

    /// Returns true if no attempt ever raised an error, meaning the exit
    /// condition was never satisfied.
    pub fn exit_condition_never_met(&self) -> bool {
        self.cause.is_none() && self.last_outcome == AttemptOutcome::ExitConditionNotMet
    }

    /// Returns the total number of invocations that were made.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}

impl fmt::Display for RetryExhaustedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RetryExhaustedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn handle() -> OperationHandle {
        OperationHandle::of::<fn()>("execute_blocking")
    }

    #[test]
    fn test_exhausted_message_reports_retry_count() {
        let err = RetryExhaustedError::new(4, handle(), None, AttemptOutcome::Failed);
        assert_eq!(err.message(), "Attempted to re-execute 3 times");
        assert_eq!(err.to_string(), "Attempted to re-execute 3 times");
        assert_eq!(err.attempts(), 4);
    }

    #[test]
    fn test_exhausted_source_is_cause() {
        let cause: BoxError = "boom".into();
        let err = RetryExhaustedError::new(1, handle(), Some(cause), AttemptOutcome::Failed);

        assert_eq!(err.source().map(|e| e.to_string()), Some("boom".to_string()));
        assert!(!err.exit_condition_never_met());
    }

    #[test]
    fn test_exit_condition_never_met() {
        let err = RetryExhaustedError::new(
            2,
            handle(),
            None,
            AttemptOutcome::ExitConditionNotMet,
        );
        assert!(err.exit_condition_never_met());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_retry_error_transparent_display() {
        let err: RetryError =
            RetryExhaustedError::new(2, handle(), None, AttemptOutcome::Failed).into();
        assert!(err.is_exhausted());
        assert_eq!(err.to_string(), "Attempted to re-execute 1 times");
        assert_eq!(
            err.as_exhausted().map(|e| e.operation().name()),
            Some("execute_blocking")
        );
    }

    #[test]
    fn test_configuration_error() {
        let err = RetryError::configuration("RETRY_LIMIT is not a number");
        assert!(!err.is_exhausted());
        assert!(err.as_exhausted().is_none());
        assert_eq!(
            err.to_string(),
            "Configuration error: RETRY_LIMIT is not a number"
        );
    }
}
