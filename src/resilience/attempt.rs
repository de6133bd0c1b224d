//! Attempt bookkeeping shared by the blocking and async execution paths.
//!
//! Both paths drive the same [`AttemptLoop`]: it owns the attempt counter,
//! the last captured failure and all logging. The drivers only decide how to
//! invoke the operation and how to wait.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use crate::config::RetryConfig;
use crate::errors::{AttemptOutcome, BoxError, OperationHandle, RetryExhaustedError};
use crate::observability::{LogLevel, Logger, RetryEvent};

pub(crate) struct AttemptLoop<'a> {
    config: &'a RetryConfig,
    logger: &'a dyn Logger,
    handle: OperationHandle,
    attempt_number: u64,
    last_failure: Option<BoxError>,
    last_outcome: AttemptOutcome,
}

impl<'a> AttemptLoop<'a> {
    pub(crate) fn new(
        config: &'a RetryConfig,
        logger: &'a dyn Logger,
        handle: OperationHandle,
    ) -> Self {
        let this = Self {
            config,
            logger,
            handle,
            attempt_number: 0,
            last_failure: None,
            last_outcome: AttemptOutcome::Failed,
        };
        this.emit(LogLevel::Info, "Execution started", None);
        this
    }

    /// Current attempt counter, starting at zero.
    pub(crate) fn attempt_number(&self) -> u64 {
        self.attempt_number
    }

    /// Opens the next attempt, or gives up once the counter exceeds the limit.
    pub(crate) fn begin(&mut self) -> Result<(), RetryExhaustedError> {
        if self.attempt_number > u64::from(self.config.retry_limit) {
            let err = RetryExhaustedError::new(
                self.attempt_number,
                self.handle.clone(),
                self.last_failure.take(),
                self.last_outcome,
            );
            self.emit(LogLevel::Error, "Unable to execute operation", Some(&err));
            return Err(err);
        }

        self.emit(LogLevel::Info, "Executing attempt", None);
        Ok(())
    }

    /// Records an operation failure and returns the delay before the next attempt.
    pub(crate) fn failed(&mut self, err: BoxError) -> Duration {
        self.attempt_number += 1;
        let message = format!(
            "Execution failed. Retry number {}. Retry again in {} milliseconds",
            self.attempt_number,
            self.config.delay_millis()
        );
        let source: &(dyn std::error::Error + 'static) = &*err;
        self.emit(LogLevel::Error, &message, Some(source));

        self.last_failure = Some(err);
        self.last_outcome = AttemptOutcome::Failed;
        self.config.retry_delay
    }

    /// Records a success when no exit condition is in play.
    pub(crate) fn succeeded(&self) {
        self.emit(LogLevel::Info, "Execution succeeded", None);
    }

    /// Records the exit condition verdict.
    ///
    /// Returns `None` when execution is complete, otherwise the delay before
    /// the next attempt. An unmet condition leaves the last failure untouched.
    pub(crate) fn exit_condition(&mut self, met: bool) -> Option<Duration> {
        if met {
            let message = format!("Exit condition met at retry number {}", self.attempt_number);
            self.emit(LogLevel::Info, &message, None);
            return None;
        }

        self.attempt_number += 1;
        let message = format!(
            "Exit condition not met. Retry number {}. Retry again in {} milliseconds",
            self.attempt_number,
            self.config.delay_millis()
        );
        self.emit(LogLevel::Info, &message, None);

        self.last_outcome = AttemptOutcome::ExitConditionNotMet;
        Some(self.config.retry_delay)
    }

    /// Records that the attempt was skipped because cancellation was requested.
    pub(crate) fn cancelled(&self) {
        self.emit(LogLevel::Info, "Cancellation requested, skipping attempt", None);
    }

    // A panicking sink must not change the retry outcome.
    fn emit(
        &self,
        level: LogLevel,
        message: &str,
        error: Option<&(dyn std::error::Error + 'static)>,
    ) {
        let mut event = RetryEvent::new(self.handle.name(), self.attempt_number, message);
        if let Some(error) = error {
            event = event.with_error(error);
        }
        let logger = self.logger;
        let _ = catch_unwind(AssertUnwindSafe(|| logger.log(level, &event)));
    }
}
