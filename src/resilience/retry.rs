//! Fixed-delay retry executor.

use std::future::{Future, Ready};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::attempt::AttemptLoop;
use crate::config::RetryConfig;
use crate::errors::{BoxError, OperationHandle, RetryResult};
use crate::observability::{Logger, TracingLogger};

const EXECUTE: &str = "execute";
const EXECUTE_WITH_EXIT: &str = "execute_with_exit";
const EXECUTE_BLOCKING: &str = "execute_blocking";
const EXECUTE_BLOCKING_WITH_EXIT: &str = "execute_blocking_with_exit";

type NoExit = fn() -> bool;
type NoAsyncExit = fn(CancellationToken) -> Ready<bool>;

/// How an async execution ended without exhausting its retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// The operation succeeded (and the exit condition, if any, was met).
    Succeeded {
        /// Value returned by the final invocation.
        value: T,
        /// Number of invocations made.
        attempts: u64,
    },
    /// Cancellation was observed at the top of an attempt; the operation was
    /// not invoked again.
    Cancelled {
        /// Number of invocations made before cancellation was observed.
        attempts: u64,
    },
}

impl<T> Completion<T> {
    /// Returns true if the execution was cut short by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Completion::Cancelled { .. })
    }

    /// Returns the number of invocations made.
    pub fn attempts(&self) -> u64 {
        match self {
            Completion::Succeeded { attempts, .. } | Completion::Cancelled { attempts } => *attempts,
        }
    }

    /// Returns the value of the successful invocation, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Completion::Succeeded { value, .. } => Some(value),
            Completion::Cancelled { .. } => None,
        }
    }
}

/// Re-invokes a fallible operation up to a fixed number of times, waiting a
/// constant delay between attempts.
///
/// The executor holds only its immutable configuration and logger, so one
/// instance can be shared across any number of concurrent executions.
#[derive(Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    logger: Arc<dyn Logger>,
}

impl RetryExecutor {
    /// Creates an executor that logs through `tracing`.
    pub fn new(config: RetryConfig) -> Self {
        Self::with_logger(config, Arc::new(TracingLogger))
    }

    /// Creates an executor with a custom logging sink.
    pub fn with_logger(config: RetryConfig, logger: Arc<dyn Logger>) -> Self {
        Self { config, logger }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Returns the maximum number of re-attempts after the first.
    pub fn retry_limit(&self) -> u32 {
        self.config.retry_limit
    }

    /// Returns the wait between attempts.
    pub fn retry_delay(&self) -> std::time::Duration {
        self.config.retry_delay
    }

    /// Runs `operation` on the calling thread until it succeeds.
    ///
    /// Each failed attempt blocks the thread for the retry delay.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`](crate::RetryError::Exhausted) after
    /// `retry_limit + 1` failed invocations.
    pub fn execute_blocking<F, T, E>(&self, operation: F) -> RetryResult<T>
    where
        F: FnMut() -> Result<T, E>,
        E: Into<BoxError>,
    {
        let handle = OperationHandle::of::<F>(EXECUTE_BLOCKING);
        self.run_blocking(handle, operation, None::<NoExit>)
    }

    /// Runs `operation` on the calling thread until it succeeds and
    /// `exit_condition` returns true.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`](crate::RetryError::Exhausted) once
    /// `retry_limit + 1` invocations have each failed or left the exit
    /// condition unsatisfied.
    pub fn execute_blocking_with_exit<F, T, E, C>(
        &self,
        operation: F,
        exit_condition: C,
    ) -> RetryResult<T>
    where
        F: FnMut() -> Result<T, E>,
        E: Into<BoxError>,
        C: FnMut() -> bool,
    {
        let handle = OperationHandle::of::<F>(EXECUTE_BLOCKING_WITH_EXIT);
        self.run_blocking(handle, operation, Some(exit_condition))
    }

    /// Runs the async `operation` until it succeeds.
    ///
    /// `cancel` is checked at the top of every attempt; once it is cancelled
    /// the operation is not invoked again and [`Completion::Cancelled`] is
    /// returned. An invocation already in flight is never aborted.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`](crate::RetryError::Exhausted) after
    /// `retry_limit + 1` failed invocations.
    #[instrument(
        skip_all,
        fields(retry_limit = self.config.retry_limit, retry_delay_ms = self.config.delay_millis())
    )]
    pub async fn execute<F, Fut, T, E>(
        &self,
        operation: F,
        cancel: &CancellationToken,
    ) -> RetryResult<Completion<T>>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        let handle = OperationHandle::of::<F>(EXECUTE);
        self.run(handle, operation, None::<NoAsyncExit>, cancel).await
    }

    /// Runs the async `operation` until it succeeds and `exit_condition`
    /// resolves to true.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`](crate::RetryError::Exhausted) once
    /// `retry_limit + 1` invocations have each failed or left the exit
    /// condition unsatisfied.
    #[instrument(
        skip_all,
        fields(retry_limit = self.config.retry_limit, retry_delay_ms = self.config.delay_millis())
    )]
    pub async fn execute_with_exit<F, Fut, T, E, C, CFut>(
        &self,
        operation: F,
        exit_condition: C,
        cancel: &CancellationToken,
    ) -> RetryResult<Completion<T>>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
        C: FnMut(CancellationToken) -> CFut,
        CFut: Future<Output = bool>,
    {
        let handle = OperationHandle::of::<F>(EXECUTE_WITH_EXIT);
        self.run(handle, operation, Some(exit_condition), cancel).await
    }

    fn run_blocking<F, T, E, C>(
        &self,
        handle: OperationHandle,
        mut operation: F,
        mut exit_condition: Option<C>,
    ) -> RetryResult<T>
    where
        F: FnMut() -> Result<T, E>,
        E: Into<BoxError>,
        C: FnMut() -> bool,
    {
        let mut attempts = AttemptLoop::new(&self.config, self.logger.as_ref(), handle);

        loop {
            attempts.begin()?;

            let delay = match operation() {
                Err(err) => attempts.failed(err.into()),
                Ok(value) => match exit_condition.as_mut() {
                    None => {
                        attempts.succeeded();
                        return Ok(value);
                    }
                    Some(exit) => match attempts.exit_condition(exit()) {
                        None => return Ok(value),
                        Some(delay) => delay,
                    },
                },
            };

            std::thread::sleep(delay);
        }
    }

    async fn run<F, Fut, T, E, C, CFut>(
        &self,
        handle: OperationHandle,
        mut operation: F,
        mut exit_condition: Option<C>,
        cancel: &CancellationToken,
    ) -> RetryResult<Completion<T>>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
        C: FnMut(CancellationToken) -> CFut,
        CFut: Future<Output = bool>,
    {
        let mut attempts = AttemptLoop::new(&self.config, self.logger.as_ref(), handle);

        loop {
            attempts.begin()?;

            if cancel.is_cancelled() {
                attempts.cancelled();
                return Ok(Completion::Cancelled {
                    attempts: attempts.attempt_number(),
                });
            }

            let delay = match operation(cancel.clone()).await {
                Err(err) => attempts.failed(err.into()),
                Ok(value) => {
                    let invocations = attempts.attempt_number() + 1;
                    let next = match exit_condition.as_mut() {
                        None => {
                            attempts.succeeded();
                            None
                        }
                        Some(exit) => {
                            let met = exit(cancel.clone()).await;
                            attempts.exit_condition(met)
                        }
                    };
                    match next {
                        None => {
                            return Ok(Completion::Succeeded {
                                value,
                                attempts: invocations,
                            })
                        }
                        Some(delay) => delay,
                    }
                }
            };

            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("config", &self.config)
            .finish()
    }
}
