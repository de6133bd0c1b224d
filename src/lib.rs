//! Retry Executor
//!
//! Re-invokes an operation that may fail transiently, up to a configured
//! number of re-attempts, waiting a fixed delay between attempts. An optional
//! exit condition can keep retrying after a successful invocation until the
//! caller is satisfied.
//!
//! # Features
//!
//! - **Blocking and async**: `execute_blocking*` sleep the calling thread,
//!   `execute*` await a Tokio timer
//! - **Exit conditions**: stop only when a caller-supplied predicate agrees
//! - **Cancellation**: async executions check a `CancellationToken` before
//!   every attempt
//! - **Observability**: every attempt boundary is reported to a pluggable
//!   [`Logger`](observability::Logger), `tracing` by default
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use retry_executor::{CancellationToken, RetryConfig, RetryExecutor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = RetryExecutor::new(RetryConfig::new().retry_limit(3).retry_delay_ms(500));
//!
//!     let completion = executor
//!         .execute(
//!             |_cancel| async { std::fs::read_to_string("/etc/hostname") },
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!
//!     println!("{:?}", completion.into_value());
//!     Ok(())
//! }
//! ```
//!
//! # Blocking Example
//!
//! ```rust
//! use retry_executor::{RetryConfig, RetryExecutor};
//!
//! let executor = RetryExecutor::new(RetryConfig::new().retry_limit(2).retry_delay_ms(0));
//! let mut calls = 0;
//!
//! let value = executor
//!     .execute_blocking(|| {
//!         calls += 1;
//!         if calls < 2 { Err("not yet") } else { Ok(calls) }
//!     })
//!     .unwrap();
//!
//! assert_eq!(value, 2);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod observability;
pub mod resilience;

// Re-exports for convenience
pub use config::{RetryConfig, DEFAULT_RETRY_DELAY, DEFAULT_RETRY_LIMIT};
pub use errors::{
    AttemptOutcome, BoxError, OperationHandle, RetryError, RetryExhaustedError, RetryResult,
};
pub use observability::{ConsoleLogger, LogLevel, Logger, NoopLogger, RetryEvent, TracingLogger};
pub use resilience::{CancellationToken, Completion, RetryExecutor};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
