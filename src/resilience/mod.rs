//! Resilience layer: the fixed-delay retry executor.
//!
//! Four execution shapes are offered: blocking or async, each with or
//! without an exit condition. All of them drive one attempt state machine,
//! so attempt counting, exhaustion and logging behave identically; the
//! blocking path sleeps the thread between attempts while the async path
//! awaits a timer and honours a [`CancellationToken`].

mod attempt;
mod retry;

pub use retry::{Completion, RetryExecutor};
pub use tokio_util::sync::CancellationToken;
