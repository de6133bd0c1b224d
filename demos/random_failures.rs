//! Runs an operation that fails at random, once through the async path and
//! once through the blocking path.
//!
//! ```sh
//! RETRY_LIMIT=5 RETRY_DELAY_MS=200 cargo run --example random_failures
//! ```

use rand::Rng;
use retry_executor::observability::{LogLevel, LoggingConfig};
use retry_executor::{CancellationToken, RetryConfig, RetryExecutor};

#[derive(Debug, thiserror::Error)]
#[error("random transient failure")]
struct RandomTransient;

fn flaky(label: &str) -> Result<(), RandomTransient> {
    tracing::info!("Executing {label}");
    if rand::thread_rng().gen_range(1..3) % 2 == 1 {
        tracing::info!("Simulating random transient failure");
        return Err(RandomTransient);
    }
    tracing::info!("{label} complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    LoggingConfig::new().with_level(LogLevel::Debug).init()?;

    let executor = RetryExecutor::new(RetryConfig::from_env()?);
    println!("=== Retry Executor Demo ({:?}) ===\n", executor.config());

    let completion = executor
        .execute(
            |_cancel| async {
                let result = flaky("async operation");
                tokio::task::yield_now().await;
                result
            },
            &CancellationToken::new(),
        )
        .await;
    match completion {
        Ok(completion) => println!("Async finished after {} attempt(s)\n", completion.attempts()),
        Err(err) => println!("Async gave up: {err}\n"),
    }

    let blocking =
        tokio::task::spawn_blocking(move || executor.execute_blocking(|| flaky("blocking operation")))
            .await?;
    match blocking {
        Ok(()) => println!("Blocking operation finished"),
        Err(err) => println!("Blocking operation gave up: {err}"),
    }

    Ok(())
}
