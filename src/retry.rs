//! Re-run helper for the surrounding test runner.
//!
//! The core layers never retry on their own; a failed wait or action
//! surfaces immediately. Runners that want another shot at a flaky step
//! wrap it here with the configured `retryCount` budget.

use std::fmt::Display;
use std::future::Future;

use crate::reporting;

/// Run `op`, re-running it up to `max_retries` more times on failure.
/// The last error is returned once the budget is exhausted.
pub async fn with_retries<T, E, F, Fut>(max_retries: u32, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries => {
                attempt += 1;
                reporting::warn(format!(
                    "attempt {attempt}/{} failed ({err}), retrying",
                    max_retries + 1
                ));
            }
            Err(err) => return Err(err),
        }
    }
}
