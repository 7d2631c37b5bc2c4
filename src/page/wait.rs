//! Bounded polling waits.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::Error;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll until `poll` yields a value or `timeout` elapses.
///
/// `Ok(None)` from the poll means not-ready-yet (including "element not
/// found", which is a normal state while waiting); errors abort the wait
/// immediately. On deadline this returns [`Error::WaitTimeout`], which is a
/// different failure than not-found so callers can tell a slow page from a
/// wrong locator.
pub(crate) async fn wait_until<T, F, Fut>(
    target: &str,
    condition: &'static str,
    timeout: Duration,
    mut poll: F,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, Error>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = poll().await? {
            return Ok(value);
        }
        if started.elapsed() >= timeout {
            return Err(Error::WaitTimeout {
                target: target.to_string(),
                condition,
                waited: started.elapsed(),
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_value_once_the_predicate_holds() {
        let mut calls = 0;
        let result = wait_until("thing", "ready", Duration::from_secs(5), || {
            calls += 1;
            let ready = calls >= 3;
            async move { Ok(ready.then_some(calls)) }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn deadline_raises_a_timeout_distinct_from_not_found() {
        let result: Result<(), _> =
            wait_until("id=ghost", "visible", Duration::from_millis(50), || async {
                Ok(None)
            })
            .await;
        match result.unwrap_err() {
            Error::WaitTimeout { target, condition, .. } => {
                assert_eq!(target, "id=ghost");
                assert_eq!(condition, "visible");
            }
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[tokio::test]
    async fn poll_errors_abort_immediately() {
        let result: Result<(), _> =
            wait_until("thing", "ready", Duration::from_secs(5), || async {
                Err(Error::Protocol(
                    thirtyfour::error::WebDriverError::FatalError("session died".into()),
                ))
            })
            .await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[tokio::test]
    async fn polls_at_least_once_even_with_a_zero_deadline() {
        let result = wait_until("thing", "ready", Duration::ZERO, || async {
            Ok(Some(42))
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }
}
