use std::time::Duration;

use thirtyfour::error::WebDriverError;

use crate::config::BrowserKind;

/// Failures surfaced by the driver and page layers.
///
/// Configuration problems never show up here: malformed values are recovered
/// with defaults at resolution time. Teardown and highlight failures are
/// absorbed at their call sites and never reach callers either.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote session could not be created (no matching browser binary,
    /// WebDriver server unreachable, ...). Fatal; never retried here.
    #[error("failed to start {browser} session: {source}")]
    Session {
        browser: BrowserKind,
        #[source]
        source: WebDriverError,
    },

    /// A bounded wait hit its deadline. Distinct from "element not found":
    /// not-found during polling just means not-ready-yet.
    #[error("timed out after {waited:?} waiting for {target} to become {condition}")]
    WaitTimeout {
        target: String,
        condition: &'static str,
        waited: Duration,
    },

    /// A page action failed after its precondition held, including the
    /// target going stale between lookup and action.
    #[error("failed to {action} {target}: {source}")]
    Interaction {
        action: &'static str,
        target: String,
        #[source]
        source: WebDriverError,
    },

    /// Protocol-level failure outside a named action (navigation, script
    /// execution, window management).
    #[error(transparent)]
    Protocol(#[from] WebDriverError),
}

impl Error {
    /// True when the underlying cause is a missing or stale element
    /// reference.
    pub fn is_gone(&self) -> bool {
        match self {
            Error::Interaction { source, .. } | Error::Protocol(source) => is_gone(source),
            _ => false,
        }
    }
}

/// Missing-or-stale test on the raw protocol error.
pub(crate) fn is_gone(err: &WebDriverError) -> bool {
    matches!(
        err,
        WebDriverError::NoSuchElement(_) | WebDriverError::StaleElementReference(_)
    )
}
