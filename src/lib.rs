//! Browser UI and API test-automation harness.
//!
//! The core is two pieces: a per-worker driver lifecycle manager
//! ([`driver`]) and a wait/highlight/log interaction layer over a live
//! session ([`page`]). Everything else — configuration, the log sink, API
//! payload helpers, test data — is the surrounding kit a UI test suite
//! needs around those two.

pub mod api;
pub mod config;
pub mod data;
pub mod driver;
pub mod error;
pub mod page;
pub mod reporting;
pub mod retry;

// Re-export common items
pub use config::{BrowserKind, PropertySource, Settings};
pub use driver::{
    DriverManager, ManagedSession, RemoteFactory, SessionFactory, WebDriverManager, WebSession,
    WorkerId,
};
pub use error::Error;
pub use page::{Locator, Page, Probe};
