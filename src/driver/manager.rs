//! Per-worker session lifecycle.
//!
//! Each test worker owns at most one live session at a time. The registry
//! maps worker identity to its session explicitly; there is no ambient
//! thread-local state, so ownership stays visible and testable.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::config::Settings;
use crate::error::Error;
use crate::reporting;

use super::session::{ManagedSession, RemoteFactory, SessionFactory};

/// Identity of one test worker — the ownership boundary for sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(u64);

static NEXT_WORKER: AtomicU64 = AtomicU64::new(1);

impl WorkerId {
    /// A fresh process-unique id, for task-based workers.
    pub fn next() -> Self {
        WorkerId(NEXT_WORKER.fetch_add(1, Ordering::Relaxed))
    }

    /// Identity derived from the current OS thread, for thread-per-test
    /// runners.
    pub fn from_current_thread() -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        WorkerId(hasher.finish())
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Owns every worker's session: lazy creation on [`acquire`], graceful
/// teardown on [`release`].
///
/// Distinct workers never contend on the same registry key; the lock only
/// guards the map's structure.
///
/// [`acquire`]: DriverManager::acquire
/// [`release`]: DriverManager::release
pub struct DriverManager<F: SessionFactory> {
    factory: F,
    settings: Settings,
    registry: Mutex<HashMap<WorkerId, F::Session>>,
}

/// Manager over real thirtyfour sessions.
pub type WebDriverManager = DriverManager<RemoteFactory>;

impl WebDriverManager {
    /// Manager speaking to the WebDriver endpoint in `settings`.
    pub fn remote(settings: Settings) -> Self {
        Self::new(RemoteFactory, settings)
    }
}

impl<F: SessionFactory> DriverManager<F> {
    pub fn new(factory: F, settings: Settings) -> Self {
        Self {
            factory,
            settings,
            registry: Mutex::new(HashMap::new()),
        }
    }

    /// The settings snapshot every session is configured from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The calling worker's session, creating, configuring and registering
    /// one if none exists. Repeated calls return the same session until
    /// `release`. Creation failures propagate; nothing is registered then.
    pub async fn acquire(&self, worker: WorkerId) -> Result<F::Session, Error> {
        if let Some(session) = self.lock().get(&worker).cloned() {
            return Ok(session);
        }

        let session = self.factory.create(&self.settings).await?;
        reporting::info(format!(
            "session {} registered for {worker}",
            session.id()
        ));
        self.lock().insert(worker, session.clone());
        Ok(session)
    }

    /// Gracefully quit the worker's session, if any. The registry entry is
    /// removed unconditionally; shutdown failures are logged and swallowed
    /// so teardown never takes a test down with it.
    pub async fn release(&self, worker: WorkerId) {
        let Some(session) = self.lock().remove(&worker) else {
            return;
        };
        let id = session.id().to_string();
        reporting::info(format!("quitting session {id} for {worker}"));
        if let Err(err) = session.quit().await {
            reporting::warn(format!("error quitting session {id}: {err}"));
        }
    }

    /// Number of currently registered sessions.
    pub fn live_sessions(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<WorkerId, F::Session>> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<F: SessionFactory> fmt::Debug for DriverManager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverManager")
            .field("live_sessions", &self.live_sessions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowserKind;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use thirtyfour::error::WebDriverError;

    #[derive(Debug, Clone)]
    struct FakeSession {
        id: String,
        serial: usize,
        quits: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl ManagedSession for FakeSession {
        fn id(&self) -> &str {
            &self.id
        }

        async fn quit(self) -> Result<(), Error> {
            self.quits
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(self.serial);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct FakeFactory {
        created: AtomicUsize,
        quits: Arc<Mutex<Vec<usize>>>,
        fail: bool,
    }

    #[async_trait]
    impl SessionFactory for FakeFactory {
        type Session = FakeSession;

        async fn create(&self, settings: &Settings) -> Result<FakeSession, Error> {
            if self.fail {
                return Err(Error::Session {
                    browser: settings.browser,
                    source: WebDriverError::FatalError("no browser binary".to_string()),
                });
            }
            let serial = self.created.fetch_add(1, Ordering::SeqCst);
            Ok(FakeSession {
                id: format!("fake-{serial}"),
                serial,
                quits: Arc::clone(&self.quits),
            })
        }
    }

    fn manager() -> DriverManager<FakeFactory> {
        DriverManager::new(FakeFactory::default(), Settings::default())
    }

    #[tokio::test]
    async fn concurrent_workers_get_distinct_sessions() {
        let manager = Arc::new(manager());
        let a = WorkerId::next();
        let b = WorkerId::next();

        let (left, right) = tokio::join!(
            {
                let m = Arc::clone(&manager);
                async move { m.acquire(a).await.unwrap() }
            },
            {
                let m = Arc::clone(&manager);
                async move { m.acquire(b).await.unwrap() }
            }
        );

        assert_ne!(left.serial, right.serial);
        assert_eq!(manager.live_sessions(), 2);
    }

    #[tokio::test]
    async fn acquire_is_idempotent_until_release() {
        let manager = manager();
        let worker = WorkerId::next();

        let first = manager.acquire(worker).await.unwrap();
        let second = manager.acquire(worker).await.unwrap();
        assert_eq!(first.serial, second.serial);
        assert_eq!(manager.live_sessions(), 1);
    }

    #[tokio::test]
    async fn release_then_acquire_creates_a_fresh_session() {
        let manager = manager();
        let worker = WorkerId::next();

        let first = manager.acquire(worker).await.unwrap();
        manager.release(worker).await;
        assert_eq!(manager.live_sessions(), 0);

        let second = manager.acquire(worker).await.unwrap();
        assert_ne!(first.serial, second.serial);

        let quits = manager.factory.quits.lock().unwrap();
        assert_eq!(&*quits, &[first.serial]);
    }

    #[tokio::test]
    async fn release_without_a_session_is_a_noop() {
        let manager = manager();
        manager.release(WorkerId::next()).await;
        assert_eq!(manager.live_sessions(), 0);
        assert!(manager.factory.quits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn creation_failure_propagates_and_registers_nothing() {
        let manager = DriverManager::new(
            FakeFactory {
                fail: true,
                ..FakeFactory::default()
            },
            Settings::default(),
        );
        let worker = WorkerId::next();

        let err = manager.acquire(worker).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Session {
                browser: BrowserKind::Chrome,
                ..
            }
        ));
        assert_eq!(manager.live_sessions(), 0);
    }

    #[test]
    fn worker_ids_are_unique_and_stable_per_thread() {
        assert_ne!(WorkerId::next(), WorkerId::next());
        assert_eq!(
            WorkerId::from_current_thread(),
            WorkerId::from_current_thread()
        );
    }
}
