//! Session creation and teardown against a remote WebDriver server.
//!
//! The factory seam exists so the registry logic in [`manager`] can be
//! exercised without a live browser; production code goes through
//! [`RemoteFactory`].
//!
//! [`manager`]: super::manager

use async_trait::async_trait;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use thirtyfour::{ChromeCapabilities, TimeoutConfiguration};
use uuid::Uuid;

use crate::config::{BrowserKind, Settings};
use crate::error::Error;
use crate::reporting;

/// One live remote-browser session owned by exactly one worker.
///
/// Cloning is cheap and shares the same underlying session; `quit` ends the
/// session for every clone.
#[async_trait]
pub trait ManagedSession: Clone + Send + Sync + 'static {
    /// Short identifier used in log lines.
    fn id(&self) -> &str;

    /// Gracefully shut down the remote session.
    async fn quit(self) -> Result<(), Error>;
}

/// Creates configured sessions on demand.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: ManagedSession;

    /// Start and configure a new session per `settings`. Failures propagate
    /// to the caller; there is no retry at this layer.
    async fn create(&self, settings: &Settings) -> Result<Self::Session, Error>;
}

/// A thirtyfour-backed browser session.
#[derive(Debug, Clone)]
pub struct WebSession {
    id: String,
    driver: WebDriver,
}

impl WebSession {
    /// The underlying WebDriver handle.
    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }
}

#[async_trait]
impl ManagedSession for WebSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn quit(self) -> Result<(), Error> {
        self.driver.quit().await.map_err(Error::from)
    }
}

/// Starts sessions against the configured WebDriver endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteFactory;

#[async_trait]
impl SessionFactory for RemoteFactory {
    type Session = WebSession;

    async fn create(&self, settings: &Settings) -> Result<WebSession, Error> {
        reporting::info(format!("initializing {} browser", settings.browser));

        let driver = start(settings).await.map_err(|source| Error::Session {
            browser: settings.browser,
            source,
        })?;

        if let Err(source) = configure(&driver, settings).await {
            // The session exists but is unusable; don't leak it.
            let _ = driver.clone().quit().await;
            return Err(Error::Session {
                browser: settings.browser,
                source,
            });
        }

        let id = short_id();
        reporting::info(format!(
            "session {id} ready ({} via {})",
            settings.browser, settings.webdriver_url
        ));
        Ok(WebSession { id, driver })
    }
}

async fn start(settings: &Settings) -> Result<WebDriver, WebDriverError> {
    let url = settings.webdriver_url.as_str();
    match settings.browser {
        BrowserKind::Chrome => WebDriver::new(url, chrome_caps(false)?).await,
        BrowserKind::ChromeHeadless => WebDriver::new(url, chrome_caps(true)?).await,
        BrowserKind::Firefox => WebDriver::new(url, DesiredCapabilities::firefox()).await,
        BrowserKind::Edge => WebDriver::new(url, DesiredCapabilities::edge()).await,
        BrowserKind::Safari => WebDriver::new(url, DesiredCapabilities::safari()).await,
    }
}

fn chrome_caps(headless: bool) -> Result<ChromeCapabilities, WebDriverError> {
    let mut caps = DesiredCapabilities::chrome();
    caps.add_arg("--remote-allow-origins=*")?;
    if headless {
        // Fixed window size and no GPU/sandbox keep headless runs
        // reproducible in constrained environments.
        caps.add_arg("--headless=new")?;
        caps.add_arg("--window-size=1920,1080")?;
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
    }
    Ok(caps)
}

/// Common configuration applied to every new session before first use:
/// maximized window, implicit and page-load waits, clean cookie jar.
async fn configure(driver: &WebDriver, settings: &Settings) -> Result<(), WebDriverError> {
    driver.maximize_window().await?;
    let timeouts = TimeoutConfiguration::new(
        None,
        Some(settings.page_load_timeout),
        Some(settings.implicit_wait),
    );
    driver.update_timeouts(timeouts).await?;
    driver.delete_all_cookies().await?;
    reporting::info(format!(
        "configured session with implicitWait={}s, pageLoadTimeout={}s",
        settings.implicit_wait.as_secs(),
        settings.page_load_timeout.as_secs()
    ));
    Ok(())
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
