//! Shared scenario state.

use std::sync::Arc;

use webharness::data::DataStore;
use webharness::{Page, PropertySource, Settings, WebDriverManager, WorkerId};

/// One scenario's state: the driver manager, this scenario's worker
/// identity, and the resolved settings snapshot.
#[derive(Debug, cucumber::World)]
pub struct HarnessWorld {
    pub manager: Arc<WebDriverManager>,
    pub worker: WorkerId,
    pub settings: Settings,
    pub source: PropertySource,
    pub store: DataStore,
}

impl Default for HarnessWorld {
    fn default() -> Self {
        let source = PropertySource::load(webharness::config::PROPERTIES_FILE);
        let settings = Settings::resolve(&source);
        Self {
            manager: Arc::new(WebDriverManager::remote(settings.clone())),
            worker: WorkerId::next(),
            settings,
            source,
            store: DataStore::new(),
        }
    }
}

impl HarnessWorld {
    /// The interaction layer over this worker's session, creating the
    /// session on first use. Session creation failure fails the scenario.
    pub async fn page(&self) -> Page {
        let session = self
            .manager
            .acquire(self.worker)
            .await
            .expect("could not start a browser session");
        Page::new(session, &self.settings)
    }

    /// A configured property with its environment override applied. Missing
    /// values fail the scenario with the key named.
    pub fn required_property(&self, key: &str) -> String {
        self.source
            .resolve(key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| panic!("property '{key}' is not configured"))
    }
}
