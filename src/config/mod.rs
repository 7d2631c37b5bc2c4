//! Properties-style configuration with explicit precedence:
//! environment override > properties file > hardcoded fallback.
//!
//! Settings are resolved once into an immutable [`Settings`] snapshot at
//! worker/session start and passed to the components that need them. Nothing
//! caches at process scope, so re-resolving later is always allowed.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::reporting;

/// Defaults compiled into the crate, used when no properties file is found.
const BUNDLED_PROPERTIES: &str = include_str!("harness.properties");

/// Conventional properties file name, looked up in the working directory.
pub const PROPERTIES_FILE: &str = "harness.properties";

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_IMPLICIT_WAIT_SECS: u64 = 10;
const DEFAULT_PAGE_LOAD_SECS: u64 = 30;
const DEFAULT_EXPLICIT_WAIT_SECS: u64 = 15;

/// Raw key/value store backing [`Settings::resolve`].
#[derive(Debug, Clone, Default)]
pub struct PropertySource {
    values: HashMap<String, String>,
}

impl PropertySource {
    /// Load properties from `path`, falling back to the bundled defaults
    /// when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(_) => {
                reporting::info(format!(
                    "{} not found, using bundled defaults",
                    path.display()
                ));
                Self::parse(BUNDLED_PROPERTIES)
            }
        }
    }

    /// Parse `key=value` lines. `#` and `!` start comments; blank lines and
    /// lines without `=` are skipped. Keys and values are trimmed.
    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { values }
    }

    /// Raw file value for `key`, without the environment override applied.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key` with a same-named, non-empty environment variable
    /// taking precedence over the file.
    pub fn resolve(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => self.get(key).map(str::to_string),
        }
    }
}

/// Browser kinds the session factory knows how to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
    Safari,
    ChromeHeadless,
}

impl BrowserKind {
    /// Parse a configured kind. Absent or unrecognized values fall back to
    /// Chrome with a logged notice; this is policy, not an error.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("chrome") => BrowserKind::Chrome,
            Some("firefox") => BrowserKind::Firefox,
            Some("edge") => BrowserKind::Edge,
            Some("safari") => BrowserKind::Safari,
            Some("chrome-headless") => BrowserKind::ChromeHeadless,
            other => {
                reporting::info(format!(
                    "browser kind {} not recognized, defaulting to chrome",
                    other.map(|v| format!("'{v}'")).unwrap_or_else(|| "not set".into())
                ));
                BrowserKind::Chrome
            }
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "edge",
            BrowserKind::Safari => "safari",
            BrowserKind::ChromeHeadless => "chrome-headless",
        };
        f.write_str(name)
    }
}

/// Immutable snapshot of everything the driver and page layers read.
#[derive(Debug, Clone)]
pub struct Settings {
    pub browser: BrowserKind,
    pub webdriver_url: String,
    pub base_url: Option<String>,
    pub implicit_wait: Duration,
    pub page_load_timeout: Duration,
    pub explicit_wait: Duration,
    pub highlight_elements: bool,
    pub retry_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chrome,
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            base_url: None,
            implicit_wait: Duration::from_secs(DEFAULT_IMPLICIT_WAIT_SECS),
            page_load_timeout: Duration::from_secs(DEFAULT_PAGE_LOAD_SECS),
            explicit_wait: Duration::from_secs(DEFAULT_EXPLICIT_WAIT_SECS),
            highlight_elements: true,
            retry_count: 0,
        }
    }
}

impl Settings {
    /// Resolve a snapshot from `source`, applying environment overrides and
    /// recovering malformed values with their documented defaults.
    pub fn resolve(source: &PropertySource) -> Self {
        Self {
            browser: BrowserKind::parse(source.resolve("browser").as_deref()),
            webdriver_url: source
                .resolve("webdriverUrl")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
            base_url: source.resolve("baseUrl").filter(|v| !v.is_empty()),
            implicit_wait: seconds(source, "implicitWaitTimeout", DEFAULT_IMPLICIT_WAIT_SECS),
            page_load_timeout: seconds(source, "pageLoadTimeout", DEFAULT_PAGE_LOAD_SECS),
            explicit_wait: seconds(source, "explicitWaitTimeout", DEFAULT_EXPLICIT_WAIT_SECS),
            highlight_elements: flag(source, "highlightElements", true),
            retry_count: count(source, "retryCount", 0),
        }
    }
}

fn seconds(source: &PropertySource, key: &str, default: u64) -> Duration {
    let secs = match source.resolve(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                reporting::warn(format!(
                    "invalid {key} value '{raw}', using default: {default}"
                ));
                default
            }
        },
    };
    Duration::from_secs(secs)
}

fn flag(source: &PropertySource, key: &str, default: bool) -> bool {
    match source.resolve(key) {
        None => default,
        Some(raw) if raw.trim().is_empty() => default,
        Some(raw) => raw.trim().eq_ignore_ascii_case("true"),
    }
}

fn count(source: &PropertySource, key: &str, default: u32) -> u32 {
    match source.resolve(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(value) => value,
            Err(_) => {
                reporting::warn(format!(
                    "invalid {key} value '{raw}', using default: {default}"
                ));
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Settings::resolve reads the process environment; tests that touch it
    // (or that would be perturbed by it) serialize on this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn parses_properties_lines_and_comments() {
        let source = PropertySource::parse(
            "# comment\n! also a comment\n\nbrowser = firefox\nimplicitWaitTimeout=5\nnot a pair\n",
        );
        assert_eq!(source.get("browser"), Some("firefox"));
        assert_eq!(source.get("implicitWaitTimeout"), Some("5"));
        assert_eq!(source.get("not a pair"), None);
    }

    #[test]
    fn bundled_defaults_cover_every_recognized_key() {
        let source = PropertySource::parse(BUNDLED_PROPERTIES);
        for key in [
            "browser",
            "webdriverUrl",
            "implicitWaitTimeout",
            "pageLoadTimeout",
            "explicitWaitTimeout",
            "highlightElements",
            "retryCount",
        ] {
            assert!(source.get(key).is_some(), "missing bundled key {key}");
        }
    }

    #[test]
    fn malformed_timeout_falls_back_to_default() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let source = PropertySource::parse("implicitWaitTimeout=abc\npageLoadTimeout=12");
        let settings = Settings::resolve(&source);
        assert_eq!(settings.implicit_wait, Duration::from_secs(10));
        assert_eq!(settings.page_load_timeout, Duration::from_secs(12));
    }

    #[test]
    fn unknown_browser_falls_back_to_chrome() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let source = PropertySource::parse("browser=netscape");
        assert_eq!(Settings::resolve(&source).browser, BrowserKind::Chrome);
    }

    #[test]
    fn absent_browser_falls_back_to_chrome() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let source = PropertySource::parse("");
        assert_eq!(Settings::resolve(&source).browser, BrowserKind::Chrome);
    }

    #[test]
    fn recognized_browser_kinds_parse() {
        assert_eq!(BrowserKind::parse(Some("Firefox")), BrowserKind::Firefox);
        assert_eq!(BrowserKind::parse(Some("edge")), BrowserKind::Edge);
        assert_eq!(BrowserKind::parse(Some("safari")), BrowserKind::Safari);
        assert_eq!(
            BrowserKind::parse(Some("chrome-headless")),
            BrowserKind::ChromeHeadless
        );
    }

    #[test]
    fn environment_overrides_file_value() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let source = PropertySource::parse("explicitWaitTimeout=15");
        std::env::set_var("explicitWaitTimeout", "3");
        let settings = Settings::resolve(&source);
        std::env::remove_var("explicitWaitTimeout");
        assert_eq!(settings.explicit_wait, Duration::from_secs(3));
    }

    #[test]
    fn empty_base_url_means_unset() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let source = PropertySource::parse("baseUrl=");
        assert_eq!(Settings::resolve(&source).base_url, None);
    }

    #[test]
    fn highlight_flag_parses_like_a_boolean() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let on = PropertySource::parse("highlightElements=TRUE");
        assert!(Settings::resolve(&on).highlight_elements);
        let off = PropertySource::parse("highlightElements=false");
        assert!(!Settings::resolve(&off).highlight_elements);
        let odd = PropertySource::parse("highlightElements=banana");
        assert!(!Settings::resolve(&odd).highlight_elements);
        let unset = PropertySource::parse("");
        assert!(Settings::resolve(&unset).highlight_elements);
    }
}
