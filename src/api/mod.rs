//! API-side test utilities: payload templating and a thin JSON client.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::{Map, Value};

use crate::reporting;

/// Read a JSON object file into a map, for use as a templating context or
/// request body.
pub fn load_json_map(path: impl AsRef<Path>) -> Result<Map<String, Value>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("{} does not contain a JSON object", path.display()),
    }
}

/// Substitute `${key}` placeholders in `template` from `values`.
///
/// String values are inserted verbatim, other JSON values in their JSON
/// form. Placeholders with no matching key are left untouched so a missing
/// field is visible in the produced payload instead of silently vanishing.
pub fn render_template(template: &str, values: &Map<String, Value>) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_.\-]+)\}").unwrap());

    placeholder
        .replace_all(template, |caps: &regex::Captures<'_>| {
            match values.get(&caps[1]) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Minimal JSON client for API steps.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET `path` and decode the JSON body. Non-2xx statuses are errors.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        reporting::info(format!("GET {url}"));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?;
        response
            .json()
            .await
            .with_context(|| format!("GET {url} returned a non-JSON body"))
    }

    /// POST a JSON `body` to `path` and decode the JSON response. Non-2xx
    /// statuses are errors.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        reporting::info(format!("POST {url}"));
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {url} returned an error status"))?;
        response
            .json()
            .await
            .with_context(|| format!("POST {url} returned a non-JSON body"))
    }
}
