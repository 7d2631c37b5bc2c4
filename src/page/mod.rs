//! Page-level interaction layer.
//!
//! Every operation follows the same discipline: wait until the target is
//! provably ready, optionally highlight it for diagnosability, act, and log
//! a human-readable description of what was touched. Failures are logged
//! with the same context before being returned, so a failing test always
//! ends with a line identifying the element and operation involved.
//!
//! The only exceptions are the three readiness queries
//! ([`Page::is_displayed`] and friends), which report a missing or stale
//! target as `false` because they exist for conditional test logic, not
//! assertions.

pub mod locator;
pub mod wait;

pub use locator::Locator;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use thirtyfour::components::SelectElement;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;

use crate::config::Settings;
use crate::driver::WebSession;
use crate::error::{self, Error};
use crate::reporting;
use wait::wait_until;

const HIGHLIGHT_STYLE: &str = "border: 2px solid red; background-color: yellow;";
const HIGHLIGHT_HOLD: Duration = Duration::from_millis(100);
const SHORT_TEXT_LIMIT: usize = 30;

/// Outcome of a readiness probe. "Missing means false" is an explicit
/// branch here rather than a caught exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Holds,
    Fails,
    /// The element is missing or its reference went stale.
    Gone,
}

impl Probe {
    pub fn as_bool(self) -> bool {
        matches!(self, Probe::Holds)
    }
}

/// Interaction layer bound to one worker's session.
#[derive(Debug, Clone)]
pub struct Page {
    session: WebSession,
    explicit_wait: Duration,
    highlight: bool,
}

impl Page {
    /// Bind to `session` with the wait and highlight settings from the
    /// snapshot.
    pub fn new(session: WebSession, settings: &Settings) -> Self {
        Self {
            session,
            explicit_wait: settings.explicit_wait,
            highlight: settings.highlight_elements,
        }
    }

    fn driver(&self) -> &WebDriver {
        self.session.driver()
    }

    // --- navigation -----------------------------------------------------

    pub async fn navigate_to(&self, url: &str) -> Result<(), Error> {
        reporting::info(format!("navigating to {url}"));
        self.driver()
            .goto(url)
            .await
            .map_err(|source| action_err("navigate to", url.to_string(), source))
    }

    pub async fn refresh(&self) -> Result<(), Error> {
        reporting::info("refreshing page");
        Ok(self.driver().refresh().await?)
    }

    pub async fn go_back(&self) -> Result<(), Error> {
        reporting::info("navigating back");
        Ok(self.driver().back().await?)
    }

    pub async fn go_forward(&self) -> Result<(), Error> {
        reporting::info("navigating forward");
        Ok(self.driver().forward().await?)
    }

    pub async fn current_url(&self) -> Result<String, Error> {
        Ok(self.driver().current_url().await?.to_string())
    }

    pub async fn title(&self) -> Result<String, Error> {
        Ok(self.driver().title().await?)
    }

    /// Wait until `document.readyState` reports a complete load.
    pub async fn wait_for_page_load(&self) -> Result<(), Error> {
        let driver = self.driver();
        wait_until("page", "loaded", self.explicit_wait, move || async move {
            let ready: String = driver
                .execute("return document.readyState", vec![])
                .await?
                .convert()?;
            Ok((ready == "complete").then_some(()))
        })
        .await
    }

    // --- bounded waits --------------------------------------------------

    /// Wait (default timeout) until the element is visible.
    pub async fn wait_visible(&self, locator: &Locator) -> Result<WebElement, Error> {
        self.wait_visible_within(locator, self.explicit_wait).await
    }

    pub async fn wait_visible_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<WebElement, Error> {
        let driver = self.driver();
        let by = locator.by();
        wait_until(&locator.to_string(), "visible", timeout, move || {
            let by = by.clone();
            async move { poll_ready(driver, by, false).await }
        })
        .await
    }

    /// Wait (default timeout) until the element is visible and enabled.
    pub async fn wait_clickable(&self, locator: &Locator) -> Result<WebElement, Error> {
        self.wait_clickable_within(locator, self.explicit_wait).await
    }

    pub async fn wait_clickable_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<WebElement, Error> {
        let driver = self.driver();
        let by = locator.by();
        wait_until(&locator.to_string(), "clickable", timeout, move || {
            let by = by.clone();
            async move { poll_ready(driver, by, true).await }
        })
        .await
    }

    /// Wait (default timeout) until the element is absent or hidden.
    pub async fn wait_gone(&self, locator: &Locator) -> Result<(), Error> {
        self.wait_gone_within(locator, self.explicit_wait).await
    }

    pub async fn wait_gone_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), Error> {
        let driver = self.driver();
        let by = locator.by();
        wait_until(&locator.to_string(), "gone", timeout, move || {
            let by = by.clone();
            async move {
                match driver.find(by).await {
                    Ok(element) => match element.is_displayed().await {
                        Ok(true) => Ok(None),
                        Ok(false) => Ok(Some(())),
                        Err(e) if error::is_gone(&e) => Ok(Some(())),
                        Err(e) => Err(e.into()),
                    },
                    Err(e) if error::is_gone(&e) => Ok(Some(())),
                    Err(e) => Err(e.into()),
                }
            }
        })
        .await
    }

    // --- actions --------------------------------------------------------

    pub async fn click(&self, locator: &Locator) -> Result<(), Error> {
        self.click_within(locator, self.explicit_wait).await
    }

    pub async fn click_within(&self, locator: &Locator, timeout: Duration) -> Result<(), Error> {
        let element = self.ready_for("click", locator, true, timeout).await?;
        let prior = self.mark(&element).await;
        let outcome = element.click().await;
        self.unmark(&element, prior).await;
        let description = self.describe(&element, locator).await;
        match outcome {
            Ok(()) => {
                reporting::info(format!("clicked on element: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("click", description, source)),
        }
    }

    /// Click through script execution, for elements a synthetic pointer
    /// event cannot reach.
    pub async fn js_click(&self, locator: &Locator) -> Result<(), Error> {
        let element = self
            .ready_for("click", locator, false, self.explicit_wait)
            .await?;
        let prior = self.mark(&element).await;
        let outcome = match element.to_json() {
            Ok(handle) => self
                .driver()
                .execute("arguments[0].click();", vec![handle])
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        self.unmark(&element, prior).await;
        let description = self.describe(&element, locator).await;
        match outcome {
            Ok(()) => {
                reporting::info(format!("js-clicked on element: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("click", description, source)),
        }
    }

    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), Error> {
        let element = self
            .ready_for("type into", locator, false, self.explicit_wait)
            .await?;
        let prior = self.mark(&element).await;
        let outcome = element.send_keys(text).await;
        self.unmark(&element, prior).await;
        let description = self.describe(&element, locator).await;
        match outcome {
            Ok(()) => {
                reporting::info(format!("typed '{text}' into element: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("type into", description, source)),
        }
    }

    pub async fn clear_and_type(&self, locator: &Locator, text: &str) -> Result<(), Error> {
        let element = self
            .ready_for("clear and type into", locator, false, self.explicit_wait)
            .await?;
        let prior = self.mark(&element).await;
        let outcome = match element.clear().await {
            Ok(()) => element.send_keys(text).await,
            Err(e) => Err(e),
        };
        self.unmark(&element, prior).await;
        let description = self.describe(&element, locator).await;
        match outcome {
            Ok(()) => {
                reporting::info(format!(
                    "cleared and typed '{text}' into element: {description}"
                ));
                Ok(())
            }
            Err(source) => Err(action_err("clear and type into", description, source)),
        }
    }

    pub async fn text_of(&self, locator: &Locator) -> Result<String, Error> {
        let element = self
            .ready_for("read text of", locator, false, self.explicit_wait)
            .await?;
        let prior = self.mark(&element).await;
        let outcome = element.text().await;
        self.unmark(&element, prior).await;
        let description = self.describe(&element, locator).await;
        match outcome {
            Ok(text) => {
                reporting::info(format!("read text '{text}' from element: {description}"));
                Ok(text)
            }
            Err(source) => Err(action_err("read text of", description, source)),
        }
    }

    pub async fn attr_of(
        &self,
        locator: &Locator,
        attribute: &str,
    ) -> Result<Option<String>, Error> {
        let element = self
            .ready_for("read attribute of", locator, false, self.explicit_wait)
            .await?;
        let description = self.describe(&element, locator).await;
        match element.attr(attribute).await {
            Ok(value) => {
                reporting::info(format!(
                    "read attribute '{attribute}'='{}' from element: {description}",
                    value.as_deref().unwrap_or("")
                ));
                Ok(value)
            }
            Err(source) => Err(action_err("read attribute of", description, source)),
        }
    }

    pub async fn select_by_text(&self, locator: &Locator, text: &str) -> Result<(), Error> {
        let element = self
            .ready_for("select from", locator, false, self.explicit_wait)
            .await?;
        let description = self.describe(&element, locator).await;
        let outcome = match SelectElement::new(&element).await {
            Ok(select) => select.select_by_exact_text(text).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                reporting::info(format!("selected '{text}' from dropdown: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("select from", description, source)),
        }
    }

    pub async fn select_by_value(&self, locator: &Locator, value: &str) -> Result<(), Error> {
        let element = self
            .ready_for("select from", locator, false, self.explicit_wait)
            .await?;
        let description = self.describe(&element, locator).await;
        let outcome = match SelectElement::new(&element).await {
            Ok(select) => select.select_by_value(value).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                reporting::info(format!(
                    "selected value '{value}' from dropdown: {description}"
                ));
                Ok(())
            }
            Err(source) => Err(action_err("select from", description, source)),
        }
    }

    pub async fn select_by_index(&self, locator: &Locator, index: u32) -> Result<(), Error> {
        let element = self
            .ready_for("select from", locator, false, self.explicit_wait)
            .await?;
        let description = self.describe(&element, locator).await;
        let outcome = match SelectElement::new(&element).await {
            Ok(select) => select.select_by_index(index).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                reporting::info(format!(
                    "selected index {index} from dropdown: {description}"
                ));
                Ok(())
            }
            Err(source) => Err(action_err("select from", description, source)),
        }
    }

    pub async fn hover(&self, locator: &Locator) -> Result<(), Error> {
        let element = self
            .ready_for("hover over", locator, false, self.explicit_wait)
            .await?;
        let description = self.describe(&element, locator).await;
        let outcome = self
            .driver()
            .action_chain()
            .move_to_element_center(&element)
            .perform()
            .await;
        match outcome {
            Ok(()) => {
                reporting::info(format!("moved to element: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("hover over", description, source)),
        }
    }

    pub async fn double_click(&self, locator: &Locator) -> Result<(), Error> {
        let element = self
            .ready_for("double-click", locator, true, self.explicit_wait)
            .await?;
        let description = self.describe(&element, locator).await;
        let outcome = self
            .driver()
            .action_chain()
            .double_click_element(&element)
            .perform()
            .await;
        match outcome {
            Ok(()) => {
                reporting::info(format!("double-clicked on element: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("double-click", description, source)),
        }
    }

    pub async fn right_click(&self, locator: &Locator) -> Result<(), Error> {
        let element = self
            .ready_for("right-click", locator, true, self.explicit_wait)
            .await?;
        let description = self.describe(&element, locator).await;
        let outcome = self
            .driver()
            .action_chain()
            .context_click_element(&element)
            .perform()
            .await;
        match outcome {
            Ok(()) => {
                reporting::info(format!("right-clicked on element: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("right-click", description, source)),
        }
    }

    /// Switch the session's browsing context into a frame.
    pub async fn enter_frame(&self, locator: &Locator) -> Result<(), Error> {
        let element = self
            .ready_for("switch to frame", locator, false, self.explicit_wait)
            .await?;
        let description = self.describe(&element, locator).await;
        match element.enter_frame().await {
            Ok(()) => {
                reporting::info(format!("switched to frame: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("switch to frame", description, source)),
        }
    }

    /// Switch back to the top-level browsing context.
    pub async fn exit_frames(&self) -> Result<(), Error> {
        self.driver().enter_default_frame().await?;
        reporting::info("switched to default content");
        Ok(())
    }

    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, Error> {
        let ret = self.driver().execute(script, args).await?;
        Ok(ret.json().clone())
    }

    pub async fn scroll_to(&self, locator: &Locator) -> Result<(), Error> {
        let element = self
            .driver()
            .find(locator.by())
            .await
            .map_err(|source| action_err("scroll to", locator.to_string(), source))?;
        let description = self.describe(&element, locator).await;
        match element.scroll_into_view().await {
            Ok(()) => {
                reporting::info(format!("scrolled to element: {description}"));
                Ok(())
            }
            Err(source) => Err(action_err("scroll to", description, source)),
        }
    }

    // --- readiness probes ----------------------------------------------

    /// `false` when the element is missing, stale or hidden; never an error
    /// for those cases.
    pub async fn is_displayed(&self, locator: &Locator) -> Result<bool, Error> {
        Ok(self.probe_displayed(locator).await?.as_bool())
    }

    pub async fn probe_displayed(&self, locator: &Locator) -> Result<Probe, Error> {
        match self.driver().find(locator.by()).await {
            Ok(element) => match element.is_displayed().await {
                Ok(true) => Ok(Probe::Holds),
                Ok(false) => Ok(Probe::Fails),
                Err(e) if error::is_gone(&e) => Ok(Probe::Gone),
                Err(e) => Err(e.into()),
            },
            Err(e) if error::is_gone(&e) => Ok(Probe::Gone),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn is_enabled(&self, locator: &Locator) -> Result<bool, Error> {
        match self.driver().find(locator.by()).await {
            Ok(element) => match element.is_enabled().await {
                Ok(enabled) => Ok(enabled),
                Err(e) if error::is_gone(&e) => Ok(false),
                Err(e) => Err(e.into()),
            },
            Err(e) if error::is_gone(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn is_selected(&self, locator: &Locator) -> Result<bool, Error> {
        match self.driver().find(locator.by()).await {
            Ok(element) => match element.is_selected().await {
                Ok(selected) => Ok(selected),
                Err(e) if error::is_gone(&e) => Ok(false),
                Err(e) => Err(e.into()),
            },
            Err(e) if error::is_gone(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // --- diagnostics ----------------------------------------------------

    /// Capture the viewport as PNG under `dir`. Failures are logged and
    /// swallowed; a missing screenshot should never fail the test that
    /// asked for it.
    pub async fn save_screenshot(&self, dir: &Path) -> Option<PathBuf> {
        let png = match self.driver().screenshot_as_png().await {
            Ok(bytes) => bytes,
            Err(err) => {
                reporting::info(format!("failed to take screenshot: {err}"));
                return None;
            }
        };
        let path = dir.join(format!(
            "screenshot-{}.png",
            chrono::Local::now().format("%Y%m%d-%H%M%S%.3f")
        ));
        let write = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, &png));
        match write {
            Ok(()) => {
                reporting::info(format!("screenshot saved to {}", path.display()));
                Some(path)
            }
            Err(err) => {
                reporting::info(format!("failed to save screenshot: {err}"));
                None
            }
        }
    }

    // --- internals ------------------------------------------------------

    /// Run the operation's precondition wait, logging the target context on
    /// failure before handing the error back.
    async fn ready_for(
        &self,
        action: &'static str,
        locator: &Locator,
        clickable: bool,
        timeout: Duration,
    ) -> Result<WebElement, Error> {
        let waited = if clickable {
            self.wait_clickable_within(locator, timeout).await
        } else {
            self.wait_visible_within(locator, timeout).await
        };
        waited.map_err(|err| {
            reporting::info(format!("failed to {action} {locator}: {err}"));
            err
        })
    }

    /// Apply the diagnostic highlight. Returns the element's prior inline
    /// style for [`Self::unmark`]; `None` means highlighting is off or the
    /// marking failed, which is cosmetic and ignored.
    async fn mark(&self, element: &WebElement) -> Option<Option<String>> {
        if !self.highlight {
            return None;
        }
        let prior = element.attr("style").await.ok()?;
        let handle = element.to_json().ok()?;
        self.driver()
            .execute(
                "arguments[0].setAttribute('style', arguments[1]);",
                vec![handle, Value::String(HIGHLIGHT_STYLE.to_string())],
            )
            .await
            .ok()?;
        Some(prior)
    }

    /// Hold the highlight briefly, then restore the prior inline style.
    /// An element that had no inline style gets the attribute removed so
    /// the DOM returns to its exact pre-highlight state. All failures here
    /// are cosmetic and ignored.
    async fn unmark(&self, element: &WebElement, prior: Option<Option<String>>) {
        let Some(prior) = prior else { return };
        tokio::time::sleep(HIGHLIGHT_HOLD).await;
        let Ok(handle) = element.to_json() else { return };
        let _ = match prior {
            Some(style) => {
                self.driver()
                    .execute(
                        "arguments[0].setAttribute('style', arguments[1]);",
                        vec![handle, Value::String(style)],
                    )
                    .await
            }
            None => {
                self.driver()
                    .execute("arguments[0].removeAttribute('style');", vec![handle])
                    .await
            }
        };
    }

    /// Best-available description for log lines; falls back to the locator
    /// when the element can no longer be queried.
    async fn describe(&self, element: &WebElement, locator: &Locator) -> String {
        match element_description(element).await {
            Ok(description) => description,
            Err(_) => locator.to_string(),
        }
    }
}

/// One polling step for the visible/clickable waits. Not-found and stale
/// count as not-ready; anything else aborts the wait.
async fn poll_ready(
    driver: &WebDriver,
    by: By,
    clickable: bool,
) -> Result<Option<WebElement>, Error> {
    let element = match driver.find(by).await {
        Ok(element) => element,
        Err(e) if error::is_gone(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let ready = match element.is_displayed().await {
        Ok(displayed) => {
            if displayed && clickable {
                match element.is_enabled().await {
                    Ok(enabled) => enabled,
                    Err(e) if error::is_gone(&e) => false,
                    Err(e) => return Err(e.into()),
                }
            } else {
                displayed
            }
        }
        Err(e) if error::is_gone(&e) => false,
        Err(e) => return Err(e.into()),
    };
    Ok(ready.then_some(element))
}

fn action_err(action: &'static str, target: String, source: WebDriverError) -> Error {
    reporting::info(format!("failed to {action} {target}: {source}"));
    Error::Interaction {
        action,
        target,
        source,
    }
}

async fn element_description(element: &WebElement) -> Result<String, WebDriverError> {
    let id = element.attr("id").await?;
    let name = element.attr("name").await?;
    let text = element.text().await?;
    let tag = element.tag_name().await?;
    Ok(describe_from_parts(
        id.as_deref(),
        name.as_deref(),
        &text,
        &tag,
    ))
}

/// Description preference: identifying attribute, then name, then short
/// visible text, then the tag.
fn describe_from_parts(id: Option<&str>, name: Option<&str>, text: &str, tag: &str) -> String {
    if let Some(id) = id.filter(|v| !v.is_empty()) {
        return format!("id={id}");
    }
    if let Some(name) = name.filter(|v| !v.is_empty()) {
        return format!("name={name}");
    }
    let text = text.trim();
    if !text.is_empty() && text.len() < SHORT_TEXT_LIMIT {
        return format!("text={text}");
    }
    tag.to_string()
}
