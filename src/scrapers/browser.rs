use crate::config::CollectorConfig;
use crate::error::CollectError;
use crate::scrapers::traits::PageDriver;
use crate::scrapers::types::{ScrollTarget, SettleStrategy};
use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Page driver backed by a headless Chrome tab
pub struct ChromePage {
    // Dropping the browser closes Chrome, so it lives as long as the tab
    _browser: Browser,
    tab: Arc<Tab>,
    settle: SettleStrategy,
    dom_quiet: Duration,
}

impl ChromePage {
    /// Launch Chrome and open a fresh tab
    pub fn launch(config: &CollectorConfig) -> Result<Self> {
        info!("Launching Chrome (headless: {})...", config.headless);

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_default_timeout(config.navigation_timeout());

        Ok(Self {
            _browser: browser,
            tab,
            settle: config.settle,
            dom_quiet: Duration::from_millis(config.dom_quiet_ms),
        })
    }

    fn evaluate(&self, script: &str, await_promise: bool) -> Result<Option<serde_json::Value>> {
        let result = self.tab.evaluate(script, await_promise)?;
        Ok(result.value)
    }

    /// Resolve once no DOM mutation has been seen for `dom_quiet`, or after `limit`
    fn wait_for_dom_quiet(&self, limit: Duration) -> Result<()> {
        let script = format!(
            r#"
            new Promise(resolve => {{
                let quiet = setTimeout(done, {quiet});
                const cap = setTimeout(done, {limit});
                const observer = new MutationObserver(() => {{
                    clearTimeout(quiet);
                    quiet = setTimeout(done, {quiet});
                }});
                function done() {{
                    observer.disconnect();
                    clearTimeout(quiet);
                    clearTimeout(cap);
                    resolve(true);
                }}
                observer.observe(document.body, {{ childList: true, subtree: true, attributes: true }});
            }})
            "#,
            quiet = self.dom_quiet.as_millis(),
            limit = limit.as_millis(),
        );
        self.evaluate(&script, true)?;
        Ok(())
    }

    fn element_present(&self, selector: &str) -> Result<bool, CollectError> {
        let quoted = serde_json::to_string(selector).map_err(CollectError::driver)?;
        let script = format!("document.querySelector({}) !== null", quoted);
        let value = self.evaluate(&script, false).map_err(CollectError::driver)?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

impl PageDriver for ChromePage {
    fn navigate(&mut self, url: &str) -> Result<(), CollectError> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| CollectError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), CollectError> {
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("Waiting for '{}' failed: {}", selector, e);
                Err(CollectError::PageTimeout {
                    selector: selector.to_string(),
                    timeout,
                })
            }
        }
    }

    fn node_snapshots(
        &mut self,
        selector: &str,
    ) -> Result<Vec<Result<String, CollectError>>, CollectError> {
        let elements = match self.tab.find_elements(selector) {
            Ok(elements) => elements,
            // An empty match is reported as an error by the tab
            Err(e) if !self.element_present(selector)? => {
                debug!("No nodes match '{}': {}", selector, e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(CollectError::driver(e)),
        };

        Ok(elements
            .iter()
            .map(|element| element.get_content().map_err(CollectError::driver))
            .collect())
    }

    fn has_element(&mut self, selector: &str) -> Result<bool, CollectError> {
        self.element_present(selector)
    }

    fn activate(&mut self, selector: &str) -> Result<(), CollectError> {
        let element = self.tab.find_element(selector).map_err(CollectError::driver)?;
        element
            .scroll_into_view()
            .and_then(|element| element.click())
            .map_err(CollectError::driver)?;
        Ok(())
    }

    fn scroll(&mut self, target: ScrollTarget) -> Result<(), CollectError> {
        self.evaluate(&target.script(), false)
            .map(|_| ())
            .map_err(CollectError::driver)
    }

    fn settle(&mut self, fallback: Duration) {
        match self.settle {
            SettleStrategy::Fixed => thread::sleep(fallback),
            SettleStrategy::DomQuiet => {
                if let Err(e) = self.wait_for_dom_quiet(fallback) {
                    warn!("DOM settle wait failed, sleeping instead: {}", e);
                    thread::sleep(fallback);
                }
            }
        }
    }
}
