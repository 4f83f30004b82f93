use crate::error::CollectError;
use crate::scrapers::traits::PageDriver;
use crate::scrapers::types::ScrollTarget;
use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Page driver over a single HTML document, without JavaScript
///
/// The document never changes, so waits resolve immediately and there is no
/// clickable "load more": a run ends after the first batch.
pub struct StaticPage {
    url: String,
    html: String,
}

impl StaticPage {
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Load a saved copy of the listing page
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let html = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        info!("Loaded {} bytes of HTML from {}", html.len(), path.display());
        Ok(Self::from_html(path.display().to_string(), html))
    }

    /// Download the page as served, before any script runs
    pub async fn fetch(url: &str, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        debug!("Fetching URL: {}", url);
        let response = client.get(url).send().await?;

        if !response.status().is_success() {
            warn!("Listing page returned status: {}", response.status());
        }
        let html = response.error_for_status()?.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(Self::from_html(url, html))
    }

    fn select_html(&self, selector: &str) -> Result<Vec<String>, CollectError> {
        let selector =
            Selector::parse(selector).map_err(|_| CollectError::Selector(selector.to_string()))?;
        let document = Html::parse_document(&self.html);
        let nodes = document.select(&selector).map(|node| node.html()).collect();
        Ok(nodes)
    }
}

impl PageDriver for StaticPage {
    fn navigate(&mut self, url: &str) -> Result<(), CollectError> {
        if url != self.url {
            debug!("Static page serves {} in place of {}", self.url, url);
        }
        Ok(())
    }

    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), CollectError> {
        if self.has_element(selector)? {
            Ok(())
        } else {
            Err(CollectError::PageTimeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    fn node_snapshots(
        &mut self,
        selector: &str,
    ) -> Result<Vec<Result<String, CollectError>>, CollectError> {
        Ok(self.select_html(selector)?.into_iter().map(Ok).collect())
    }

    fn has_element(&mut self, selector: &str) -> Result<bool, CollectError> {
        Ok(!self.select_html(selector)?.is_empty())
    }

    fn activate(&mut self, selector: &str) -> Result<(), CollectError> {
        Err(CollectError::Driver(format!(
            "cannot activate '{}' without a browser",
            selector
        )))
    }

    fn scroll(&mut self, _target: ScrollTarget) -> Result<(), CollectError> {
        Ok(())
    }

    fn settle(&mut self, _fallback: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="mh-search">
          <div class="mh-property"><span class="mh-estate-vertical__more-info">Property ID: 1</span></div>
          <div class="mh-property"><span class="mh-estate-vertical__more-info">Property ID: 2</span></div>
          <div class="mh-search__more"><button>Load more</button></div>
        </div>
    </body></html>"#;

    #[test]
    fn snapshots_follow_document_order() {
        let mut page = StaticPage::from_html("https://example.test/", PAGE);
        let snapshots: Vec<String> = page
            .node_snapshots(".mh-property")
            .unwrap()
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].contains("Property ID: 1"));
        assert!(snapshots[1].contains("Property ID: 2"));
    }

    #[test]
    fn missing_selector_times_out_immediately() {
        let mut page = StaticPage::from_html("https://example.test/", PAGE);
        let err = page
            .wait_for_selector(".mh-gallery", Duration::from_secs(10))
            .unwrap_err();
        assert!(matches!(err, CollectError::PageTimeout { .. }));
    }

    #[test]
    fn load_more_cannot_be_clicked() {
        let mut page = StaticPage::from_html("https://example.test/", PAGE);
        assert!(page.has_element(".mh-search__more button").unwrap());
        assert!(page.activate(".mh-search__more button").is_err());
    }

    #[tokio::test]
    async fn error_status_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, axum::Router::new()).await.unwrap();
        });

        let url = format!("http://{}/rent/", addr);
        let err = StaticPage::fetch(&url, Duration::from_secs(5))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, crate::Error::Network(ref e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND)));
    }
}
