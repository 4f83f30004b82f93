use crate::config::CollectorConfig;
use crate::error::{CollectError, Error, ExtractionError};
use crate::models::ListingRecord;
use crate::scrapers::extract::ListingExtractor;
use crate::scrapers::traits::PageDriver;
use crate::scrapers::types::{ScrollTarget, StopReason};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Listing IDs already emitted during one run
#[derive(Debug, Default)]
pub struct ScrapedIdSet {
    seen: HashSet<String>,
}

impl ScrapedIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` and report whether the listing should be kept.
    ///
    /// Listings without an ID are always kept; there is nothing to compare.
    pub fn admit(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) => self.seen.insert(id.to_string()),
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Extraction passes completed
    pub pages: usize,
    pub records: usize,
    pub duplicates_skipped: usize,
    pub nodes_failed: usize,
    pub stop_reason: StopReason,
}

/// Records gathered by a run, in the order they were first seen
#[derive(Debug, Clone)]
pub struct Collection {
    pub records: Vec<ListingRecord>,
    pub report: CollectionReport,
}

#[derive(Default)]
struct RunState {
    records: Vec<ListingRecord>,
    ids: ScrapedIdSet,
    pages: usize,
    duplicates_skipped: usize,
    nodes_failed: usize,
}

/// Drives a page through "load more" pagination and gathers listings
pub struct Collector {
    config: CollectorConfig,
    extractor: ListingExtractor,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Result<Self, CollectError> {
        let extractor = ListingExtractor::new(&config.selectors)?;
        Ok(Self { config, extractor })
    }

    /// Run one collection against `page`.
    ///
    /// Never fails outright: a fatal error ends the loop and is reported as
    /// [`StopReason::Fatal`] alongside whatever was gathered before it.
    pub fn collect<P: PageDriver + ?Sized>(&self, page: &mut P) -> Collection {
        let started_at = Utc::now();
        let mut state = RunState::default();

        let stop_reason = match self.run(page, &mut state) {
            Ok(reason) => reason,
            Err(e) => StopReason::Fatal(e),
        };

        let report = CollectionReport {
            started_at,
            finished_at: Utc::now(),
            pages: state.pages,
            records: state.records.len(),
            duplicates_skipped: state.duplicates_skipped,
            nodes_failed: state.nodes_failed,
            stop_reason,
        };

        Collection {
            records: state.records,
            report,
        }
    }

    fn run<P: PageDriver + ?Sized>(
        &self,
        page: &mut P,
        state: &mut RunState,
    ) -> Result<StopReason, CollectError> {
        let selectors = &self.config.selectors;

        info!("Opening {}", self.config.base_url);
        page.navigate(&self.config.base_url)?;
        page.wait_for_selector(&selectors.container, self.config.selector_timeout())?;

        // Lazy-loaded cards only appear after the page has been scrolled
        info!("Scrolling to load initial items...");
        page.scroll(ScrollTarget::Bottom)?;
        page.settle(millis(self.config.initial_scroll_bottom_ms));
        page.scroll(ScrollTarget::To(self.config.initial_scroll_y))?;
        page.settle(millis(self.config.initial_scroll_top_ms));

        loop {
            if let Some(max_pages) = self.page_cap_reached(state) {
                return Ok(StopReason::PageCap(max_pages));
            }

            info!("--- Page {} ---", state.pages + 1);

            match page.wait_for_selector(&selectors.listing, self.config.selector_timeout()) {
                Ok(()) => {}
                Err(CollectError::PageTimeout { .. }) => {
                    info!("No listings found on this page");
                    return Ok(StopReason::NoListings);
                }
                Err(e) => return Err(e),
            }

            let kept = self.extract_batch(page, state)?;
            state.pages += 1;
            info!(
                "Collected {} new listings on this page, {} so far",
                kept,
                state.records.len()
            );

            if let Some(max_pages) = self.page_cap_reached(state) {
                return Ok(StopReason::PageCap(max_pages));
            }

            if !page.has_element(&selectors.load_more)? {
                info!("No 'Load more' button found");
                return Ok(StopReason::NoLoadMore);
            }

            info!("Clicking 'Load more'...");
            if let Err(e) = self.load_more(page) {
                warn!("Error clicking load more: {}", e);
                return Ok(StopReason::LoadMoreFailed(e.to_string()));
            }
        }
    }

    /// Extract every listing node on the page, keeping unseen ones.
    fn extract_batch<P: PageDriver + ?Sized>(
        &self,
        page: &mut P,
        state: &mut RunState,
    ) -> Result<usize, CollectError> {
        let snapshots = page.node_snapshots(&self.config.selectors.listing)?;
        debug!("Found {} listing nodes", snapshots.len());

        let mut kept = 0;
        for (idx, snapshot) in snapshots.into_iter().enumerate() {
            let extracted = snapshot
                .map_err(|e| ExtractionError::Snapshot(e.to_string()))
                .and_then(|html| self.extractor.extract(&html));

            let record = match extracted {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping listing node {}: {}", idx, e);
                    state.nodes_failed += 1;
                    continue;
                }
            };

            if self.config.deduplicate && !state.ids.admit(record.listing_id.as_deref()) {
                debug!("Skipping duplicate listing {:?}", record.listing_id);
                state.duplicates_skipped += 1;
                continue;
            }

            state.records.push(record);
            kept += 1;
        }

        Ok(kept)
    }

    fn load_more<P: PageDriver + ?Sized>(&self, page: &mut P) -> Result<(), CollectError> {
        page.activate(&self.config.selectors.load_more)?;
        page.settle(millis(self.config.load_more_settle_ms));
        page.scroll(ScrollTarget::By(self.config.supplementary_scroll_px))?;
        page.settle(millis(self.config.supplementary_scroll_ms));
        Ok(())
    }

    fn page_cap_reached(&self, state: &RunState) -> Option<usize> {
        self.config
            .max_pages
            .filter(|max_pages| state.pages >= *max_pages)
    }
}

/// Write records as a pretty-printed JSON array, non-ASCII text kept as is.
pub async fn save_records(path: impl AsRef<Path>, records: &[ListingRecord]) -> crate::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Run a collection on a blocking thread, write whatever was gathered, then
/// report a run that ended on a fatal error as `Error::Aborted`.
///
/// The output file is written before the stop reason is inspected, so a
/// fatal run still leaves its partial results on disk.
pub async fn run_and_save<P, F>(config: CollectorConfig, open_page: F) -> crate::Result<CollectionReport>
where
    P: PageDriver,
    F: FnOnce(&CollectorConfig) -> anyhow::Result<P> + Send + 'static,
{
    let output_path = config.output_path.clone();
    let collection = tokio::task::spawn_blocking(move || -> crate::Result<Collection> {
        let collector = Collector::new(config.clone())?;
        let mut page = open_page(&config).map_err(|e| Error::Driver(format!("{:#}", e)))?;
        Ok(collector.collect(&mut page))
    })
    .await??;

    save_records(&output_path, &collection.records).await?;

    let report = collection.report;
    info!("=== SCRAPING COMPLETE ===");
    info!(
        "Total unique listings collected: {} over {} pages in {}s",
        report.records,
        report.pages,
        (report.finished_at - report.started_at).num_seconds()
    );
    info!(
        "Skipped {} duplicates and {} unreadable listing nodes",
        report.duplicates_skipped, report.nodes_failed
    );
    info!("Stopped: {}", report.stop_reason);
    info!("💾 Saved listings to {}", output_path);

    if report.stop_reason.is_fatal() {
        error!("Collection ended early: {}", report.stop_reason);
        return Err(Error::Aborted(report.stop_reason));
    }
    Ok(report)
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
