use crate::error::CollectError;
use crate::scrapers::types::ScrollTarget;
use std::time::Duration;

/// Page automation capability the collector drives
///
/// Every call completes (or times out) before the next one starts; a driver
/// owns a single page session. Implementations exist for headless Chrome and
/// for static HTML documents.
pub trait PageDriver {
    /// Load `url` in the page.
    fn navigate(&mut self, url: &str) -> Result<(), CollectError>;

    /// Block until at least one node matches `selector`.
    ///
    /// Returns `CollectError::PageTimeout` if nothing matched within `timeout`.
    fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
        -> Result<(), CollectError>;

    /// Outer HTML of every node currently matching `selector`, in DOM order.
    ///
    /// Each snapshot is fetched independently so a node that detaches while
    /// being read fails on its own.
    fn node_snapshots(&mut self, selector: &str)
        -> Result<Vec<Result<String, CollectError>>, CollectError>;

    /// Whether any node currently matches `selector`.
    fn has_element(&mut self, selector: &str) -> Result<bool, CollectError>;

    /// Scroll the first node matching `selector` into view and click it.
    fn activate(&mut self, selector: &str) -> Result<(), CollectError>;

    fn scroll(&mut self, target: ScrollTarget) -> Result<(), CollectError>;

    /// Let freshly triggered content render.
    ///
    /// `fallback` bounds the wait; drivers without a better signal just sleep.
    fn settle(&mut self, fallback: Duration) {
        std::thread::sleep(fallback);
    }
}
