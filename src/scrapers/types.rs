use crate::error::CollectError;
use serde::{Deserialize, Serialize};

/// CSS selectors and label markers for the listing site's markup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    /// Search results container, present once the page has rendered
    pub container: String,
    /// A single listing card
    pub listing: String,
    /// "More info" lines inside a card; one of them carries the listing ID
    pub more_info: String,
    pub title: String,
    pub price: String,
    pub property_type: String,
    pub township: String,
    pub bedrooms: String,
    pub property_size: String,
    pub load_more: String,
    pub listing_id_marker: String,
    pub property_type_marker: String,
    pub township_marker: String,
    pub bedrooms_marker: String,
    pub property_size_marker: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            container: ".mh-search".to_string(),
            listing: ".mh-property".to_string(),
            more_info: "span.mh-estate-vertical__more-info".to_string(),
            title: "h3.mh-estate-vertical__heading a".to_string(),
            price: ".mh-estate-vertical__primary > div".to_string(),
            property_type: ".mh-estate-vertical__more-info.mh-attribute__property-type"
                .to_string(),
            township: ".mh-estate-vertical__more-info.mh-attribute__townships".to_string(),
            bedrooms: ".mh-estate-vertical__more-info.mh-attribute__bedrooms".to_string(),
            property_size: ".mh-estate-vertical__more-info.mh-attribute__property-size"
                .to_string(),
            load_more: ".mh-search__more button".to_string(),
            listing_id_marker: "Property ID:".to_string(),
            property_type_marker: "Property type:".to_string(),
            township_marker: "Township:".to_string(),
            bedrooms_marker: "Bedrooms:".to_string(),
            property_size_marker: "Property size:".to_string(),
        }
    }
}

/// Which page automation backend drives a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    /// Headless Chrome, renders JavaScript and follows "load more"
    Chrome,
    /// Plain HTTP fetch, first batch only
    Static,
}

/// How the driver waits for content after a scroll or click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleStrategy {
    /// Sleep for the configured delay
    Fixed,
    /// Wait until the DOM stops mutating, bounded by the configured delay
    DomQuiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Bottom,
    To(i64),
    By(i64),
}

impl ScrollTarget {
    pub fn script(&self) -> String {
        match self {
            ScrollTarget::Bottom => "window.scrollTo(0, document.body.scrollHeight)".to_string(),
            ScrollTarget::To(y) => format!("window.scrollTo(0, {})", y),
            ScrollTarget::By(dy) => format!("window.scrollBy(0, {})", dy),
        }
    }
}

/// Why the pagination loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// No listing node appeared within the selector timeout
    NoListings,
    /// The "load more" control is gone
    NoLoadMore,
    /// Activating "load more" failed; treated as end of pagination
    LoadMoreFailed(String),
    /// Configured page cap reached
    PageCap(usize),
    /// The run could not continue; accumulated records are still written
    Fatal(CollectError),
}

impl StopReason {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StopReason::Fatal(_))
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::NoListings => write!(f, "no listings on page"),
            StopReason::NoLoadMore => write!(f, "no 'load more' control"),
            StopReason::LoadMoreFailed(reason) => write!(f, "'load more' failed: {}", reason),
            StopReason::PageCap(pages) => write!(f, "page cap of {} reached", pages),
            StopReason::Fatal(e) => write!(f, "fatal: {}", e),
        }
    }
}
