pub mod browser;
pub mod collector;
pub mod extract;
pub mod static_page;
pub mod traits;
pub mod types;

pub use browser::ChromePage;
pub use collector::{
    run_and_save, save_records, Collection, CollectionReport, Collector, ScrapedIdSet,
};
pub use extract::ListingExtractor;
pub use static_page::StaticPage;
pub use traits::PageDriver;
pub use types::{DriverKind, ScrollTarget, SettleStrategy, SiteSelectors, StopReason};
