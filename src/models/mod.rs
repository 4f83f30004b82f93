use serde::{Deserialize, Serialize};

/// Typed attributes shown on a listing card
///
/// Attributes missing from the card are omitted from the serialized output
/// rather than written as null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub township: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_size: Option<String>,
}

/// One scraped property listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: Option<String>,
    /// Price as displayed, currency and unit included
    pub price: Option<String>,
    /// Site listing identifier, used as the deduplication key
    #[serde(rename = "property_id")]
    pub listing_id: Option<String>,
    pub details: ListingDetails,
}
