use crate::error::{CollectError, ExtractionError};
use crate::models::{ListingDetails, ListingRecord};
use crate::scrapers::types::SiteSelectors;
use scraper::{ElementRef, Html, Selector};

/// Turns a listing card's HTML snapshot into a [`ListingRecord`]
///
/// Selectors are compiled once per run. Extraction is a pure function of the
/// snapshot, so the same card always yields the same record.
pub struct ListingExtractor {
    title: Selector,
    price: Selector,
    more_info: Selector,
    property_type: Selector,
    township: Selector,
    bedrooms: Selector,
    property_size: Selector,
    listing_id_marker: String,
    property_type_marker: String,
    township_marker: String,
    bedrooms_marker: String,
    property_size_marker: String,
}

impl ListingExtractor {
    pub fn new(site: &SiteSelectors) -> Result<Self, CollectError> {
        Ok(Self {
            title: compile(&site.title)?,
            price: compile(&site.price)?,
            more_info: compile(&site.more_info)?,
            property_type: compile(&site.property_type)?,
            township: compile(&site.township)?,
            bedrooms: compile(&site.bedrooms)?,
            property_size: compile(&site.property_size)?,
            listing_id_marker: site.listing_id_marker.clone(),
            property_type_marker: site.property_type_marker.clone(),
            township_marker: site.township_marker.clone(),
            bedrooms_marker: site.bedrooms_marker.clone(),
            property_size_marker: site.property_size_marker.clone(),
        })
    }

    /// Extract one card. Missing fields come back as `None`; only a card
    /// without any element content is an error.
    pub fn extract(&self, node_html: &str) -> Result<ListingRecord, ExtractionError> {
        let fragment = Html::parse_fragment(node_html);
        let root = fragment.root_element();
        if !root.children().any(|child| child.value().is_element()) {
            return Err(ExtractionError::EmptyNode);
        }

        let title = first_text(root, &self.title).filter(|text| !text.is_empty());
        let price = first_text(root, &self.price).filter(|text| !text.is_empty());

        // The ID line has no dedicated class, so scan every "more info" line
        let listing_id = root
            .select(&self.more_info)
            .map(node_text)
            .find(|text| text.contains(&self.listing_id_marker))
            .map(|text| strip_marker(&text, &self.listing_id_marker))
            .filter(|id| !id.is_empty());

        let details = ListingDetails {
            property_type: self.attribute(root, &self.property_type, &self.property_type_marker),
            township: self.attribute(root, &self.township, &self.township_marker),
            bedrooms: self.attribute(root, &self.bedrooms, &self.bedrooms_marker),
            property_size: self.attribute(root, &self.property_size, &self.property_size_marker),
        };

        Ok(ListingRecord {
            title,
            price,
            listing_id,
            details,
        })
    }

    fn attribute(&self, root: ElementRef<'_>, selector: &Selector, marker: &str) -> Option<String> {
        first_text(root, selector)
            .filter(|text| !text.is_empty())
            .map(|text| strip_marker(&text, marker))
    }
}

fn compile(selector: &str) -> Result<Selector, CollectError> {
    Selector::parse(selector).map_err(|_| CollectError::Selector(selector.to_string()))
}

fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector).next().map(node_text)
}

/// Rendered text of a node with whitespace runs collapsed, like `innerText`
fn node_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_marker(text: &str, marker: &str) -> String {
    text.replace(marker, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CARD: &str = r#"
        <div class="mh-property">
          <h3 class="mh-estate-vertical__heading"><a href="/p/1">  Sunny Condo
            near Inya Lake </a></h3>
          <div class="mh-estate-vertical__primary"><div> 1,500 USD / month </div></div>
          <span class="mh-estate-vertical__more-info mh-attribute__property-type">Property type: Condo</span>
          <span class="mh-estate-vertical__more-info mh-attribute__townships">Township: Kamayut</span>
          <span class="mh-estate-vertical__more-info mh-attribute__bedrooms">Bedrooms: 3</span>
          <span class="mh-estate-vertical__more-info mh-attribute__property-size">Property size: 2,000 sqft</span>
          <span class="mh-estate-vertical__more-info">Property ID: <strong>R-1042</strong></span>
        </div>"#;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&SiteSelectors::default()).unwrap()
    }

    #[test]
    fn extracts_every_field_from_a_full_card() {
        let record = extractor().extract(CARD).unwrap();

        assert_eq!(
            record,
            ListingRecord {
                title: Some("Sunny Condo near Inya Lake".to_string()),
                price: Some("1,500 USD / month".to_string()),
                listing_id: Some("R-1042".to_string()),
                details: ListingDetails {
                    property_type: Some("Condo".to_string()),
                    township: Some("Kamayut".to_string()),
                    bedrooms: Some("3".to_string()),
                    property_size: Some("2,000 sqft".to_string()),
                },
            }
        );
    }

    #[test]
    fn same_snapshot_extracts_identically() {
        let extractor = extractor();
        assert_eq!(extractor.extract(CARD).unwrap(), extractor.extract(CARD).unwrap());
    }

    #[test]
    fn missing_fields_are_absent_not_errors() {
        let card = r#"<div class="mh-property">
            <span class="mh-estate-vertical__more-info mh-attribute__townships">Township: Bahan</span>
            <span class="mh-estate-vertical__more-info">Listed: yesterday</span>
        </div>"#;

        let record = extractor().extract(card).unwrap();

        assert_eq!(record.title, None);
        assert_eq!(record.price, None);
        assert_eq!(record.listing_id, None);
        assert_eq!(
            record.details,
            ListingDetails {
                township: Some("Bahan".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn empty_snapshot_is_a_node_failure() {
        assert_eq!(extractor().extract("   ").unwrap_err(), ExtractionError::EmptyNode);
    }

    #[test]
    fn bad_selector_is_rejected_up_front() {
        let site = SiteSelectors {
            title: "h3[".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ListingExtractor::new(&site),
            Err(CollectError::Selector(s)) if s == "h3["
        ));
    }
}
