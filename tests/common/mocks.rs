use estate_scout::error::{CollectError, ModelError};
use estate_scout::predictor::{FeatureTransform, PropertyFeatures, RegressionModel};
use estate_scout::scrapers::{PageDriver, ScrollTarget, SiteSelectors};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One batch of listings as rendered after a "load more"
#[derive(Clone, Default)]
pub struct Batch {
    pub nodes: Vec<Result<String, CollectError>>,
    pub load_more: bool,
    pub click_fails: bool,
}

impl Batch {
    pub fn new(nodes: Vec<String>) -> Self {
        Self {
            nodes: nodes.into_iter().map(Ok).collect(),
            load_more: true,
            click_fails: false,
        }
    }

    pub fn last(mut self) -> Self {
        self.load_more = false;
        self
    }
}

/// Page driver replaying a fixed sequence of batches
pub struct ScriptedPage {
    selectors: SiteSelectors,
    batches: Vec<Batch>,
    current: usize,
    pub container_present: bool,
    pub calls: Vec<String>,
}

impl ScriptedPage {
    pub fn new(batches: Vec<Batch>) -> Self {
        Self {
            selectors: SiteSelectors::default(),
            batches,
            current: 0,
            container_present: true,
            calls: Vec::new(),
        }
    }

    pub fn clicks(&self) -> usize {
        self.calls.iter().filter(|c| c.starts_with("activate")).count()
    }

    fn batch(&self) -> Option<&Batch> {
        self.batches.get(self.current)
    }
}

impl PageDriver for ScriptedPage {
    fn navigate(&mut self, url: &str) -> Result<(), CollectError> {
        self.calls.push(format!("navigate {}", url));
        Ok(())
    }

    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), CollectError> {
        self.calls.push(format!("wait {}", selector));
        let present = if selector == self.selectors.container {
            self.container_present
        } else {
            self.batch().is_some_and(|batch| !batch.nodes.is_empty())
        };
        if present {
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
        self.calls.push(format!("snapshot {}", selector));
        Ok(self.batch().map(|batch| batch.nodes.clone()).unwrap_or_default())
    }

    fn has_element(&mut self, selector: &str) -> Result<bool, CollectError> {
        Ok(selector == self.selectors.load_more && self.batch().is_some_and(|b| b.load_more))
    }

    fn activate(&mut self, selector: &str) -> Result<(), CollectError> {
        self.calls.push(format!("activate {}", selector));
        if self.batch().is_some_and(|b| b.click_fails) {
            return Err(CollectError::driver("element is detached"));
        }
        self.current += 1;
        Ok(())
    }

    fn scroll(&mut self, target: ScrollTarget) -> Result<(), CollectError> {
        self.calls.push(format!("scroll {:?}", target));
        Ok(())
    }

    fn settle(&mut self, fallback: Duration) {
        self.calls.push(format!("settle {}ms", fallback.as_millis()));
    }
}

/// Listing card markup as the site renders it
pub fn card(id: Option<&str>, title: &str) -> String {
    let id_line = id
        .map(|id| format!(r#"<span class="mh-estate-vertical__more-info">Property ID: {}</span>"#, id))
        .unwrap_or_default();
    format!(
        r#"<div class="mh-property">
            <h3 class="mh-estate-vertical__heading"><a href="/listing">{title}</a></h3>
            <div class="mh-estate-vertical__primary"><div>1,200 USD</div></div>
            <span class="mh-estate-vertical__more-info mh-attribute__townships">Township: Bahan</span>
            <span class="mh-estate-vertical__more-info mh-attribute__bedrooms">Bedrooms: 2</span>
            {id_line}
        </div>"#
    )
}

/// Transform returning a fixed vector and remembering its inputs
#[derive(Clone, Default)]
pub struct FixedTransform {
    pub output: Vec<f64>,
    pub seen: Arc<Mutex<Vec<PropertyFeatures>>>,
}

impl FixedTransform {
    pub fn new(output: Vec<f64>) -> Self {
        Self {
            output,
            seen: Arc::default(),
        }
    }
}

impl FeatureTransform for FixedTransform {
    fn transform(&self, record: &PropertyFeatures) -> Result<Vec<f64>, ModelError> {
        self.seen.lock().unwrap().push(record.clone());
        Ok(self.output.clone())
    }
}

/// Transform rejecting every township outside a known list
pub struct KnownTownships(pub Vec<&'static str>);

impl FeatureTransform for KnownTownships {
    fn transform(&self, record: &PropertyFeatures) -> Result<Vec<f64>, ModelError> {
        if self.0.contains(&record.township.as_str()) {
            Ok(vec![1.0])
        } else {
            Err(ModelError::UnknownCategory {
                column: "township".to_string(),
                value: record.township.clone(),
            })
        }
    }
}

/// Model returning a fixed log-price for the expected feature vector
pub struct FixedModel {
    pub expected: Vec<f64>,
    pub log_price: f64,
}

impl RegressionModel for FixedModel {
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features != self.expected.as_slice() {
            return Err(ModelError::FeatureCount {
                expected: self.expected.len(),
                actual: features.len(),
            });
        }
        Ok(self.log_price)
    }
}
