use log::{debug, warn};
use scraper::{Html, Selector};

use super::RecordExtractor;
use crate::core::{ExtractError, HarvestError, HarvestResult, ProductUrl, VariantRecord};

pub const DEFAULT_TITLE_SELECTOR: &str = ".productView-title";
pub const DEFAULT_OPTION_SELECTOR: &str =
    "select.form-select.form-select--small.form-select--alt > option[data-product-attribute-value]";

/// CSS selectors locating the product title and its variant options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    pub title: String,
    pub options: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_SELECTOR.to_string(),
            options: DEFAULT_OPTION_SELECTOR.to_string(),
        }
    }
}

/// What to do when a page has variants but no title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingTitlePolicy {
    /// Keep the records with an empty name and log a warning.
    #[default]
    UseEmpty,
    /// Report the page as failed.
    Fail,
}

pub struct VariantExtractor {
    title: Selector,
    options: Selector,
    missing_title: MissingTitlePolicy,
}

fn parse_selector(selector: &str) -> HarvestResult<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

impl VariantExtractor {
    pub fn new(selectors: &SelectorSet, missing_title: MissingTitlePolicy) -> HarvestResult<Self> {
        Ok(Self {
            title: parse_selector(&selectors.title)?,
            options: parse_selector(&selectors.options)?,
            missing_title,
        })
    }
}

impl RecordExtractor for VariantExtractor {
    /// One record per option element, sharing the page title and URL.
    ///
    /// Option text is kept verbatim. A page without option elements yields no
    /// records, which callers must keep distinct from a failed fetch.
    fn extract(&self, markup: &str, url: &ProductUrl) -> Result<Vec<VariantRecord>, ExtractError> {
        let document = Html::parse_document(markup);

        let variants: Vec<String> = document
            .select(&self.options)
            .map(|e| e.text().collect::<String>())
            .collect();
        if variants.is_empty() {
            warn!("No variants for product at {}", url);
            return Ok(Vec::new());
        }

        let name = match document.select(&self.title).next() {
            Some(element) => element.text().collect::<String>(),
            None => match self.missing_title {
                MissingTitlePolicy::UseEmpty => {
                    warn!("No product title at {}, using an empty name", url);
                    String::new()
                }
                MissingTitlePolicy::Fail => return Err(ExtractError::MissingTitle),
            },
        };

        debug!(
            "Fetched data for {} with {} variants",
            name,
            variants.len()
        );

        Ok(variants
            .into_iter()
            .map(|variant| VariantRecord::new(name.clone(), variant, url.clone()))
            .collect())
    }
}
