use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use super::errors::FetchError;

/// Absolute URL of one product page. Duplicates are legal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductUrl(Url);

impl ProductUrl {
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Url> for ProductUrl {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl FromStr for ProductUrl {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s).map(Self)
    }
}

impl fmt::Display for ProductUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One (product, variant) pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Variant")]
    pub variant: String,
    #[serde(rename = "URL")]
    pub url: ProductUrl,
}

impl VariantRecord {
    pub fn new(name: impl Into<String>, variant: impl Into<String>, url: ProductUrl) -> Self {
        Self {
            name: name.into(),
            variant: variant.into(),
            url,
        }
    }
}

/// What happened to a single page.
///
/// `Records(vec![])` means the page was fetched but carried no variants,
/// which is distinct from `Failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Records(Vec<VariantRecord>),
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failure(_))
    }
}

/// A `FetchOutcome` tagged with the URL it was produced for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub url: ProductUrl,
    pub outcome: FetchOutcome,
}

impl PageOutcome {
    pub fn records(url: ProductUrl, records: Vec<VariantRecord>) -> Self {
        Self {
            url,
            outcome: FetchOutcome::Records(records),
        }
    }

    pub fn failure(url: ProductUrl, error: FetchError) -> Self {
        Self {
            url,
            outcome: FetchOutcome::Failure(error),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_urls: usize,
    pub succeeded: usize,
    pub empty: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: ProductUrl,
    pub error: FetchError,
}

/// Final output of a run. Owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub records: Vec<VariantRecord>,
    pub summary: Summary,
    pub failures: Vec<PageFailure>,
}

impl AggregateResult {
    pub const COLUMNS: [&'static str; 3] = ["Name", "Variant", "URL"];

    /// Records as `[Name, Variant, URL]` rows, in `COLUMNS` order.
    pub fn rows(&self) -> Vec<[String; 3]> {
        self.records
            .iter()
            .map(|r| [r.name.clone(), r.variant.clone(), r.url.to_string()])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_url_requires_absolute_url() {
        assert!("/products/driver".parse::<ProductUrl>().is_err());
        let url: ProductUrl = "https://shop.example.com/p/1".parse().unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/p/1");
    }

    #[test]
    fn test_record_serializes_with_column_names() {
        let url: ProductUrl = "https://shop.example.com/p/1".parse().unwrap();
        let record = VariantRecord::new("Hybrid 3", "19 deg", url);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "Name": "Hybrid 3",
                "Variant": "19 deg",
                "URL": "https://shop.example.com/p/1",
            })
        );
    }

    #[test]
    fn test_rows_follow_column_order() {
        let url: ProductUrl = "https://shop.example.com/p/1".parse().unwrap();
        let result = AggregateResult {
            records: vec![VariantRecord::new("Hybrid", "Stiff", url)],
            ..Default::default()
        };

        assert_eq!(
            result.rows(),
            vec![[
                "Hybrid".to_string(),
                "Stiff".to_string(),
                "https://shop.example.com/p/1".to_string()
            ]]
        );
    }
}
