use crate::core::{ExtractError, ProductUrl, VariantRecord};

/// Turns one page's markup into variant records.
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, markup: &str, url: &ProductUrl) -> Result<Vec<VariantRecord>, ExtractError>;
}
