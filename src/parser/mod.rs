mod base;
pub mod variant_extractor;

pub use base::RecordExtractor;
pub use variant_extractor::{MissingTitlePolicy, SelectorSet, VariantExtractor};
