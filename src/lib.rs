pub mod core;
pub mod fetchers;
pub mod http;
pub mod listing;
pub mod parser;
pub mod stats;

pub use crate::core::{scrape, scrape_blocking, Dispatcher, Harvester, HarvestConfig};
pub use crate::core::{
    AggregateResult, FetchError, FetchOutcome, HarvestError, HarvestResult, PageOutcome,
    ProductUrl, Summary, VariantRecord,
};
pub use fetchers::{HttpFetcher, PageFetcher};
pub use http::HttpResponse;
pub use listing::{HtmlListingRenderer, ListingRenderer};
pub use parser::{RecordExtractor, VariantExtractor};
pub use stats::StatsTracker;
