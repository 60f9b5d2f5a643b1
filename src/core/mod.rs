pub mod aggregate;
pub mod config;
pub mod dispatching;
pub mod harvester;
mod errors;
mod types;

pub use aggregate::{aggregate, ResultAggregator};
pub use config::HarvestConfig;
pub use dispatching::Dispatcher;
pub use errors::{
    ConfigError, ExtractError, FetchError, HarvestError, HarvestResult, ListingError,
};
pub use harvester::{scrape, scrape_blocking, Harvester};
pub use types::{
    AggregateResult, FetchOutcome, PageFailure, PageOutcome, ProductUrl, Summary, VariantRecord,
};
