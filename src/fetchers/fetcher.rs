use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{FetchError, ProductUrl};
use crate::{HttpResponse, StatsTracker};

/// Retrieves the raw markup of one page.
///
/// Exactly one outbound request per call and no retries: a failed attempt is
/// reported as a `FetchError` and the caller decides what to do with it.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &ProductUrl) -> Result<HttpResponse, FetchError>;
    fn box_clone(&self) -> Box<dyn PageFetcher>;
    fn stats(&self) -> &StatsTracker;
    fn set_stats(&mut self, stats: Arc<StatsTracker>);
}
