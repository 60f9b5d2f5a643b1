use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::PageFetcher;
use crate::core::{FetchError, ProductUrl};
use crate::{HttpResponse, StatsTracker};

/// Canned reply for one URL.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
    pub error: Option<FetchError>,
}

impl MockResponse {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: None,
            error: None,
        }
    }

    /// Product page laid out for the default `SelectorSet`.
    pub fn product(name: &str, variants: &[&str]) -> Self {
        let options: String = variants
            .iter()
            .enumerate()
            .map(|(i, v)| format!(r#"<option data-product-attribute-value="{}">{}</option>"#, i, v))
            .collect();
        let select = if variants.is_empty() {
            String::new()
        } else {
            format!(
                r#"<select class="form-select form-select--small form-select--alt">{}</select>"#,
                options
            )
        };

        Self::html(format!(
            r#"<html><body><h1 class="productView-title">{}</h1>{}</body></html>"#,
            name, select
        ))
    }

    pub fn failure(error: FetchError) -> Self {
        Self {
            status: 0,
            body: String::new(),
            delay: None,
            error: Some(error),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// In-memory `PageFetcher` serving canned responses keyed by URL.
///
/// Unknown URLs answer with a network error. Clones share their counters.
#[derive(Clone)]
pub struct MockFetcher {
    responses: Arc<HashMap<String, MockResponse>>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    stats: Arc<StatsTracker>,
}

impl MockFetcher {
    pub fn new(responses: Vec<(&str, MockResponse)>) -> Self {
        Self {
            responses: Arc::new(
                responses
                    .into_iter()
                    .map(|(url, response)| (url.to_string(), response))
                    .collect(),
            ),
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            stats: Arc::new(StatsTracker::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of `fetch` calls that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &ProductUrl) -> Result<HttpResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let response = self.responses.get(url.as_str()).cloned();
        if let Some(delay) = response.as_ref().and_then(|r| r.delay) {
            sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = match response {
            Some(response) => response,
            None => {
                self.stats.record_error("network");
                return Err(FetchError::Network(format!("no mock response for {}", url)));
            }
        };
        if let Some(error) = response.error {
            self.stats.record_error("network");
            return Err(error);
        }

        let elapsed = response.delay.unwrap_or_default();
        self.stats
            .record_request(response.status, response.body.len(), elapsed);
        let page = HttpResponse {
            url: url.clone(),
            final_url: url.as_url().clone(),
            status: response.status,
            headers: HashMap::new(),
            body: response.body,
            timestamp: Utc::now(),
            elapsed,
        };
        if !page.is_success() {
            return Err(FetchError::Status {
                status: page.status,
            });
        }

        Ok(page)
    }

    fn box_clone(&self) -> Box<dyn PageFetcher> {
        Box::new(self.clone())
    }

    fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.stats = stats;
    }
}
