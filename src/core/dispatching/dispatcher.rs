use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::spawn;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::core::{
    ConfigError, FetchError, FetchOutcome, HarvestResult, PageOutcome, ProductUrl,
};
use crate::fetchers::PageFetcher;
use crate::parser::RecordExtractor;

/// Fans product URLs out to at most `concurrency` page tasks.
///
/// Every dispatched URL yields exactly one `PageOutcome`. Errors from the
/// fetch or extract stage, and panics inside a task, are turned into
/// `FetchOutcome::Failure` for that URL only.
pub struct Dispatcher {
    fetcher: Box<dyn PageFetcher>,
    extractor: Arc<dyn RecordExtractor>,
    concurrency: usize,
    cancel: CancellationToken,
}

/// Aborts a page task whose outcome is no longer awaited.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl Dispatcher {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        extractor: Arc<dyn RecordExtractor>,
        concurrency: usize,
    ) -> HarvestResult<Self> {
        if concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(concurrency).into());
        }

        Ok(Self {
            fetcher,
            extractor,
            concurrency,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs until every URL has an outcome, or until cancellation stops
    /// dispatch and the tasks already started have finished.
    pub async fn run(&self, urls: Vec<ProductUrl>) -> Vec<PageOutcome> {
        let total = urls.len();
        let mut pending: VecDeque<ProductUrl> = urls.into();
        let mut in_flight = FuturesUnordered::new();
        let mut outcomes = Vec::with_capacity(total);

        info!(
            "Dispatching {} URLs with concurrency {}",
            total, self.concurrency
        );

        while !pending.is_empty() {
            if self.cancel.is_cancelled() {
                info!(
                    "Cancellation requested, {} URLs left undispatched",
                    pending.len()
                );
                break;
            }

            if in_flight.len() >= self.concurrency {
                debug!(
                    "Reached concurrent request limit {}, waiting for slot",
                    self.concurrency
                );
                if let Some(outcome) = in_flight.next().await {
                    Self::collect(outcome, &mut outcomes);
                }
                continue;
            }

            if let Some(url) = pending.pop_front() {
                debug!("Dispatching URL: {}", url);
                in_flight.push(self.spawn_page(url));
            }
        }

        while let Some(outcome) = in_flight.next().await {
            Self::collect(outcome, &mut outcomes);
        }

        info!(
            "Dispatch finished: {} of {} URLs processed, {} failed",
            outcomes.len(),
            total,
            outcomes.iter().filter(|o| o.outcome.is_failure()).count()
        );
        outcomes
    }

    fn collect(outcome: PageOutcome, outcomes: &mut Vec<PageOutcome>) {
        if let FetchOutcome::Failure(error) = &outcome.outcome {
            warn!("Failed to scrape {}: {}", outcome.url, error);
        }
        outcomes.push(outcome);
    }

    fn spawn_page(&self, url: ProductUrl) -> impl Future<Output = PageOutcome> {
        let fetcher = self.fetcher.box_clone();
        let extractor = Arc::clone(&self.extractor);
        let task_url = url.clone();

        let handle = spawn(async move {
            let outcome = match fetcher.fetch(&task_url).await {
                Ok(response) => match extractor.extract(&response.body, &task_url) {
                    Ok(records) => FetchOutcome::Records(records),
                    Err(e) => FetchOutcome::Failure(e.into()),
                },
                Err(e) => FetchOutcome::Failure(e),
            };
            PageOutcome {
                url: task_url,
                outcome,
            }
        });
        let guard = AbortOnDrop(handle.abort_handle());

        async move {
            let result = handle.await;
            drop(guard);
            match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Task error for {}: {}", url, e);
                    PageOutcome::failure(url, FetchError::Worker(e.to_string()))
                }
            }
        }
    }
}
