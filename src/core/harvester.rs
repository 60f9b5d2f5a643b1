use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::aggregate::aggregate;
use super::dispatching::Dispatcher;
use super::{AggregateResult, ConfigError, HarvestConfig, HarvestResult, ProductUrl};
use crate::fetchers::{HttpFetcher, PageFetcher};
use crate::parser::{RecordExtractor, VariantExtractor};
use crate::StatsTracker;

/// Entry point of the pipeline: validates the input, dispatches every
/// product page and aggregates what comes back.
///
/// A harvester can run several times. Stats cover the latest run, and a
/// run that was cancelled leaves a fresh token behind for the next one.
pub struct Harvester {
    fetcher: Box<dyn PageFetcher>,
    extractor: Arc<dyn RecordExtractor>,
    config: HarvestConfig,
    stats: Arc<StatsTracker>,
    cancel: Mutex<CancellationToken>,
}

impl Harvester {
    pub fn new(fetcher: Box<dyn PageFetcher>, config: HarvestConfig) -> HarvestResult<Self> {
        info!("Initializing harvester");
        let stats = Arc::new(StatsTracker::new());
        let mut fetcher = fetcher;
        fetcher.set_stats(Arc::clone(&stats));

        let extractor = VariantExtractor::new(&config.selectors, config.missing_title)?;

        Ok(Self {
            fetcher,
            extractor: Arc::new(extractor),
            config,
            stats,
            cancel: Mutex::new(CancellationToken::new()),
        })
    }

    pub fn with_http(config: HarvestConfig) -> HarvestResult<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Self::new(Box::new(fetcher), config)
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Raising this token stops dispatching further URLs of the current or
    /// next run. Once a run has observed it, fetch a new one for later runs.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.lock().clone()
    }

    pub async fn scrape(&self, urls: Vec<ProductUrl>) -> HarvestResult<AggregateResult> {
        let mut urls = urls;
        if let Some(limit) = self.config.max_urls {
            if urls.len() > limit {
                info!("Limiting run to the first {} of {} URLs", limit, urls.len());
                urls.truncate(limit);
            }
        }

        if urls.is_empty() {
            return Err(ConfigError::NoUrls.into());
        }

        let cancel = self.cancel_token();
        let dispatcher = Dispatcher::new(
            self.fetcher.box_clone(),
            Arc::clone(&self.extractor),
            self.config.concurrency,
        )?
        .with_cancel_token(cancel.clone());

        self.stats.restart();
        debug!("Scraping {} product URLs", urls.len());
        let outcomes = dispatcher.run(urls).await;
        let result = aggregate(&outcomes);
        self.stats.finish();

        if cancel.is_cancelled() {
            *self.cancel.lock() = CancellationToken::new();
        }

        let summary = &result.summary;
        info!(
            "Scrape completed: {} records from {} URLs ({} with variants, {} empty, {} failed)",
            result.records.len(),
            summary.total_urls,
            summary.succeeded,
            summary.empty,
            summary.failed
        );
        Ok(result)
    }
}

/// Scrapes `urls` over HTTP with default settings and `concurrency` workers.
pub async fn scrape(urls: Vec<ProductUrl>, concurrency: usize) -> HarvestResult<AggregateResult> {
    let config = HarvestConfig::default().with_concurrency(concurrency);
    Harvester::with_http(config)?.scrape(urls).await
}

/// Blocking form of [`scrape`] for callers without a runtime.
pub fn scrape_blocking(
    urls: Vec<ProductUrl>,
    concurrency: usize,
) -> HarvestResult<AggregateResult> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(scrape(urls, concurrency))
}
