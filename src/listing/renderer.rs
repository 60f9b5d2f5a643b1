use async_trait::async_trait;
use log::{debug, info, warn};
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use url::Url;

use crate::core::{HarvestError, HarvestResult, ListingError, ProductUrl};
use crate::fetchers::PageFetcher;
use crate::HttpResponse;

pub const DEFAULT_ITEM_SELECTOR: &str = "ul.productGrid > li";
pub const DEFAULT_LINK_SELECTOR: &str = "a";

/// Produces the ordered product URLs of a search or category page.
#[async_trait]
pub trait ListingRenderer: Send + Sync {
    async fn list(&self, search_url: &Url) -> HarvestResult<Vec<ProductUrl>>;
}

/// Bounds on waiting for a listing page to land on the expected URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub max_attempts: usize,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Lists products from server-rendered markup.
///
/// Each item matched by the item selector contributes the `href` of its first
/// link, resolved against the page URL. Pages that only render their grid
/// through scripts need a browser-backed `ListingRenderer` instead.
pub struct HtmlListingRenderer {
    fetcher: Box<dyn PageFetcher>,
    item_selector: Selector,
    link_selector: Selector,
    url_pattern: Option<Regex>,
    wait: WaitPolicy,
}

fn parse_selector(selector: &str) -> HarvestResult<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

impl HtmlListingRenderer {
    pub fn new(fetcher: Box<dyn PageFetcher>) -> HarvestResult<Self> {
        Ok(Self {
            fetcher,
            item_selector: parse_selector(DEFAULT_ITEM_SELECTOR)?,
            link_selector: parse_selector(DEFAULT_LINK_SELECTOR)?,
            url_pattern: None,
            wait: WaitPolicy::default(),
        })
    }

    pub fn with_selectors(mut self, item: &str, link: &str) -> HarvestResult<Self> {
        self.item_selector = parse_selector(item)?;
        self.link_selector = parse_selector(link)?;
        Ok(self)
    }

    /// Only accept the listing once its final URL matches `pattern`.
    pub fn with_url_pattern(mut self, pattern: &str) -> HarvestResult<Self> {
        self.url_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    async fn load(&self, search_url: &Url) -> HarvestResult<HttpResponse> {
        let url = ProductUrl::from(search_url.clone());
        match &self.url_pattern {
            None => Ok(self.fetcher.fetch(&url).await?),
            Some(pattern) => timeout(self.wait.timeout, self.poll_until_match(&url, pattern))
                .await
                .map_err(|_| ListingError::Timeout(self.wait.timeout))?,
        }
    }

    async fn poll_until_match(
        &self,
        url: &ProductUrl,
        pattern: &Regex,
    ) -> HarvestResult<HttpResponse> {
        let max_attempts = self.wait.max_attempts.max(1);
        let mut last_url = url.to_string();

        for attempt in 1..=max_attempts {
            let response = self.fetcher.fetch(url).await?;
            if pattern.is_match(response.final_url.as_str()) {
                debug!(
                    "Listing settled on {} after {} attempts",
                    response.final_url, attempt
                );
                return Ok(response);
            }

            debug!(
                "Listing at {} does not match {} (attempt {}/{})",
                response.final_url, pattern, attempt, max_attempts
            );
            last_url = response.final_url.to_string();
            if attempt < max_attempts {
                sleep(self.wait.interval).await;
            }
        }

        Err(ListingError::UrlMismatch {
            attempts: max_attempts,
            pattern: pattern.as_str().to_string(),
            last_url,
        }
        .into())
    }

    fn extract_links(&self, response: &HttpResponse) -> Vec<ProductUrl> {
        let document = Html::parse_document(&response.body);
        let mut links = Vec::new();

        for item in document.select(&self.item_selector) {
            let href = item
                .select(&self.link_selector)
                .next()
                .and_then(|link| link.value().attr("href"));
            let Some(href) = href else {
                debug!("Skipping listing item without a link");
                continue;
            };

            match response.final_url.join(href) {
                Ok(url) => links.push(ProductUrl::from(url)),
                Err(e) => warn!("Skipping invalid product link {}: {}", href, e),
            }
        }

        links
    }
}

#[async_trait]
impl ListingRenderer for HtmlListingRenderer {
    async fn list(&self, search_url: &Url) -> HarvestResult<Vec<ProductUrl>> {
        let response = self.load(search_url).await?;
        let links = self.extract_links(&response);
        info!("Found {} search results", links.len());
        Ok(links)
    }
}
