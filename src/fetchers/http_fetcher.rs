use async_trait::async_trait;
use chrono::Utc;
use log::{debug, trace, warn};
use reqwest::{header, Client, ClientBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::PageFetcher;
use crate::core::{FetchError, HarvestConfig, HarvestError, HarvestResult, ProductUrl};
use crate::{HttpResponse, StatsTracker};

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
    stats: Arc<StatsTracker>,
}

impl HttpFetcher {
    pub fn new() -> HarvestResult<Self> {
        Self::from_config(&HarvestConfig::default())
    }

    pub fn from_config(config: &HarvestConfig) -> HarvestResult<Self> {
        let mut header_map = header::HeaderMap::new();
        for (key, value) in &config.headers {
            let name = header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| HarvestError::Header(e.to_string()))?;
            let value =
                header::HeaderValue::from_str(value).map_err(|e| HarvestError::Header(e.to_string()))?;
            header_map.insert(name, value);
        }

        // default_headers goes last so a configured user-agent header wins
        let mut builder = ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .default_headers(header_map);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            timeout: config.request_timeout,
            stats: Arc::new(StatsTracker::new()),
        })
    }

    fn extract_headers(response: &reqwest::Response) -> HashMap<String, String> {
        response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|val| (k.to_string(), val.to_string())))
            .collect()
    }

    fn classify(&self, url: &ProductUrl, err: reqwest::Error) -> FetchError {
        let error = match self.timeout {
            Some(timeout) if err.is_timeout() => {
                self.stats.record_error("timeout");
                FetchError::Timeout(timeout)
            }
            _ => {
                self.stats
                    .record_error(if err.is_connect() { "connect" } else { "network" });
                FetchError::from(err)
            }
        };
        warn!("Request to {} failed: {}", url, error);
        error
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &ProductUrl) -> Result<HttpResponse, FetchError> {
        debug!("Fetching URL: {}", url);
        let timestamp = Utc::now();
        let start = Instant::now();

        let response = match self.client.get(url.as_url().clone()).send().await {
            Ok(response) => response,
            Err(e) => return Err(self.classify(url, e)),
        };

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = Self::extract_headers(&response);

        let raw_body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.classify(url, e)),
        };
        let elapsed = start.elapsed();
        self.stats.record_request(status, raw_body.len(), elapsed);

        // invalid UTF-8 still leaves usable markup
        let response = HttpResponse {
            url: url.clone(),
            final_url,
            status,
            headers,
            body: String::from_utf8_lossy(&raw_body).into_owned(),
            timestamp,
            elapsed,
        };

        if !response.is_success() {
            warn!("Request to {} returned status {}", url, status);
            return Err(FetchError::Status { status });
        }

        debug!(
            "Received response: url={}, status={}, body_length={}, elapsed={:?}",
            response.final_url,
            status,
            response.body.len(),
            elapsed
        );
        trace!("Response body for {}: {}", url, response.body);

        Ok(response)
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
