use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use crate::parser::{MissingTitlePolicy, SelectorSet};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub concurrency: usize,
    pub max_urls: Option<usize>,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    pub selectors: SelectorSet,
    pub missing_title: MissingTitlePolicy,
}

/// Available hardware parallelism, never zero.
pub fn default_concurrency() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(FALLBACK_CONCURRENCY)
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_urls: None,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            selectors: SelectorSet::default(),
            missing_title: MissingTitlePolicy::default(),
        }
    }
}

impl HarvestConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = Some(max_urls);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_headers(mut self, headers: Vec<(&str, &str)>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_selectors(mut self, selectors: SelectorSet) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_missing_title(mut self, policy: MissingTitlePolicy) -> Self {
        self.missing_title = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_concurrency_is_bounded() {
        let config = HarvestConfig::default();
        assert!(config.concurrency >= 1);
        assert_eq!(config.max_urls, None);
        assert_eq!(config.request_timeout, Some(DEFAULT_REQUEST_TIMEOUT));
    }

    #[test]
    fn test_builder_overrides() {
        let config = HarvestConfig::default()
            .with_concurrency(8)
            .with_max_urls(10)
            .with_request_timeout(None)
            .with_headers(vec![("Accept-Language", "en-US")])
            .with_missing_title(MissingTitlePolicy::Fail);

        assert_eq!(config.concurrency, 8);
        assert_eq!(config.max_urls, Some(10));
        assert_eq!(config.request_timeout, None);
        assert_eq!(
            config.headers,
            vec![("Accept-Language".to_string(), "en-US".to_string())]
        );
        assert_eq!(config.missing_title, MissingTitlePolicy::Fail);
    }
}
