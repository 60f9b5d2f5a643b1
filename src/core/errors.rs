use std::time::Duration;
use thiserror::Error;

/// Per-page failure. Never aborts a run; it ends up as `FetchOutcome::Failure`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected HTTP status: {status}")]
    Status { status: u16 },

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status {
                status: status.as_u16(),
            },
            None => FetchError::Network(err.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Product title not found")]
    MissingTitle,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No product URLs to scrape")]
    NoUrls,

    #[error("Concurrency must be greater than 0, got {0}")]
    InvalidConcurrency(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("URL {last_url} did not match {pattern} after {attempts} attempts")]
    UrlMismatch {
        attempts: usize,
        pattern: String,
        last_url: String,
    },

    #[error("Listing page did not settle within {0:?}")]
    Timeout(Duration),
}

/// Errors that abort a whole call.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("URL parsing error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header: {0}")]
    Header(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HarvestResult<T> = Result<T, HarvestError>;
