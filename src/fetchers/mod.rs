pub mod http_fetcher;
pub mod mock_fetcher;

mod fetcher;
pub use fetcher::PageFetcher;
pub use http_fetcher::HttpFetcher;
pub use mock_fetcher::{MockFetcher, MockResponse};
