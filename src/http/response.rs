use chrono::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::core::ProductUrl;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: ProductUrl,
    /// URL after redirects.
    pub final_url: Url,
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub elapsed: Duration,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
