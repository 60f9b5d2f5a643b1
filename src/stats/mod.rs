use chrono::{DateTime, Utc};
use log::info;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_requests: usize,
    /// Requests that produced a status line; the average is taken over these.
    pub timed_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub bytes_downloaded: usize,
    pub status_codes: HashMap<u16, usize>,
    pub error_reasons: HashMap<String, usize>,
    pub average_response_time: f64, // in milliseconds
}

impl ScrapingStats {
    fn starting_now() -> Self {
        Self {
            start_time: Utc::now(),
            end_time: None,
            total_requests: 0,
            timed_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            bytes_downloaded: 0,
            status_codes: HashMap::new(),
            error_reasons: HashMap::new(),
            average_response_time: 0.0,
        }
    }
}

/// Request-level counters shared by every fetch of a run.
#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScrapingStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScrapingStats::starting_now())),
        }
    }

    /// Clears every counter and restarts the clock. Clones see the reset.
    pub fn restart(&self) {
        *self.stats.write() = ScrapingStats::starting_now();
    }

    pub fn record_request(&self, status: u16, size: usize, elapsed: Duration) {
        let mut stats = self.stats.write();
        stats.total_requests += 1;
        stats.timed_requests += 1;

        if (200..300).contains(&status) {
            stats.successful_requests += 1;
        } else {
            stats.failed_requests += 1;
        }

        *stats.status_codes.entry(status).or_insert(0) += 1;
        stats.bytes_downloaded += size;

        let current_total = stats.average_response_time * (stats.timed_requests - 1) as f64;
        let new_duration = elapsed.as_secs_f64() * 1000.0;
        stats.average_response_time = (current_total + new_duration) / stats.timed_requests as f64;
    }

    /// A request that never produced a status line (connection refused, timeout).
    pub fn record_error(&self, reason: &str) {
        let mut stats = self.stats.write();
        stats.total_requests += 1;
        stats.failed_requests += 1;
        *stats.error_reasons.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.stats.read().clone()
    }

    pub fn log_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        info!("Scraping statistics:");
        info!("  Duration: {} seconds", duration.num_seconds());
        info!("  Total requests: {}", stats.total_requests);
        info!("  Successful requests: {}", stats.successful_requests);
        info!("  Failed requests: {}", stats.failed_requests);
        info!(
            "  Data downloaded: {:.2} MB",
            stats.bytes_downloaded as f64 / 1_000_000.0
        );
        info!("  Average response time: {:.2}ms", stats.average_response_time);

        for (code, count) in &stats.status_codes {
            info!("  Status {}: {}", code, count);
        }
        for (reason, count) in &stats.error_reasons {
            info!("  Error {}: {}", reason, count);
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
