//! In-memory request metrics
//!
//! Counters are updated at the point of each request through the client's
//! [`RequestObserver`] seam, so totals are exact regardless of log level
//! or how many workers are running.

use crate::tracker::TrackedCounts;
use petstore_client::client::RequestObserver;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
struct MetricsInner {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    endpoint_requests: BTreeMap<&'static str, u64>,
    endpoint_errors: BTreeMap<&'static str, u64>,
    status_codes: BTreeMap<u16, u64>,
    total_duration: Duration,
}

/// Aggregated request counters for one simulation run.
#[derive(Debug, Default)]
pub struct Metrics {
    inner: Mutex<MetricsInner>,
}

/// Read-only copy of the counters at one point in time.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub endpoint_requests: BTreeMap<&'static str, u64>,
    pub endpoint_errors: BTreeMap<&'static str, u64>,
    pub status_codes: BTreeMap<u16, u64>,
    pub average_duration: Duration,
}

impl MetricsSnapshot {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / self.total_requests as f64 * 100.0
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, MetricsInner> {
        // Counter updates cannot panic, so a poisoned lock still holds
        // consistent data.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.locked();
        let average_duration = if inner.total_requests == 0 {
            Duration::ZERO
        } else {
            inner.total_duration / inner.total_requests as u32
        };
        MetricsSnapshot {
            total_requests: inner.total_requests,
            successful_requests: inner.successful_requests,
            failed_requests: inner.failed_requests,
            endpoint_requests: inner.endpoint_requests.clone(),
            endpoint_errors: inner.endpoint_errors.clone(),
            status_codes: inner.status_codes.clone(),
            average_duration,
        }
    }

    /// Human-readable end-of-run report.
    pub fn summary(&self, counts: &TrackedCounts) -> String {
        let snapshot = self.snapshot();
        let banner = "=".repeat(50);

        let mut report = String::new();
        let _ = writeln!(report, "{}", banner);
        let _ = writeln!(report, "PETSTORE TRAFFIC SIMULATION - SUMMARY REPORT");
        let _ = writeln!(report, "{}", banner);
        let _ = writeln!(report, "Total Requests: {}", snapshot.total_requests);
        let _ = writeln!(report, "Successful Requests: {}", snapshot.successful_requests);
        let _ = writeln!(report, "Failed Requests: {}", snapshot.failed_requests);
        let _ = writeln!(report, "Success Rate: {:.2}%", snapshot.success_rate());
        let _ = writeln!(
            report,
            "Average Request Duration: {:.4}s",
            snapshot.average_duration.as_secs_f64()
        );

        let _ = writeln!(report, "\nRequest Distribution by Endpoint:");
        for (endpoint, count) in &snapshot.endpoint_requests {
            let _ = writeln!(report, "  {}: {} requests", endpoint, count);
        }

        let _ = writeln!(report, "\nError Distribution by Endpoint:");
        for (endpoint, count) in &snapshot.endpoint_errors {
            let _ = writeln!(report, "  {}: {} errors", endpoint, count);
        }

        let _ = writeln!(report, "\nStatus Code Breakdown:");
        for (code, count) in &snapshot.status_codes {
            let _ = writeln!(report, "  {}: {} requests", code, count);
        }

        let _ = writeln!(report, "\nTracked Entities at End of Run:");
        let _ = writeln!(report, "  pets: {}", counts.pets);
        let _ = writeln!(report, "  users: {}", counts.users);
        let _ = writeln!(report, "  orders: {}", counts.orders);
        let _ = write!(report, "{}", banner);
        report
    }
}

impl RequestObserver for Metrics {
    fn record(&self, endpoint: &'static str, status: Option<u16>, success: bool, duration: Duration) {
        let mut inner = self.locked();
        inner.total_requests += 1;
        *inner.endpoint_requests.entry(endpoint).or_default() += 1;
        if let Some(code) = status {
            *inner.status_codes.entry(code).or_default() += 1;
        }
        if success {
            inner.successful_requests += 1;
        } else {
            inner.failed_requests += 1;
            *inner.endpoint_errors.entry(endpoint).or_default() += 1;
        }
        inner.total_duration += duration;
    }
}
