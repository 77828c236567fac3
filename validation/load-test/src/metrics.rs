//! Statistics over a completed run.

use crate::runner::RunResult;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

/// Percentiles reported for successful latencies.
pub const PERCENTILES: [f64; 4] = [50.0, 90.0, 95.0, 99.0];

/// Maximum number of failures kept for display.
pub const MAX_ERROR_SAMPLES: usize = 5;

/// Error messages are cut to this many characters.
pub const MAX_ERROR_CHARS: usize = 100;

/// Lowest histogram bucket edge, in microseconds.
const HISTOGRAM_FIRST_BUCKET_US: u64 = 1_000;

/// Summary of one run. Recomputable at any time from the [`RunResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
    pub failure_rate: f64,
    pub duration_secs: f64,
    pub requests_per_second: f64,

    /// Absent when no request succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencySummary>,

    pub error_samples: Vec<String>,
}

/// Latency distribution of successful requests (ms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent for a single sample.
    pub std_dev: Option<f64>,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub histogram: Vec<LatencyBucket>,
}

/// Count of latencies at or below `upper_ms` and above the previous bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyBucket {
    pub upper_ms: f64,
    pub count: u64,
}

/// Summarize a run.
pub fn summarize(run: &RunResult) -> StatsReport {
    let total = run.outcomes.len() as u64;
    let successes = run.outcomes.iter().filter(|o| o.success).count() as u64;
    let failures = total - successes;

    let (success_rate, failure_rate) = if total > 0 {
        (
            100.0 * successes as f64 / total as f64,
            100.0 * failures as f64 / total as f64,
        )
    } else {
        (0.0, 0.0)
    };

    let duration_secs = run.elapsed.as_secs_f64();
    let rps = if duration_secs > f64::EPSILON {
        total as f64 / duration_secs
    } else {
        0.0
    };

    let mut latencies: Vec<f64> = run
        .outcomes
        .iter()
        .filter(|o| o.success)
        .map(|o| o.latency_ms)
        .collect();
    latencies.sort_by(f64::total_cmp);

    let error_samples = run
        .outcomes
        .iter()
        .filter(|o| !o.success)
        .take(MAX_ERROR_SAMPLES)
        .map(|o| truncate_chars(o.error.as_deref().unwrap_or(""), MAX_ERROR_CHARS))
        .collect();

    StatsReport {
        total_requests: total,
        successful_requests: successes,
        failed_requests: failures,
        success_rate,
        failure_rate,
        duration_secs,
        requests_per_second: rps,
        latency: LatencySummary::from_sorted(&latencies),
        error_samples,
    }
}

impl LatencySummary {
    /// Build from latencies sorted ascending. `None` if empty.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;

        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        let std_dev = (n > 1).then(|| {
            let sum_sq: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (n - 1) as f64).sqrt()
        });

        let [p50, p90, p95, p99] = PERCENTILES.map(|p| nearest_rank(sorted, p));

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev,
            p50,
            p90,
            p95,
            p99,
            histogram: log_histogram(sorted),
        })
    }
}

/// Nearest-rank percentile: `sorted[floor(n * p / 100)]`, clamped to the last
/// element. No interpolation. `sorted` must be non-empty.
pub fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    let idx = (n as f64 * percentile / 100.0).floor() as usize;
    sorted[idx.min(n - 1)]
}

/// Log-scale buckets doubling from 1 ms. Display only.
fn log_histogram(latencies: &[f64]) -> Vec<LatencyBucket> {
    let mut histogram = match Histogram::<u64>::new(3) {
        Ok(h) => h,
        Err(_) => return Vec::new(),
    };
    for &ms in latencies {
        histogram.saturating_record((ms * 1000.0).round().max(0.0) as u64);
    }

    histogram
        .iter_log(HISTOGRAM_FIRST_BUCKET_US, 2.0)
        .map(|v| LatencyBucket {
            upper_ms: v.value_iterated_to() as f64 / 1000.0,
            count: v.count_since_last_iteration(),
        })
        .collect()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
