//! Common test fixtures for load test tooling.
//!
//! This module provides pre-defined scenario files and latency sets that
//! represent common situations when characterizing a serving endpoint.

/// Scenario YAML snippets.
pub mod scenarios {
    /// Only the required shape; everything else falls back to defaults.
    pub const MINIMAL: &str = "name: minimal\n";

    /// Every field set explicitly.
    pub const FULL: &str = r#"name: staging-baseline
host: planner.staging.internal
port: 50052
requests: 5000
concurrency: 64
observation:
  channels: 3
  height: 64
  width: 64
timeout_secs: 10.0
connect_timeout_secs: 2.5
seed: 1234
"#;

    /// Syntactically valid but rejected by validation.
    pub const ZERO_CONCURRENCY: &str = "name: broken\nconcurrency: 0\n";

    /// Not YAML the config loader understands.
    pub const MALFORMED: &str = "name: [unterminated\n";
}

/// Well-known latency sets (ms).
pub mod latencies {
    /// Ten evenly spaced samples; nearest-rank p50 is 6, p90 and p99 are 10.
    pub const ONE_TO_TEN: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

    /// A fast majority with a slow tail.
    pub const LONG_TAIL: [f64; 10] = [2.0, 2.0, 2.0, 2.0, 2.0, 3.0, 3.0, 4.0, 50.0, 900.0];

    /// Single sample; standard deviation is undefined.
    pub const SINGLE: [f64; 1] = [12.5];
}
