//! Configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound on samples per observation (64 MiB of f32).
const MAX_OBSERVATION_SAMPLES: u64 = 16 * 1024 * 1024;

/// Main test configuration, loaded from a YAML scenario or built from CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Total number of `Plan` calls to issue.
    #[serde(default = "default_requests")]
    pub requests: u64,
    /// Maximum number of calls in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    #[serde(default)]
    pub observation: ObservationShape,
    /// Per-call deadline.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: f64,
    #[serde(default)]
    pub seed: Option<u64>, // Optional RNG seed for reproducible payloads
}

/// Shape of the generated observation tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationShape {
    pub channels: i32,
    pub height: i32,
    pub width: i32,
}

impl Default for ObservationShape {
    fn default() -> Self {
        Self {
            channels: 3,
            height: 64,
            width: 64,
        }
    }
}

impl ObservationShape {
    /// Number of f32 samples in one observation.
    pub fn samples(&self) -> u64 {
        [self.channels, self.height, self.width]
            .iter()
            .map(|d| u64::try_from(*d).unwrap_or(0))
            .fold(1, u64::saturating_mul)
    }
}

fn default_name() -> String {
    "plan".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    50051
}

fn default_requests() -> u64 {
    2000
}

fn default_concurrency() -> u32 {
    50
}

fn default_timeout_secs() -> f64 {
    10.0
}

fn default_connect_timeout_secs() -> f64 {
    5.0
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            host: default_host(),
            port: default_port(),
            requests: default_requests(),
            concurrency: default_concurrency(),
            observation: ObservationShape::default(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            seed: None,
        }
    }
}

impl TestConfig {
    /// Load configuration from YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TestConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("host must not be empty");
        }
        if self.port == 0 {
            anyhow::bail!("port must be > 0");
        }
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be > 0");
        }
        // robot_id is an int32 on the wire
        if self.requests > i32::MAX as u64 + 1 {
            anyhow::bail!("requests must be <= {}", i32::MAX as u64 + 1);
        }
        let shape = &self.observation;
        if shape.channels <= 0 || shape.height <= 0 || shape.width <= 0 {
            anyhow::bail!(
                "observation dimensions must be > 0 (got {}x{}x{})",
                shape.channels,
                shape.height,
                shape.width
            );
        }
        if shape.samples() > MAX_OBSERVATION_SAMPLES {
            anyhow::bail!(
                "observation has {} samples, limit is {}",
                shape.samples(),
                MAX_OBSERVATION_SAMPLES
            );
        }
        if !(self.timeout_secs.is_finite() && self.timeout_secs > 0.0) {
            anyhow::bail!("timeout_secs must be > 0");
        }
        if !(self.connect_timeout_secs.is_finite() && self.connect_timeout_secs > 0.0) {
            anyhow::bail!("connect_timeout_secs must be > 0");
        }
        Ok(())
    }

    /// gRPC endpoint URI for the target.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.connect_timeout_secs)
    }
}
