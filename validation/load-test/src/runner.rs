//! Request dispatch and load test orchestration.

use crate::client::PlanClient;
use crate::config::{ObservationShape, TestConfig};
use crate::generator::PayloadGenerator;
use crate::proto::PlanRequest;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Completed outcomes between progress notifications.
pub const PROGRESS_INTERVAL: usize = 100;

/// Result of a single `Plan` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    /// Request index, also sent as `robot_id`.
    pub index: u64,
    pub success: bool,
    /// Wall-clock time around the call, in milliseconds.
    pub latency_ms: f64,
    /// Present iff `success` is false.
    pub error: Option<String>,
}

impl RequestOutcome {
    pub fn success(index: u64, latency_ms: f64) -> Self {
        Self {
            index,
            success: true,
            latency_ms,
            error: None,
        }
    }

    pub fn failure(index: u64, latency_ms: f64, error: impl Into<String>) -> Self {
        Self {
            index,
            success: false,
            latency_ms,
            error: Some(error.into()),
        }
    }
}

/// All outcomes of one run, in completion order, plus its wall-clock duration.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub outcomes: Vec<RequestOutcome>,
    pub elapsed: Duration,
}

impl RunResult {
    pub fn new(outcomes: Vec<RequestOutcome>, elapsed: Duration) -> Self {
        Self { outcomes, elapsed }
    }
}

/// True when `completed` outcomes warrant a progress notification.
pub fn is_progress_milestone(completed: usize) -> bool {
    completed > 0 && completed % PROGRESS_INTERVAL == 0
}

/// `Progress: k/N (p%)` line for a milestone.
pub fn progress_line(completed: usize, total: u64) -> String {
    let percent = if total > 0 {
        100.0 * completed as f64 / total as f64
    } else {
        0.0
    };
    format!("Progress: {}/{} ({:.1}%)", completed, total, percent)
}

/// Receives progress milestones during a run.
///
/// Called with the outcome list locked, so milestones arrive in order.
/// Implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn milestone(&self, completed: usize, total: u64);
}

/// Writes milestone lines to stderr regardless of the log level.
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn milestone(&self, completed: usize, total: u64) {
        eprintln!("{}", progress_line(completed, total));
    }
}

/// Dispatches `requests` calls with at most `concurrency` in flight.
pub struct LoadRunner {
    requests: u64,
    concurrency: u32,
    shape: ObservationShape,
    timeout: Duration,
    seed: Option<u64>,
    show_progress: bool,
    progress: Arc<dyn ProgressSink>,
}

impl LoadRunner {
    /// Create a runner from a validated configuration.
    pub fn new(config: &TestConfig) -> Self {
        Self {
            requests: config.requests,
            concurrency: config.concurrency,
            shape: config.observation,
            timeout: config.timeout(),
            seed: config.seed,
            show_progress: false,
            progress: Arc::new(StderrProgress),
        }
    }

    /// Replace where progress milestones are reported.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Draw an interactive progress bar on stderr while running.
    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Run the load test.
    ///
    /// Returns once every request has produced an outcome. Call failures are
    /// recorded, never propagated; an error here means a worker task panicked.
    pub async fn run(&self, client: Arc<dyn PlanClient>) -> anyhow::Result<RunResult> {
        let total = self.requests;
        let seed = self.seed.unwrap_or_else(rand::random);

        info!(
            requests = total,
            concurrency = self.concurrency,
            timeout_secs = self.timeout.as_secs_f64(),
            "Starting load test"
        );

        let pb = self.progress_bar();

        // Shared state
        let semaphore = Arc::new(Semaphore::new(self.concurrency as usize));
        let outcomes = Arc::new(Mutex::new(Vec::with_capacity(total as usize)));
        let mut tasks = JoinSet::new();

        let start_time = Instant::now();

        for index in 0..total {
            // Acquire before spawning so at most `concurrency` tasks exist
            let permit = semaphore.clone().acquire_owned().await?;
            let client = Arc::clone(&client);
            let outcomes = Arc::clone(&outcomes);
            let pb = pb.clone();
            let progress = Arc::clone(&self.progress);
            let shape = self.shape;
            let timeout = self.timeout;

            tasks.spawn(async move {
                let request =
                    PayloadGenerator::for_request(seed, index).request(index as i32, &shape);
                let outcome = execute_request(client.as_ref(), index, request, timeout).await;
                drop(permit);

                let mut outcomes = outcomes.lock().await;
                outcomes.push(outcome);
                let completed = outcomes.len();
                pb.inc(1);
                if is_progress_milestone(completed) {
                    pb.suspend(|| progress.milestone(completed, total));
                }
                drop(outcomes);
            });
        }

        // Wait for all in-flight requests to complete
        while let Some(joined) = tasks.join_next().await {
            joined.context("request task panicked")?;
        }

        let elapsed = start_time.elapsed();
        pb.finish_and_clear();

        let outcomes = std::mem::take(&mut *outcomes.lock().await);
        info!(
            completed = outcomes.len(),
            elapsed_secs = elapsed.as_secs_f64(),
            "Load test complete"
        );

        Ok(RunResult::new(outcomes, elapsed))
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(self.requests);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec}) {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb
    }
}

/// Issue one call and time it. Never fails; errors land in the outcome.
async fn execute_request(
    client: &dyn PlanClient,
    index: u64,
    request: PlanRequest,
    timeout: Duration,
) -> RequestOutcome {
    let start = Instant::now();
    let result = client.call(request, timeout).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(_) => RequestOutcome::success(index, latency_ms),
        Err(e) => {
            debug!(robot_id = index, error = %e, "Plan call failed");
            RequestOutcome::failure(index, latency_ms, e.to_string())
        }
    }
}
