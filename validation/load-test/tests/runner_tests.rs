//! Dispatcher tests against a mock planner.

mod common;

use common::MockPlanClient;
use plan_load_test::{summarize, LoadRunner, ObservationShape, TestConfig};
use std::sync::Arc;
use std::time::Duration;

fn config(requests: u64, concurrency: u32) -> TestConfig {
    TestConfig {
        requests,
        concurrency,
        observation: ObservationShape {
            channels: 3,
            height: 8,
            width: 8,
        },
        seed: Some(2024),
        ..Default::default()
    }
}

// ============================================================================
// Exactly-once dispatch
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_outcome_count_matches_requests() {
    for (requests, concurrency) in [(0, 1), (1, 1), (7, 1), (25, 4), (10, 50), (250, 16)] {
        let client = Arc::new(MockPlanClient::new());
        let runner = LoadRunner::new(&config(requests, concurrency));
        let result = runner.run(client.clone()).await.unwrap();

        assert_eq!(
            result.outcomes.len() as u64,
            requests,
            "N={} C={}",
            requests,
            concurrency
        );
        assert!(result.outcomes.iter().all(|o| o.latency_ms >= 0.0));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_robot_id_called_once() {
    let client = Arc::new(MockPlanClient::new());
    let runner = LoadRunner::new(&config(300, 12));
    let result = runner.run(client.clone()).await.unwrap();

    let expected: Vec<i32> = (0..300).collect();
    assert_eq!(client.sorted_calls(), expected);

    let mut indices: Vec<u64> = result.outcomes.iter().map(|o| o.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..300).collect::<Vec<u64>>());
}

// ============================================================================
// Concurrency bound
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_never_exceeds_concurrency() {
    let client = Arc::new(MockPlanClient::new().with_delay(Duration::from_millis(20)));
    let runner = LoadRunner::new(&config(40, 5));
    runner.run(client.clone()).await.unwrap();

    assert!(client.max_in_flight() <= 5);
    assert!(client.max_in_flight() > 1, "calls never overlapped");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_one_is_sequential() {
    let client = Arc::new(MockPlanClient::new().with_delay(Duration::from_millis(2)));
    let runner = LoadRunner::new(&config(20, 1));
    runner.run(client.clone()).await.unwrap();

    assert_eq!(client.max_in_flight(), 1);
}

// ============================================================================
// Failure capture
// ============================================================================

#[tokio::test]
async fn test_failures_do_not_abort_run() {
    let client = Arc::new(MockPlanClient::new().failing_every(3));
    let runner = LoadRunner::new(&config(30, 4));
    let result = runner.run(client).await.unwrap();

    assert_eq!(result.outcomes.len(), 30);
    let failed: Vec<_> = result.outcomes.iter().filter(|o| !o.success).collect();
    // robot ids 0, 3, ..., 27
    assert_eq!(failed.len(), 10);
    for outcome in &failed {
        assert_eq!(outcome.index % 3, 0);
        let error = outcome.error.as_deref().unwrap();
        assert!(error.contains("Unavailable"), "unexpected error: {}", error);
    }
    assert!(result
        .outcomes
        .iter()
        .filter(|o| o.success)
        .all(|o| o.error.is_none()));
}

#[tokio::test]
async fn test_timeouts_recorded_as_failures() {
    let client = Arc::new(MockPlanClient::new().with_delay(Duration::from_secs(5)));
    let mut config = config(6, 3);
    config.timeout_secs = 0.05;
    let runner = LoadRunner::new(&config);
    let result = runner.run(client).await.unwrap();

    assert_eq!(result.outcomes.len(), 6);
    for outcome in &result.outcomes {
        assert!(!outcome.success);
        assert!(outcome
            .error
            .as_deref()
            .unwrap()
            .starts_with("deadline exceeded"));
        assert!(outcome.latency_ms >= 40.0);
    }

    let stats = summarize(&result);
    assert!(stats.latency.is_none());
    assert_eq!(stats.error_samples.len(), 5);
}

// ============================================================================
// Payloads
// ============================================================================

#[tokio::test]
async fn test_payloads_are_well_formed() {
    // The mock rejects malformed observations, so all-success means well-formed
    let client = Arc::new(MockPlanClient::new());
    let runner = LoadRunner::new(&config(50, 8));
    let result = runner.run(client).await.unwrap();

    assert!(result.outcomes.iter().all(|o| o.success));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_seeded_runs_send_identical_payloads() {
    let first = Arc::new(MockPlanClient::new());
    let second = Arc::new(MockPlanClient::new());

    LoadRunner::new(&config(40, 7)).run(first.clone()).await.unwrap();
    LoadRunner::new(&config(40, 2)).run(second.clone()).await.unwrap();

    assert_eq!(first.checksums(), second.checksums());
}

#[tokio::test]
async fn test_different_seeds_send_different_payloads() {
    let first = Arc::new(MockPlanClient::new());
    let second = Arc::new(MockPlanClient::new());

    let mut other = config(10, 2);
    other.seed = Some(7);

    LoadRunner::new(&config(10, 2)).run(first.clone()).await.unwrap();
    LoadRunner::new(&other).run(second.clone()).await.unwrap();

    assert_ne!(first.checksums(), second.checksums());
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_then_summarize() {
    let client = Arc::new(
        MockPlanClient::new()
            .with_delay(Duration::from_millis(1))
            .failing_every(10),
    );
    let runner = LoadRunner::new(&config(200, 20));
    let result = runner.run(client).await.unwrap();
    let stats = summarize(&result);

    assert_eq!(stats.total_requests, 200);
    assert_eq!(stats.failed_requests, 20);
    assert_eq!(
        stats.successful_requests + stats.failed_requests,
        stats.total_requests
    );
    assert!(stats.requests_per_second > 0.0);

    let latency = stats.latency.as_ref().unwrap();
    assert!(latency.min >= 1.0);
    assert!(latency.p50 <= latency.p90);
    assert!(latency.p90 <= latency.p95);
    assert!(latency.p95 <= latency.p99);
    assert!(latency.p99 <= latency.max);

    assert_eq!(summarize(&result), stats);
}
