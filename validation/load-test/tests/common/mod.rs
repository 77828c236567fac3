//! Deterministic `PlanClient` double shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use plan_load_test::proto::{PlanRequest, PlanResponse};
use plan_load_test::{ClientError, PlanClient};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock planner that records every call it sees.
#[derive(Default)]
pub struct MockPlanClient {
    /// Simulated service time per call.
    pub delay: Duration,
    /// Fail calls whose `robot_id` is a multiple of this value.
    pub fail_every: Option<i32>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<i32>>,
    checksums: Mutex<HashMap<i32, f64>>,
}

impl MockPlanClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_every(mut self, n: i32) -> Self {
        self.fail_every = Some(n);
        self
    }

    /// Highest number of calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Robot ids seen, sorted.
    pub fn sorted_calls(&self) -> Vec<i32> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort_unstable();
        calls
    }

    /// Sum of payload samples per robot id.
    pub fn checksums(&self) -> HashMap<i32, f64> {
        self.checksums.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanClient for MockPlanClient {
    async fn call(
        &self,
        request: PlanRequest,
        timeout: Duration,
    ) -> Result<PlanResponse, ClientError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().unwrap().push(request.robot_id);

        let result = match request.obs {
            None => Err(ClientError::Status {
                code: tonic::Code::InvalidArgument,
                message: "request has nil observation".to_string(),
            }),
            Some(obs) if !obs.is_well_formed() || obs.data.is_empty() => {
                Err(ClientError::Status {
                    code: tonic::Code::InvalidArgument,
                    message: format!("wrong data length: got {}", obs.data.len()),
                })
            }
            Some(obs) => {
                let sum: f64 = obs.data.iter().map(|v| *v as f64).sum();
                self.checksums.lock().unwrap().insert(request.robot_id, sum);

                if self.delay > timeout {
                    tokio::time::sleep(timeout).await;
                    Err(ClientError::Timeout(timeout))
                } else {
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    match self.fail_every {
                        Some(n) if request.robot_id % n == 0 => Err(ClientError::Status {
                            code: tonic::Code::Unavailable,
                            message: format!("robot {} rejected", request.robot_id),
                        }),
                        _ => Ok(PlanResponse {
                            action: vec![0.1, 0.2, 0.3],
                            safe: true,
                        }),
                    }
                }
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
