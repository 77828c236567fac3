//! Load testing framework for the PathPlanner gRPC service.
//!
//! This crate provides tools to:
//! - Generate random observation payloads
//! - Dispatch `Plan` calls with a fixed concurrency bound
//! - Compute latency and throughput statistics over a completed run
//! - Output results in multiple formats (console, JSON, CSV)

pub mod client;
pub mod config;
pub mod generator;
pub mod metrics;
pub mod proto;
pub mod report;
pub mod runner;

pub use client::{ClientError, GrpcPlanClient, PlanClient};
pub use config::{ObservationShape, TestConfig};
pub use generator::PayloadGenerator;
pub use metrics::{summarize, LatencySummary, StatsReport};
pub use report::{OutputFormat, ResultsReport};
pub use runner::{LoadRunner, RequestOutcome, RunResult};
