//! gRPC client for the `PathPlanner` service.
//!
//! The dispatcher only sees the [`PlanClient`] trait, so tests can swap the
//! network call for a deterministic double.

use crate::config::TestConfig;
use crate::proto::{PlanRequest, PlanResponse, PLAN_PATH};
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tracing::info;

/// Failure of a single `Plan` call.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The server answered with a non-OK gRPC status.
    #[error("status: {code:?}, message: {message:?}")]
    Status { code: tonic::Code, message: String },

    /// The call did not finish within its deadline.
    #[error("deadline exceeded after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The channel could not carry the call.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<tonic::Status> for ClientError {
    fn from(status: tonic::Status) -> Self {
        Self::Status {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

/// One outbound `Plan` call.
///
/// Implementations are shared by every worker of a run and must tolerate
/// concurrent calls.
#[async_trait]
pub trait PlanClient: Send + Sync {
    async fn call(
        &self,
        request: PlanRequest,
        timeout: Duration,
    ) -> Result<PlanResponse, ClientError>;
}

/// [`PlanClient`] over a multiplexed tonic channel.
#[derive(Debug, Clone)]
pub struct GrpcPlanClient {
    channel: Channel,
}

impl GrpcPlanClient {
    /// Connect to the configured endpoint.
    ///
    /// Fails if the URI is invalid or the server is unreachable within the
    /// connect timeout.
    pub async fn connect(config: &TestConfig) -> anyhow::Result<Self> {
        let uri = config.endpoint();
        let endpoint = Endpoint::from_shared(uri.clone())
            .with_context(|| format!("invalid endpoint URI: {}", uri))?
            .connect_timeout(config.connect_timeout());

        let channel = endpoint
            .connect()
            .await
            .with_context(|| format!("failed to connect to {}", uri))?;

        info!(endpoint = %uri, "Connected to planner service");
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl PlanClient for GrpcPlanClient {
    async fn call(
        &self,
        request: PlanRequest,
        timeout: Duration,
    ) -> Result<PlanResponse, ClientError> {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        let mut request = tonic::Request::new(request);
        request.set_timeout(timeout);

        let call = async move {
            grpc.ready()
                .await
                .map_err(|e| ClientError::Transport(e.to_string()))?;

            let codec: ProstCodec<PlanRequest, PlanResponse> = ProstCodec::default();
            let path = PathAndQuery::from_static(PLAN_PATH);
            let response = grpc.unary(request, path, codec).await?;
            Ok::<_, ClientError>(response.into_inner())
        };

        // grpc-timeout is advisory for the server; enforce the deadline locally too
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }
}
