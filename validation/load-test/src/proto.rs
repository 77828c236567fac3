//! Wire messages for the `planner.PathPlanner` service.
//!
//! Mirrors `proto/planner.proto`. The messages are declared by hand with
//! `prost` derives so the crate builds without `protoc`.

/// Fully-qualified gRPC path of the `Plan` RPC.
pub const PLAN_PATH: &str = "/planner.PathPlanner/Plan";

/// Flattened CHW observation tensor.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Observation {
    #[prost(float, repeated, tag = "1")]
    pub data: Vec<f32>,
    #[prost(int32, tag = "2")]
    pub channels: i32,
    #[prost(int32, tag = "3")]
    pub height: i32,
    #[prost(int32, tag = "4")]
    pub width: i32,
}

impl Observation {
    /// Number of samples the shape metadata calls for.
    pub fn expected_len(&self) -> usize {
        [self.channels, self.height, self.width]
            .iter()
            .map(|d| usize::try_from(*d).unwrap_or(0))
            .fold(1, usize::saturating_mul)
    }

    /// True when `data.len()` matches `channels * height * width`.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.expected_len()
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlanRequest {
    #[prost(int32, tag = "1")]
    pub robot_id: i32,
    #[prost(message, optional, tag = "2")]
    pub obs: Option<Observation>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlanResponse {
    #[prost(float, repeated, tag = "1")]
    pub action: Vec<f32>,
    #[prost(bool, tag = "2")]
    pub safe: bool,
}
