//! Synthetic observation payload generation.

use crate::config::ObservationShape;
use crate::proto::{Observation, PlanRequest};
use rand::prelude::*;

/// Golden-ratio increment used to spread per-request seeds.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Generates random observation tensors.
///
/// Each generator owns its RNG, so nothing is shared between workers. The
/// dispatcher derives one generator per request from the run seed, which keeps
/// payload content reproducible independent of completion order.
pub struct PayloadGenerator {
    rng: StdRng,
}

impl PayloadGenerator {
    /// Create a generator around an explicit RNG.
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Create a seeded generator for reproducible payloads.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Create a generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Derive the generator for one request index of a run.
    pub fn for_request(run_seed: u64, index: u64) -> Self {
        Self::from_seed(run_seed.wrapping_add(index.wrapping_mul(SEED_STRIDE)))
    }

    /// Generate a `channels x height x width` observation with samples drawn
    /// uniformly from [-1, 1).
    ///
    /// Dimensions use the wire type. A non-positive dimension yields an empty
    /// tensor, so `data.len()` always equals [`Observation::expected_len`].
    pub fn generate(&mut self, channels: i32, height: i32, width: i32) -> Observation {
        let mut obs = Observation {
            data: Vec::new(),
            channels,
            height,
            width,
        };
        obs.data = (0..obs.expected_len())
            .map(|_| self.rng.gen_range(-1.0f32..1.0))
            .collect();
        obs
    }

    /// Build a complete `Plan` request for `robot_id`.
    pub fn request(&mut self, robot_id: i32, shape: &ObservationShape) -> PlanRequest {
        PlanRequest {
            robot_id,
            obs: Some(self.generate(shape.channels, shape.height, shape.width)),
        }
    }
}
