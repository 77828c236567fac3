//! Latency series generators for statistics tests.
//!
//! These generators create predictable, verifiable latency patterns
//! that can be used across the test suite.

/// Creates the latencies `1.0, 2.0, ..., n` in milliseconds.
///
/// # Example
///
/// ```
/// use test_utils::ascending_latencies;
///
/// let latencies = ascending_latencies(10);
/// assert_eq!(latencies.len(), 10);
/// assert_eq!(latencies[0], 1.0);
/// assert_eq!(latencies[9], 10.0);
/// ```
pub fn ascending_latencies(n: usize) -> Vec<f64> {
    (1..=n).map(|v| v as f64).collect()
}

/// Creates `n` latencies scattered around `base_ms` by up to +/- `spread_ms`.
///
/// Uses a simple hash-based approach for reproducibility, so the same seed
/// always yields the same series. Values never go below zero.
pub fn jittered_latencies(n: usize, base_ms: f64, spread_ms: f64, seed: u32) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let hash = simple_hash(i as u32, seed);
            // Map to [-1, 1]
            let unit = (hash % 20_001) as f64 / 10_000.0 - 1.0;
            (base_ms + unit * spread_ms).max(0.0)
        })
        .collect()
}

/// Returns a deterministic permutation of `values`.
///
/// Useful for feeding unsorted input to code that must sort it.
pub fn shuffled(values: &[f64], seed: u32) -> Vec<f64> {
    let mut out = values.to_vec();
    for i in (1..out.len()).rev() {
        let j = simple_hash(i as u32, seed) as usize % (i + 1);
        out.swap(i, j);
    }
    out
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
