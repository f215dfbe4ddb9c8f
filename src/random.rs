//! Seedable random streams.
//!
//! Every neuron owns an independent [`RandomSource`], so that its draws do not depend on the order in
//! which the other neurons are evaluated. All streams of a run derive from a single root seed: the
//! root seed selects the ChaCha key and the neuron id selects the ChaCha stream.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Stream reserved for the network-level draws, e.g., the initial firing pattern.
pub const NETWORK_STREAM: u64 = u64::MAX;

/// A uniform/Gaussian random source backed by a ChaCha8 stream.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Create the random source of the given stream for the given root seed.
    pub fn new(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        RandomSource { rng }
    }

    /// Create the random source of a neuron.
    pub fn for_neuron(seed: u64, neuron_id: usize) -> Self {
        Self::new(seed, neuron_id as u64)
    }

    /// Create the random source used for network-level draws.
    pub fn for_network(seed: u64) -> Self {
        Self::new(seed, NETWORK_STREAM)
    }

    /// Returns a sample from the uniform distribution on `[low, high)`.
    /// A degenerate interval (`low == high`) always returns `low`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.rng.gen::<f64>()
    }

    /// Returns a sample from the standard normal distribution.
    pub fn gaussian(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Returns `true` with probability `p`.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.uniform(0.0, 1.0) < p
    }
}
