//! Mutation operators for network genomes
//!
//! Gaussian perturbation of individual weights, with an occasional full
//! replacement to escape flat regions.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::network::NetworkGenome;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for mutation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Probability that any single weight is perturbed
    pub rate: f64,
    /// Standard deviation of the perturbation
    pub sigma: f64,
    /// Probability that a perturbed weight is redrawn instead of nudged
    pub replace_rate: f64,
    /// Weights are clamped to `[-limit, limit]`
    pub weight_limit: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rate: 0.1,
            sigma: 0.3,
            replace_rate: 0.05,
            weight_limit: 5.0,
        }
    }
}

impl MutationConfig {
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }
}

// ============================================================================
// Core Mutation Function
// ============================================================================

/// Return a mutated copy of `genome`
///
/// # Arguments
/// * `genome` - Parent genome
/// * `config` - Mutation configuration
/// * `rng` - Random number generator
pub fn mutate<R: Rng>(genome: &NetworkGenome, config: &MutationConfig, rng: &mut R) -> NetworkGenome {
    let mut child = genome.clone();
    for weight in child.weights.iter_mut() {
        if !rng.gen_bool(config.rate.clamp(0.0, 1.0)) {
            continue;
        }
        *weight = if rng.gen_bool(config.replace_rate.clamp(0.0, 1.0)) {
            rng.gen_range(-1.0..=1.0)
        } else {
            *weight + gaussian(rng) * config.sigma
        };
        *weight = weight.clamp(-config.weight_limit, config.weight_limit);
    }
    child
}

/// Standard normal sample (Box-Muller)
pub fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
