//! COEVO Evolution - Reference neuro-evolution driver
//!
//! This crate provides a small generational search over fixed-topology
//! networks so the tournament evaluators can be run end to end:
//! - Network genome, phenome and decoder
//! - K-means speciation
//! - Selection (tournament, elitism)
//! - Mutation and crossover operators
//! - The generational loop that publishes per-generation updates

pub mod crossover;
pub mod mutation;
pub mod network;
pub mod search;
pub mod selection;
pub mod speciation;

pub use crossover::crossover;
pub use mutation::{gaussian, mutate, MutationConfig};
pub use network::{FeedForwardNetwork, NetworkDecoder, NetworkGenome};
pub use search::{EvolutionConfig, GenerationStats, GenerationalSearch};
pub use selection::{select_elite, tournament_select};
pub use speciation::speciate;
