//! COEVO Tournament - Fitness evaluation through game playing
//!
//! This crate turns a list of genomes into fitness values by playing
//! tic-tac-toe:
//! - Single scored games between two decoded genomes
//! - Exhaustive round-robin within one population
//! - A hall-of-fame wrapper that adds games against past champions
//! - Host-parasite coevolution between two populations
//! - Calibration against the random and perfect agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: ListEvaluator, GenomeDecoder (orchestration interfaces)
//! - Level 2: RoundRobinEvaluator, HallOfFameEvaluator,
//!   HostParasiteEvaluator, BaselineEvaluator (phases)
//! - Level 3: MatchEvaluator, ParasiteSnapshot (steps)
//! - Level 4: scoring, accumulation, configuration

mod baseline;
mod config;
mod evaluator;
mod fitness;
mod hall_of_fame;
mod host_parasite;
mod match_play;
mod parasites;
mod round_robin;

pub use baseline::{calibrate, BaselineEvaluator, CalibrationReport};
pub use config::{
    BaselineConfig, HallOfFameConfig, HostParasiteConfig, MatchScoring, ParallelConfig, RoundRobinConfig,
    ScoringPolicy,
};
pub use evaluator::{GenerationUpdate, GenomeDecoder, ListEvaluator};
pub use fitness::{FitnessAccumulator, FitnessScore, GameTally, Individual};
pub use hall_of_fame::HallOfFameEvaluator;
pub use host_parasite::{pair_host_parasite, HostParasiteEvaluator};
pub use match_play::MatchEvaluator;
pub use parasites::{select_parasites, ParasiteSnapshot};
pub use round_robin::RoundRobinEvaluator;

/// Errors raised while configuring an evaluator
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("hall of fame weight must be within [0, 1], got {0}")]
    InvalidWeight(f64),
    #[error("scoring values must be finite and non-negative, got {0}")]
    InvalidScoring(f64),
    #[error("generations per champion must be at least 1")]
    ZeroChampionInterval,
    #[error("worker pool needs at least one thread")]
    ZeroThreads,
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}
