//! Configuration types for tournament evaluation
//!
//! Level 4 - Utilities and configuration

use coevo_core::{Mark, MatchOutcome};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::TournamentError;

/// Points for a single game result. All values are non-negative because the
/// search algorithm cannot handle negative fitness.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

impl ScoringPolicy {
    /// 10 for a win, 1 for a draw, 0 for a loss
    pub const STANDARD: ScoringPolicy = ScoringPolicy {
        win: 10.0,
        draw: 1.0,
        loss: 0.0,
    };

    /// 2 for a win, 1 for a draw, 0 for a loss
    pub const COMPACT: ScoringPolicy = ScoringPolicy {
        win: 2.0,
        draw: 1.0,
        loss: 0.0,
    };

    /// Points earned by `mark` for `outcome`
    pub fn score(&self, outcome: MatchOutcome, mark: Mark) -> f64 {
        match outcome.winner() {
            Some(winner) if winner == mark => self.win,
            Some(_) => self.loss,
            None => self.draw,
        }
    }

    /// Reject negative or non-finite points
    pub fn validate(&self) -> Result<(), TournamentError> {
        for value in [self.win, self.draw, self.loss] {
            if !value.is_finite() || value < 0.0 {
                return Err(TournamentError::InvalidScoring(value));
            }
        }
        Ok(())
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy::STANDARD
    }
}

/// Scoring for both sides of a game, keyed by the mark each side played
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchScoring {
    /// Applied to whoever played X (moves first)
    pub x: ScoringPolicy,
    /// Applied to whoever played O
    pub o: ScoringPolicy,
}

impl MatchScoring {
    /// Same policy for both marks
    pub fn uniform(policy: ScoringPolicy) -> Self {
        Self { x: policy, o: policy }
    }

    /// Playing O is structurally harder, so O results pay more:
    /// X scores 2/1/0, O scores 10/2/0.
    pub fn role_weighted() -> Self {
        Self {
            x: ScoringPolicy::COMPACT,
            o: ScoringPolicy {
                win: 10.0,
                draw: 2.0,
                loss: 0.0,
            },
        }
    }

    pub fn policy_for(&self, mark: Mark) -> &ScoringPolicy {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }

    /// Points for `mark` under its own policy
    pub fn score(&self, outcome: MatchOutcome, mark: Mark) -> f64 {
        self.policy_for(mark).score(outcome, mark)
    }

    pub fn validate(&self) -> Result<(), TournamentError> {
        self.x.validate()?;
        self.o.validate()
    }
}

impl Default for MatchScoring {
    fn default() -> Self {
        MatchScoring::role_weighted()
    }
}

/// Worker pool sizing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Worker threads (None = available hardware parallelism)
    pub max_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn with_threads(threads: usize) -> Self {
        Self {
            max_threads: Some(threads),
        }
    }

    /// Build the bounded worker pool evaluators run their outer loop on
    pub fn build_pool(&self) -> Result<ThreadPool, TournamentError> {
        let mut builder = ThreadPoolBuilder::new();
        if let Some(threads) = self.max_threads {
            if threads == 0 {
                return Err(TournamentError::ZeroThreads);
            }
            builder = builder.num_threads(threads);
        }
        Ok(builder.build()?)
    }
}

/// Exhaustive round-robin configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundRobinConfig {
    pub scoring: MatchScoring,
    pub parallel: ParallelConfig,
}

impl RoundRobinConfig {
    pub fn validate(&self) -> Result<(), TournamentError> {
        self.scoring.validate()
    }

    pub fn with_scoring(mut self, scoring: MatchScoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Hall-of-fame wrapper configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HallOfFameConfig {
    /// Minimum generations between two hall-of-fame additions
    pub generations_per_champion: u64,
    /// Share of the final fitness that comes from hall-of-fame games (0..=1)
    pub hall_of_fame_weight: f64,
    pub scoring: MatchScoring,
    /// Used only when the inner evaluator has no worker pool to share
    pub parallel: ParallelConfig,
}

impl Default for HallOfFameConfig {
    fn default() -> Self {
        Self {
            generations_per_champion: 10,
            hall_of_fame_weight: 0.5,
            scoring: MatchScoring::default(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl HallOfFameConfig {
    pub fn new(generations_per_champion: u64, hall_of_fame_weight: f64) -> Self {
        Self {
            generations_per_champion,
            hall_of_fame_weight,
            ..Default::default()
        }
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), TournamentError> {
        if !(0.0..=1.0).contains(&self.hall_of_fame_weight) {
            return Err(TournamentError::InvalidWeight(self.hall_of_fame_weight));
        }
        if self.generations_per_champion == 0 {
            return Err(TournamentError::ZeroChampionInterval);
        }
        self.scoring.validate()
    }
}

/// Host-parasite configuration (one direction)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostParasiteConfig {
    /// Maximum size of the parasite snapshot
    pub parasite_count: usize,
    /// Hall-of-fame opponents sampled per evaluation
    pub champion_count: usize,
    /// Mark the evaluated (host) population plays
    pub host_mark: Mark,
    pub scoring: MatchScoring,
    /// Seed for hall-of-fame sampling
    pub seed: u64,
    pub parallel: ParallelConfig,
}

impl Default for HostParasiteConfig {
    fn default() -> Self {
        Self {
            parasite_count: 8,
            champion_count: 8,
            host_mark: Mark::X,
            scoring: MatchScoring::uniform(ScoringPolicy::COMPACT),
            seed: 42,
            parallel: ParallelConfig::default(),
        }
    }
}

impl HostParasiteConfig {
    pub fn new(parasite_count: usize, champion_count: usize) -> Self {
        Self {
            parasite_count,
            champion_count,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), TournamentError> {
        self.scoring.validate()
    }

    /// Same settings for the other population: opposite mark, shifted seed
    pub fn mirrored(&self) -> Self {
        Self {
            host_mark: self.host_mark.opponent(),
            seed: self.seed.wrapping_add(1),
            ..*self
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Calibration against the random and perfect agents
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Games against the random agent, per side
    pub random_games_per_side: usize,
    /// Games against the perfect agent, per side
    pub perfect_games_per_side: usize,
    pub scoring: ScoringPolicy,
    /// Fitness at which the search may stop
    pub stop_fitness: f64,
    /// Seed for the random opponents
    pub seed: u64,
    pub parallel: ParallelConfig,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            random_games_per_side: 50,
            perfect_games_per_side: 1,
            scoring: ScoringPolicy::STANDARD,
            stop_fitness: 1002.0,
            seed: 42,
            parallel: ParallelConfig::default(),
        }
    }
}

impl BaselineConfig {
    /// Best achievable fitness: win every random game, draw every perfect one
    pub fn max_fitness(&self) -> f64 {
        2.0 * (self.random_games_per_side as f64 * self.scoring.win
            + self.perfect_games_per_side as f64 * self.scoring.draw)
    }

    pub fn validate(&self) -> Result<(), TournamentError> {
        self.scoring.validate()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}
