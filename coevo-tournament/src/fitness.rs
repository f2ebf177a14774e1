//! Fitness values, per-worker accumulation and win/draw/loss tallies
//!
//! Level 4 - Utilities

use std::ops::{Add, AddAssign};

use coevo_core::{Mark, MatchOutcome};
use serde::{Deserialize, Serialize};

use crate::config::ScoringPolicy;

/// Fitness of one genome. `secondary` is the auxiliary ("alternative")
/// fitness some search algorithms report; tournament evaluators keep it equal
/// to `primary`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessScore {
    pub primary: f64,
    pub secondary: f64,
}

impl FitnessScore {
    pub const ZERO: FitnessScore = FitnessScore {
        primary: 0.0,
        secondary: 0.0,
    };

    pub fn new(primary: f64, secondary: f64) -> Self {
        debug_assert!(primary >= 0.0 && secondary >= 0.0, "negative fitness");
        Self { primary, secondary }
    }

    /// Same value for both components
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            primary: self.primary * factor,
            secondary: self.secondary * factor,
        }
    }
}

impl Add for FitnessScore {
    type Output = FitnessScore;

    fn add(self, rhs: FitnessScore) -> FitnessScore {
        FitnessScore {
            primary: self.primary + rhs.primary,
            secondary: self.secondary + rhs.secondary,
        }
    }
}

impl AddAssign for FitnessScore {
    fn add_assign(&mut self, rhs: FitnessScore) {
        *self = *self + rhs;
    }
}

/// A genome paired with its most recent fitness
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual<G> {
    pub genome: G,
    pub fitness: FitnessScore,
}

impl<G> Individual<G> {
    /// Fresh individual with zero fitness
    pub fn new(genome: G) -> Self {
        Self {
            genome,
            fitness: FitnessScore::ZERO,
        }
    }
}

/// Running fitness totals indexed by population position.
///
/// Each rayon worker folds into its own accumulator; the partial totals are
/// merged once the parallel loop finishes and then published.
#[derive(Clone, Debug, PartialEq)]
pub struct FitnessAccumulator {
    totals: Vec<FitnessScore>,
}

impl FitnessAccumulator {
    pub fn new(len: usize) -> Self {
        Self {
            totals: vec![FitnessScore::ZERO; len],
        }
    }

    pub fn add(&mut self, index: usize, score: FitnessScore) {
        self.totals[index] += score;
    }

    /// Combine two partial accumulators of the same population
    pub fn merge(mut self, other: FitnessAccumulator) -> FitnessAccumulator {
        debug_assert_eq!(self.totals.len(), other.totals.len());
        for (total, partial) in self.totals.iter_mut().zip(other.totals) {
            *total += partial;
        }
        self
    }

    pub fn get(&self, index: usize) -> FitnessScore {
        self.totals[index]
    }

    /// Sum over every genome
    pub fn total(&self) -> FitnessScore {
        self.totals
            .iter()
            .fold(FitnessScore::ZERO, |acc, &score| acc + score)
    }

    /// Overwrite each individual's fitness with its accumulated total
    pub fn publish<G>(self, population: &mut [Individual<G>]) {
        debug_assert_eq!(self.totals.len(), population.len());
        for (individual, score) in population.iter_mut().zip(self.totals) {
            individual.fitness = score;
        }
    }
}

/// Win/draw/loss counts for one player over a series of games
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTally {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl GameTally {
    /// Record a finished game from `mark`'s point of view
    pub fn record(&mut self, outcome: MatchOutcome, mark: Mark) {
        match outcome.winner() {
            Some(winner) if winner == mark => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
    }

    /// Total games played
    pub fn total_games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    /// Win rate (wins / total games)
    pub fn win_rate(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64
        }
    }

    /// Points earned under `policy`
    pub fn points(&self, policy: &ScoringPolicy) -> f64 {
        self.wins as f64 * policy.win + self.draws as f64 * policy.draw + self.losses as f64 * policy.loss
    }

    /// Combine two tallies
    pub fn combine(&self, other: &GameTally) -> GameTally {
        GameTally {
            wins: self.wins + other.wins,
            draws: self.draws + other.draws,
            losses: self.losses + other.losses,
        }
    }
}
