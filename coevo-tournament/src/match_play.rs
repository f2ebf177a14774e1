//! Match play - one game between two decoded genomes
//!
//! Level 3 - Step-level implementation

use std::sync::atomic::{AtomicU64, Ordering};

use coevo_core::{play_to_end, DecisionFunction, Mark, MatchOutcome, NetworkAgent};

use crate::config::MatchScoring;
use crate::fitness::FitnessScore;

/// Plays single games and scores both sides.
///
/// The first phenome handed to [`MatchEvaluator::evaluate`] plays
/// `first_mark`; the second plays the other mark. Safe to share between
/// worker threads: the only mutable state is the match counter.
#[derive(Debug)]
pub struct MatchEvaluator {
    scoring: MatchScoring,
    first_mark: Mark,
    evaluations: AtomicU64,
}

impl MatchEvaluator {
    pub fn new(scoring: MatchScoring, first_mark: Mark) -> Self {
        Self {
            scoring,
            first_mark,
            evaluations: AtomicU64::new(0),
        }
    }

    /// Play one game and return the scores of `first` and `second`
    pub fn evaluate<A, B>(&self, first: &mut A, second: &mut B) -> (FitnessScore, FitnessScore)
    where
        A: DecisionFunction + ?Sized,
        B: DecisionFunction + ?Sized,
    {
        let outcome = self.play(first, second);
        let first_points = self.scoring.score(outcome, self.first_mark);
        let second_points = self.scoring.score(outcome, self.first_mark.opponent());
        (
            FitnessScore::uniform(first_points),
            FitnessScore::uniform(second_points),
        )
    }

    /// Play one game without scoring it
    pub fn play<A, B>(&self, first: &mut A, second: &mut B) -> MatchOutcome
    where
        A: DecisionFunction + ?Sized,
        B: DecisionFunction + ?Sized,
    {
        let mut first = NetworkAgent::new(first);
        let mut second = NetworkAgent::new(second);
        let outcome = match self.first_mark {
            Mark::X => play_to_end(&mut first, &mut second),
            Mark::O => play_to_end(&mut second, &mut first),
        };
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        outcome
    }

    /// Games played since construction or the last reset
    pub fn evaluation_count(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn reset_count(&self) {
        self.evaluations.store(0, Ordering::Relaxed);
    }
}
