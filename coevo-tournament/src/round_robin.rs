//! Exhaustive round-robin: every genome plays every other genome as X
//!
//! Level 2 - Phase-level implementation

use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, warn};

use coevo_core::Mark;

use crate::config::RoundRobinConfig;
use crate::evaluator::{GenomeDecoder, ListEvaluator};
use crate::fitness::{FitnessAccumulator, Individual};
use crate::match_play::MatchEvaluator;
use crate::TournamentError;

/// Plays each ordered pair (i, j), i != j, once with i as X.
///
/// A population of n genomes costs n * (n - 1) games per generation, each
/// genome taking both roles against each opponent. Every game adds both
/// players' scores to their running totals.
pub struct RoundRobinEvaluator<D> {
    decoder: D,
    matches: MatchEvaluator,
    pool: Arc<ThreadPool>,
}

impl<D> RoundRobinEvaluator<D> {
    pub fn new(config: RoundRobinConfig, decoder: D) -> Result<Self, TournamentError> {
        config.validate()?;
        Ok(Self {
            decoder,
            matches: MatchEvaluator::new(config.scoring, Mark::X),
            pool: Arc::new(config.parallel.build_pool()?),
        })
    }

    pub fn pool(&self) -> &Arc<ThreadPool> {
        &self.pool
    }

    /// Games played so far
    pub fn evaluation_count(&self) -> u64 {
        self.matches.evaluation_count()
    }

    /// Score every ordered pairing without touching the population
    pub fn play_all<G>(&self, population: &[Individual<G>]) -> FitnessAccumulator
    where
        G: Sync,
        D: GenomeDecoder<G>,
    {
        let n = population.len();
        let decoder = &self.decoder;
        let matches = &self.matches;

        self.pool.install(|| {
            (0..n)
                .into_par_iter()
                .fold(
                    || FitnessAccumulator::new(n),
                    |mut acc, i| {
                        let Some(mut first) = decoder.decode(&population[i].genome) else {
                            return acc;
                        };
                        for (j, opponent) in population.iter().enumerate() {
                            if i == j {
                                continue;
                            }
                            let Some(mut second) = decoder.decode(&opponent.genome) else {
                                continue;
                            };
                            let (first_score, second_score) = matches.evaluate(&mut first, &mut second);
                            acc.add(i, first_score);
                            acc.add(j, second_score);
                        }
                        acc
                    },
                )
                .reduce(|| FitnessAccumulator::new(n), FitnessAccumulator::merge)
        })
    }
}

impl<G, D> ListEvaluator<G> for RoundRobinEvaluator<D>
where
    G: Sync,
    D: GenomeDecoder<G>,
{
    fn evaluate(&mut self, population: &mut [Individual<G>]) {
        if population.len() < 2 {
            warn!("Round robin needs two genomes, got {}", population.len());
        }
        let before = self.matches.evaluation_count();
        let totals = self.play_all(population);
        debug!(
            "Round robin: {} genomes, {} games",
            population.len(),
            self.matches.evaluation_count() - before
        );
        totals.publish(population);
    }

    fn evaluation_count(&self) -> u64 {
        RoundRobinEvaluator::evaluation_count(self)
    }

    fn reset(&mut self) {}

    fn worker_pool(&self) -> Option<Arc<ThreadPool>> {
        Some(Arc::clone(&self.pool))
    }
}
