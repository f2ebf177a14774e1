//! Hall-of-fame wrapper: blends an inner evaluator's fitness with games
//! against past champions
//!
//! Level 2 - Phase-level implementation

use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info};

use coevo_core::Mark;

use crate::config::HallOfFameConfig;
use crate::evaluator::{GenerationUpdate, GenomeDecoder, ListEvaluator};
use crate::fitness::{FitnessScore, Individual};
use crate::match_play::MatchEvaluator;
use crate::TournamentError;

/// Wraps another list evaluator and keeps a growing list of past champions.
///
/// Final fitness is `(1 - w) * inner + (w / |hof|) * sum(score vs champion)`.
/// With an empty hall of fame the inner fitness is left untouched. Champion
/// games run on the inner evaluator's worker pool when it has one.
pub struct HallOfFameEvaluator<G, E, D> {
    config: HallOfFameConfig,
    inner: E,
    decoder: D,
    matches: MatchEvaluator,
    pool: Arc<ThreadPool>,
    hall_of_fame: Vec<G>,
    last_update: u64,
}

impl<G, E, D> HallOfFameEvaluator<G, E, D> {
    pub fn new(config: HallOfFameConfig, inner: E, decoder: D) -> Result<Self, TournamentError>
    where
        E: ListEvaluator<G>,
    {
        config.validate()?;
        let pool = match inner.worker_pool() {
            Some(pool) => pool,
            None => Arc::new(config.parallel.build_pool()?),
        };
        Ok(Self {
            config,
            inner,
            decoder,
            matches: MatchEvaluator::new(config.scoring, Mark::X),
            pool,
            hall_of_fame: Vec::new(),
            last_update: 0,
        })
    }

    pub fn hall_of_fame(&self) -> &[G] {
        &self.hall_of_fame
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Offer the champion of `generation`. It is admitted only when at least
    /// `generations_per_champion` generations passed since the last addition.
    pub fn record_generation(&mut self, generation: u64, champion: &G) -> bool
    where
        G: Clone,
    {
        if generation < self.last_update + self.config.generations_per_champion {
            return false;
        }
        self.last_update = generation;
        self.hall_of_fame.push(champion.clone());
        info!(
            "Generation {}: champion added to hall of fame (size {})",
            generation,
            self.hall_of_fame.len()
        );
        true
    }

    /// Weighted score of each genome against every champion
    fn score_against_champions(&self, population: &[Individual<G>]) -> Vec<FitnessScore>
    where
        G: Sync,
        D: GenomeDecoder<G>,
    {
        let champion_weight = self.config.hall_of_fame_weight / self.hall_of_fame.len() as f64;
        let decoder = &self.decoder;
        let matches = &self.matches;
        let champions = &self.hall_of_fame;

        self.pool.install(|| {
            population
                .par_iter()
                .map(|individual| {
                    let Some(mut host) = decoder.decode(&individual.genome) else {
                        return FitnessScore::ZERO;
                    };
                    champions
                        .iter()
                        .filter_map(|champion| decoder.decode(champion))
                        .fold(FitnessScore::ZERO, |acc, mut champion| {
                            let (score, _) = matches.evaluate(&mut host, &mut champion);
                            acc + score.scaled(champion_weight)
                        })
                })
                .collect()
        })
    }
}

impl<G, E, D> ListEvaluator<G> for HallOfFameEvaluator<G, E, D>
where
    G: Clone + Sync,
    E: ListEvaluator<G>,
    D: GenomeDecoder<G>,
{
    fn evaluate(&mut self, population: &mut [Individual<G>]) {
        self.inner.evaluate(population);

        if self.hall_of_fame.is_empty() {
            debug!("Hall of fame empty, keeping inner fitness");
            return;
        }

        let inner_weight = 1.0 - self.config.hall_of_fame_weight;
        let champion_scores = self.score_against_champions(population);
        for (individual, champion_score) in population.iter_mut().zip(champion_scores) {
            individual.fitness = individual.fitness.scaled(inner_weight) + champion_score;
        }
    }

    /// Inner evaluator's games plus the hall-of-fame games
    fn evaluation_count(&self) -> u64 {
        self.inner.evaluation_count() + self.matches.evaluation_count()
    }

    fn stop_condition_satisfied(&self) -> bool {
        self.inner.stop_condition_satisfied()
    }

    fn reset(&mut self) {
        self.hall_of_fame.clear();
        self.last_update = 0;
        self.inner.reset();
    }

    fn on_generation(&mut self, update: &GenerationUpdate<G>) {
        if let Some(champion) = &update.champion {
            self.record_generation(update.generation, champion);
        }
        self.inner.on_generation(update);
    }

    fn worker_pool(&self) -> Option<Arc<ThreadPool>> {
        Some(Arc::clone(&self.pool))
    }
}
