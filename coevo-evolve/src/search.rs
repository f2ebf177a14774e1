//! Generational search driver
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: GenerationalSearch::run (orchestration)
//! - Level 2: step (evaluate, speciate, publish, reproduce)
//! - Level 3: build_update, breed_offspring
//! - Level 4: configuration, statistics

use std::sync::mpsc::Sender;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coevo_tournament::{GenerationUpdate, Individual, ListEvaluator};

use crate::crossover::crossover;
use crate::mutation::{mutate, MutationConfig};
use crate::network::NetworkGenome;
use crate::selection::{select_elite, tournament_select};
use crate::speciation::speciate;

// ============================================================================
// CONFIGURATION (Level 4)
// ============================================================================

/// Evolution configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Hidden neurons of every genome
    pub hidden: usize,
    pub species_count: usize,
    /// Individuals carried over unchanged
    pub elitism: usize,
    pub tournament_size: usize,
    /// Probability an offspring has two parents
    pub crossover_rate: f64,
    pub mutation: MutationConfig,
    pub seed: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            hidden: 9,
            species_count: 5,
            elitism: 2,
            tournament_size: 3,
            crossover_rate: 0.5,
            mutation: MutationConfig::default(),
            seed: 42,
        }
    }
}

impl EvolutionConfig {
    pub fn with_population(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_hidden(mut self, hidden: usize) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Per-generation statistics
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub best: f64,
    pub average: f64,
    pub species: usize,
    /// Evaluator's cumulative match count after this generation
    pub evaluations: u64,
}

// ============================================================================
// DRIVER
// ============================================================================

/// Minimal generational neuro-evolution loop over [`NetworkGenome`]s.
///
/// Each step evaluates the whole population with a [`ListEvaluator`],
/// speciates it, publishes a [`GenerationUpdate`] and breeds the next
/// generation.
pub struct GenerationalSearch {
    config: EvolutionConfig,
    population: Vec<Individual<NetworkGenome>>,
    generation: u64,
    rng: ChaCha8Rng,
    subscribers: Vec<Sender<GenerationUpdate<NetworkGenome>>>,
    history: Vec<GenerationStats>,
    champion: Option<Individual<NetworkGenome>>,
}

impl GenerationalSearch {
    /// Random initial population
    pub fn new(config: EvolutionConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let population = (0..config.population_size)
            .map(|_| Individual::new(NetworkGenome::random(config.hidden, &mut rng)))
            .collect();
        Self::with_population(config, population, rng)
    }

    fn with_population(
        config: EvolutionConfig,
        population: Vec<Individual<NetworkGenome>>,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            config,
            population,
            generation: 0,
            rng,
            subscribers: Vec::new(),
            history: Vec::new(),
            champion: None,
        }
    }

    /// Receive every generation update from now on
    pub fn subscribe(&mut self, sender: Sender<GenerationUpdate<NetworkGenome>>) {
        self.subscribers.push(sender);
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> &[Individual<NetworkGenome>] {
        &self.population
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Fittest individual seen so far, with the fitness it had when seen
    pub fn champion(&self) -> Option<&Individual<NetworkGenome>> {
        self.champion.as_ref()
    }

    // ------------------------------------------------------------------------
    // Level 1 - Orchestration
    // ------------------------------------------------------------------------

    /// Run up to `generations` steps, stopping early once the evaluator's
    /// stop condition holds. Returns the number of steps taken.
    pub fn run<E>(&mut self, evaluator: &mut E, generations: u64) -> u64
    where
        E: ListEvaluator<NetworkGenome> + ?Sized,
    {
        let mut steps = 0;
        while steps < generations {
            self.step(evaluator);
            steps += 1;
            if evaluator.stop_condition_satisfied() {
                info!("Stop condition satisfied after generation {}", self.generation - 1);
                break;
            }
        }
        steps
    }

    // ------------------------------------------------------------------------
    // Level 2 - Phases
    // ------------------------------------------------------------------------

    /// One generation: evaluate, speciate, publish, reproduce
    pub fn step<E>(&mut self, evaluator: &mut E) -> GenerationStats
    where
        E: ListEvaluator<NetworkGenome> + ?Sized,
    {
        evaluator.evaluate(&mut self.population);

        let species = speciate(&self.population, self.config.species_count, &mut self.rng);
        let stats = self.record_stats(species.len(), evaluator.evaluation_count());
        self.track_champion();

        let update = self.build_update(&species);
        self.publish(&update);
        evaluator.on_generation(&update);

        self.population = self.breed_offspring();
        self.generation += 1;
        stats
    }

    fn record_stats(&mut self, species: usize, evaluations: u64) -> GenerationStats {
        let best = self
            .population
            .iter()
            .map(|individual| individual.fitness.primary)
            .fold(0.0, f64::max);
        let average = if self.population.is_empty() {
            0.0
        } else {
            self.population.iter().map(|i| i.fitness.primary).sum::<f64>() / self.population.len() as f64
        };

        let stats = GenerationStats {
            generation: self.generation,
            best,
            average,
            species,
            evaluations,
        };
        info!(
            "Generation {}: best={:.3}, avg={:.3}, species={}",
            stats.generation, stats.best, stats.average, stats.species
        );
        self.history.push(stats);
        stats
    }

    fn publish(&mut self, update: &GenerationUpdate<NetworkGenome>) {
        let before = self.subscribers.len();
        self.subscribers.retain(|sender| sender.send(update.clone()).is_ok());
        if self.subscribers.len() < before {
            debug!("Dropped {} disconnected subscribers", before - self.subscribers.len());
        }
    }

    // ------------------------------------------------------------------------
    // Level 3 - Steps
    // ------------------------------------------------------------------------

    fn generation_champion(&self) -> Option<&Individual<NetworkGenome>> {
        let mut best: Option<&Individual<NetworkGenome>> = None;
        for individual in &self.population {
            match best {
                Some(current) if individual.fitness.primary <= current.fitness.primary => {}
                _ => best = Some(individual),
            }
        }
        best
    }

    fn track_champion(&mut self) {
        let Some(best) = self.generation_champion() else {
            return;
        };
        let improved = self
            .champion
            .as_ref()
            .map_or(true, |champion| best.fitness.primary > champion.fitness.primary);
        if improved {
            self.champion = Some(best.clone());
        }
    }

    fn build_update(&self, species: &[Vec<usize>]) -> GenerationUpdate<NetworkGenome> {
        GenerationUpdate {
            generation: self.generation,
            champion: self.generation_champion().map(|best| best.genome.clone()),
            species: species
                .iter()
                .map(|members| members.iter().map(|&i| self.population[i].clone()).collect())
                .collect(),
        }
    }

    /// Elites unchanged, the rest bred by tournament selection, optional
    /// crossover and mutation
    fn breed_offspring(&mut self) -> Vec<Individual<NetworkGenome>> {
        let size = self.config.population_size;
        if self.population.is_empty() {
            return Vec::new();
        }

        let mut next: Vec<Individual<NetworkGenome>> = select_elite(&self.population, self.config.elitism.min(size))
            .into_iter()
            .map(|i| Individual::new(self.population[i].genome.clone()))
            .collect();

        let tournament_size = self.config.tournament_size.max(1);
        while next.len() < size {
            let first = &tournament_select(&self.population, tournament_size, &mut self.rng).genome;
            let parent = if self.rng.gen_bool(self.config.crossover_rate.clamp(0.0, 1.0)) {
                let second = &tournament_select(&self.population, tournament_size, &mut self.rng).genome;
                crossover(first, second, &mut self.rng)
            } else {
                first.clone()
            };
            next.push(Individual::new(mutate(&parent, &self.config.mutation, &mut self.rng)));
        }
        next
    }
}
