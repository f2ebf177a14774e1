//! Seams between the search algorithm and the tournament evaluators
//!
//! Level 1 - Orchestration interfaces

use std::sync::Arc;

use rayon::ThreadPool;

use coevo_core::DecisionFunction;

use crate::fitness::Individual;

/// Turns a genome into a runnable decision function.
///
/// Decoders are shared across worker threads. A genome that cannot be
/// decoded yields `None`, and evaluators skip it instead of failing.
pub trait GenomeDecoder<G>: Send + Sync {
    type Phenome: DecisionFunction;

    fn decode(&self, genome: &G) -> Option<Self::Phenome>;
}

impl<G, D: GenomeDecoder<G> + ?Sized> GenomeDecoder<G> for &D {
    type Phenome = D::Phenome;

    fn decode(&self, genome: &G) -> Option<Self::Phenome> {
        (**self).decode(genome)
    }
}

/// Summary the search driver publishes once per generation, after speciation
#[derive(Clone, Debug)]
pub struct GenerationUpdate<G> {
    pub generation: u64,
    /// Fittest genome of the generation
    pub champion: Option<G>,
    /// Current species, each a list of scored members
    pub species: Vec<Vec<Individual<G>>>,
}

/// Assigns fitness to a whole population at once.
///
/// All evaluators in this crate score genomes by playing them against
/// opponents, so one genome's fitness depends on the rest of the list.
pub trait ListEvaluator<G> {
    /// Overwrite every individual's fitness
    fn evaluate(&mut self, population: &mut [Individual<G>]);

    /// Matches played so far (two-agent games)
    fn evaluation_count(&self) -> u64;

    /// True once the evaluator has seen a good enough genome
    fn stop_condition_satisfied(&self) -> bool {
        false
    }

    /// Drop all cross-generation state
    fn reset(&mut self);

    /// Called by the driver after each generation
    fn on_generation(&mut self, _update: &GenerationUpdate<G>) {}

    /// Worker pool a wrapping evaluator may run on instead of building its own
    fn worker_pool(&self) -> Option<Arc<ThreadPool>> {
        None
    }
}

impl<G, E: ListEvaluator<G> + ?Sized> ListEvaluator<G> for Box<E> {
    fn evaluate(&mut self, population: &mut [Individual<G>]) {
        (**self).evaluate(population)
    }

    fn evaluation_count(&self) -> u64 {
        (**self).evaluation_count()
    }

    fn stop_condition_satisfied(&self) -> bool {
        (**self).stop_condition_satisfied()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn on_generation(&mut self, update: &GenerationUpdate<G>) {
        (**self).on_generation(update)
    }

    fn worker_pool(&self) -> Option<Arc<ThreadPool>> {
        (**self).worker_pool()
    }
}
