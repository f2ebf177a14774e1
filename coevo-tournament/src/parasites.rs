//! Shared parasite snapshot for host-parasite coevolution
//!
//! Level 3 - Step-level implementation

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use crate::evaluator::GenerationUpdate;
use crate::fitness::Individual;

/// The opponent list one population is currently evaluated against.
///
/// Written by the other population's generation updates, read by this
/// population's evaluator. Readers take an `Arc` to an immutable list, and
/// writers build the replacement off-lock and swap it in, so a reader never
/// sees a partially rebuilt list. Clones share the same cell.
#[derive(Debug)]
pub struct ParasiteSnapshot<G> {
    current: Arc<RwLock<Arc<Vec<G>>>>,
}

impl<G> Clone for ParasiteSnapshot<G> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<G> Default for ParasiteSnapshot<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> ParasiteSnapshot<G> {
    /// Empty snapshot
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(Vec::new()))),
        }
    }

    /// Current parasite list. Stays valid while a rebuild swaps in a new one.
    pub fn load(&self) -> Arc<Vec<G>> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn replace(&self, parasites: Vec<G>) {
        let next = Arc::new(parasites);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }

    /// Rebuild from a generation update of the parasite population.
    /// Returns the new snapshot size.
    pub fn rebuild(&self, species: &[Vec<Individual<G>>], capacity: usize) -> usize
    where
        G: Clone,
    {
        let parasites = select_parasites(species, capacity);
        let len = parasites.len();
        self.replace(parasites);
        len
    }

    pub fn rebuild_from(&self, update: &GenerationUpdate<G>, capacity: usize) -> usize
    where
        G: Clone,
    {
        self.rebuild(&update.species, capacity)
    }
}

/// Best member of each non-empty species, sorted by descending fitness and
/// cut to `capacity`.
///
/// Within a species the first member with the highest fitness wins. Equal
/// fitness across species keeps species order.
pub fn select_parasites<G: Clone>(species: &[Vec<Individual<G>>], capacity: usize) -> Vec<G> {
    let mut best: Vec<&Individual<G>> = species
        .iter()
        .filter_map(|members| {
            members.iter().fold(None, |best: Option<&Individual<G>>, candidate| match best {
                Some(current) if candidate.fitness.primary <= current.fitness.primary => Some(current),
                _ => Some(candidate),
            })
        })
        .collect();

    best.sort_by(|a, b| {
        b.fitness
            .primary
            .partial_cmp(&a.fitness.primary)
            .unwrap_or(Ordering::Equal)
    });
    best.truncate(capacity);
    best.into_iter().map(|individual| individual.genome.clone()).collect()
}
