//! Selection operators for genetic algorithms
//!
//! Tournament selection picks breeding parents; elitism carries the best
//! individuals over unchanged.

use coevo_tournament::Individual;
use rand::Rng;

/// Tournament selection: select an individual by running a tournament.
///
/// Randomly picks `tournament_size` individuals (with replacement), then
/// returns the one with the highest primary fitness.
///
/// # Arguments
/// * `population` - Scored individuals to select from
/// * `tournament_size` - Number of individuals in each tournament
/// * `rng` - Random number generator
///
/// # Panics
/// Panics if population is empty or tournament_size is 0
pub fn tournament_select<'a, G, R: Rng>(
    population: &'a [Individual<G>],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual<G> {
    assert!(!population.is_empty(), "Population cannot be empty");
    assert!(tournament_size > 0, "Tournament size must be > 0");

    let mut best = &population[rng.gen_range(0..population.len())];
    for _ in 1..tournament_size {
        let candidate = &population[rng.gen_range(0..population.len())];
        if candidate.fitness.primary > best.fitness.primary {
            best = candidate;
        }
    }
    best
}

/// Select the top N individuals by fitness (elitism).
///
/// Returns indices sorted by fitness, best first. Equal fitness keeps
/// population order.
pub fn select_elite<G>(population: &[Individual<G>], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by(|&a, &b| {
        population[b]
            .fitness
            .primary
            .partial_cmp(&population[a].fitness.primary)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(n);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use coevo_tournament::FitnessScore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scored(fitness: &[f64]) -> Vec<Individual<usize>> {
        fitness
            .iter()
            .enumerate()
            .map(|(id, &f)| Individual {
                genome: id,
                fitness: FitnessScore::uniform(f),
            })
            .collect()
    }

    #[test]
    fn test_tournament_select_returns_higher_fitness() {
        let population = scored(&(0..10).map(|i| i as f64).collect::<Vec<_>>());
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut high_count = 0;
        for _ in 0..100 {
            if tournament_select(&population, 3, &mut rng).genome >= 7 {
                high_count += 1;
            }
        }

        // With tournament size 3, we should heavily favor high-fitness individuals
        assert!(high_count > 50, "Tournament selection should favor high fitness, got {}", high_count);
    }

    #[test]
    fn test_tournament_of_one_is_uniform_pick() {
        let population = scored(&[5.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(tournament_select(&population, 1, &mut rng).genome, 0);
    }

    #[test]
    fn test_select_elite() {
        let population = scored(&[0.5, 0.9, 0.3, 0.7, 0.1]);
        assert_eq!(select_elite(&population, 3), vec![1, 3, 0]);
    }

    #[test]
    fn test_select_elite_ties_keep_order() {
        let population = scored(&[2.0, 4.0, 4.0, 1.0]);
        assert_eq!(select_elite(&population, 2), vec![1, 2]);
    }

    #[test]
    fn test_select_elite_handles_small_pop() {
        let population = scored(&[0.5, 0.9]);
        assert_eq!(select_elite(&population, 5).len(), 2);
    }
}
