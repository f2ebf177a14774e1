//! K-means speciation on genome weight vectors

use rand::seq::index;
use rand::Rng;

use coevo_tournament::Individual;

use crate::network::NetworkGenome;

/// Lloyd iterations per speciation
const LLOYD_ITERATIONS: usize = 5;

/// Partition the population into at most `species_count` species.
///
/// Returns member indices per species, empty species dropped. Centroids are
/// seeded from distinct random members; ties in distance go to the lower
/// species index.
pub fn speciate<R: Rng>(
    population: &[Individual<NetworkGenome>],
    species_count: usize,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let k = species_count.min(population.len());
    if k == 0 {
        return Vec::new();
    }

    let mut centroids: Vec<Vec<f64>> = index::sample(rng, population.len(), k)
        .into_iter()
        .map(|i| population[i].genome.weights.clone())
        .collect();
    let mut assignment = assign(population, &centroids);

    for _ in 0..LLOYD_ITERATIONS {
        update_centroids(population, &assignment, &mut centroids);
        let next = assign(population, &centroids);
        if next == assignment {
            break;
        }
        assignment = next;
    }

    let mut species = vec![Vec::new(); k];
    for (member, &s) in assignment.iter().enumerate() {
        species[s].push(member);
    }
    species.retain(|members| !members.is_empty());
    species
}

fn assign(population: &[Individual<NetworkGenome>], centroids: &[Vec<f64>]) -> Vec<usize> {
    population
        .iter()
        .map(|individual| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (s, centroid) in centroids.iter().enumerate() {
                let distance = individual.genome.distance_squared(centroid);
                if distance < best_distance {
                    best = s;
                    best_distance = distance;
                }
            }
            best
        })
        .collect()
}

/// Mean of each species' members. A species that lost all members keeps
/// its old centroid.
fn update_centroids(population: &[Individual<NetworkGenome>], assignment: &[usize], centroids: &mut [Vec<f64>]) {
    let mut sums: Vec<Vec<f64>> = centroids.iter().map(|c| vec![0.0; c.len()]).collect();
    let mut counts = vec![0usize; centroids.len()];

    for (individual, &s) in population.iter().zip(assignment) {
        counts[s] += 1;
        for (sum, w) in sums[s].iter_mut().zip(&individual.genome.weights) {
            *sum += w;
        }
    }

    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *centroid = sum.into_iter().map(|v| v / count as f64).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn constant_genome(value: f64) -> Individual<NetworkGenome> {
        let mut genome = NetworkGenome::zeroed(1);
        genome.weights.iter_mut().for_each(|w| *w = value);
        Individual::new(genome)
    }

    #[test]
    fn test_separated_clusters() {
        let population: Vec<_> = [0.0, 0.1, 5.0, 5.1, 0.05, 5.05]
            .iter()
            .map(|&v| constant_genome(v))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut species = speciate(&population, 2, &mut rng);

        species.sort();
        assert_eq!(species, vec![vec![0, 1, 4], vec![2, 3, 5]]);
    }

    #[test]
    fn test_every_member_assigned_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let population: Vec<_> = (0..20)
            .map(|_| Individual::new(NetworkGenome::random(2, &mut rng)))
            .collect();
        let species = speciate(&population, 4, &mut rng);

        assert!(species.len() <= 4);
        let mut members: Vec<usize> = species.into_iter().flatten().collect();
        members.sort();
        assert_eq!(members, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(speciate(&[], 3, &mut rng).is_empty());

        let population = vec![constant_genome(1.0)];
        assert_eq!(speciate(&population, 3, &mut rng), vec![vec![0]]);
    }
}
