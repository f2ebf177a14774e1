//! Crossover operators for network genomes
//!
//! Combines two parents of the same topology into one child.

use rand::Rng;

use crate::network::NetworkGenome;

/// Uniform crossover: each weight comes from either parent with equal odds.
///
/// # Arguments
/// * `a` - First parent
/// * `b` - Second parent, same hidden size as `a`
/// * `rng` - Random number generator
///
/// # Panics
/// Panics if the parents have different topologies
pub fn crossover<R: Rng>(a: &NetworkGenome, b: &NetworkGenome, rng: &mut R) -> NetworkGenome {
    assert_eq!(a.hidden, b.hidden, "Parents must share a topology");
    assert_eq!(a.weights.len(), b.weights.len(), "Parents must share a topology");

    let weights = a
        .weights
        .iter()
        .zip(&b.weights)
        .map(|(&wa, &wb)| if rng.gen_bool(0.5) { wa } else { wb })
        .collect();

    NetworkGenome {
        hidden: a.hidden,
        weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn parents() -> (NetworkGenome, NetworkGenome) {
        let n = NetworkGenome::weight_count(4);
        (
            NetworkGenome {
                hidden: 4,
                weights: vec![1.0; n],
            },
            NetworkGenome {
                hidden: 4,
                weights: vec![-1.0; n],
            },
        )
    }

    #[test]
    fn test_child_weights_come_from_parents() {
        let (a, b) = parents();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let child = crossover(&a, &b, &mut rng);

        assert_eq!(child.hidden, 4);
        assert_eq!(child.weights.len(), a.weights.len());
        assert!(child.weights.iter().all(|&w| w == 1.0 || w == -1.0));
    }

    #[test]
    fn test_crossover_mixes_parents() {
        let (a, b) = parents();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let child = crossover(&a, &b, &mut rng);

        let from_a = child.weights.iter().filter(|&&w| w == 1.0).count();
        assert!(from_a > 10 && from_a < child.weights.len() - 10, "from_a = {}", from_a);
    }

    #[test]
    #[should_panic(expected = "topology")]
    fn test_mismatched_parents_panic() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        crossover(&NetworkGenome::zeroed(2), &NetworkGenome::zeroed(3), &mut rng);
    }
}
