//! Fixed-topology network genome, its runnable phenome and the decoder
//!
//! The network is 9 inputs, one tanh hidden layer, 9 tanh outputs. Every
//! neuron has a bias weight stored after its incoming weights.

use rand::Rng;
use serde::{Deserialize, Serialize};

use coevo_core::{DecisionFunction, INPUT_COUNT, OUTPUT_COUNT};
use coevo_tournament::GenomeDecoder;

// ============================================================================
// GENOME
// ============================================================================

/// Flat weight vector of a 9 -> hidden -> 9 network
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkGenome {
    pub hidden: usize,
    pub weights: Vec<f64>,
}

impl NetworkGenome {
    /// Number of weights a network with `hidden` neurons needs
    pub fn weight_count(hidden: usize) -> usize {
        hidden * (INPUT_COUNT + 1) + OUTPUT_COUNT * (hidden + 1)
    }

    /// Weights drawn uniformly from `[-1, 1]`
    pub fn random<R: Rng>(hidden: usize, rng: &mut R) -> Self {
        let weights = (0..Self::weight_count(hidden))
            .map(|_| rng.gen_range(-1.0..=1.0))
            .collect();
        Self { hidden, weights }
    }

    pub fn zeroed(hidden: usize) -> Self {
        Self {
            hidden,
            weights: vec![0.0; Self::weight_count(hidden)],
        }
    }

    /// Squared Euclidean distance between two weight vectors
    pub fn distance_squared(&self, other: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(other)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    pub fn is_well_formed(&self) -> bool {
        self.weights.len() == Self::weight_count(self.hidden) && self.weights.iter().all(|w| w.is_finite())
    }
}

// ============================================================================
// PHENOME
// ============================================================================

/// Runnable network decoded from a [`NetworkGenome`]
#[derive(Clone, Debug)]
pub struct FeedForwardNetwork {
    hidden: usize,
    weights: Vec<f64>,
    inputs: [f64; INPUT_COUNT],
    hidden_activations: Vec<f64>,
    outputs: [f64; OUTPUT_COUNT],
}

impl FeedForwardNetwork {
    fn new(genome: &NetworkGenome) -> Self {
        Self {
            hidden: genome.hidden,
            weights: genome.weights.clone(),
            inputs: [0.0; INPUT_COUNT],
            hidden_activations: vec![0.0; genome.hidden],
            outputs: [0.0; OUTPUT_COUNT],
        }
    }
}

/// tanh of a bias-terminated weight row applied to `signals`
fn neuron(row: &[f64], signals: &[f64]) -> f64 {
    let (weights, bias) = row.split_at(signals.len());
    let sum: f64 = weights.iter().zip(signals).map(|(w, s)| w * s).sum();
    (sum + bias[0]).tanh()
}

impl DecisionFunction for FeedForwardNetwork {
    fn reset_state(&mut self) {
        self.hidden_activations.iter_mut().for_each(|a| *a = 0.0);
        self.outputs = [0.0; OUTPUT_COUNT];
    }

    fn set_inputs(&mut self, inputs: &[f64; INPUT_COUNT]) {
        self.inputs = *inputs;
    }

    fn activate(&mut self) {
        let (hidden_layer, output_layer) = self.weights.split_at(self.hidden * (INPUT_COUNT + 1));

        for (activation, row) in self
            .hidden_activations
            .iter_mut()
            .zip(hidden_layer.chunks_exact(INPUT_COUNT + 1))
        {
            *activation = neuron(row, &self.inputs);
        }
        for (output, row) in self.outputs.iter_mut().zip(output_layer.chunks_exact(self.hidden + 1)) {
            *output = neuron(row, &self.hidden_activations);
        }
    }

    fn outputs(&self) -> &[f64] {
        &self.outputs
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// Decodes network genomes; malformed genomes decode to `None`
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkDecoder;

impl GenomeDecoder<NetworkGenome> for NetworkDecoder {
    type Phenome = FeedForwardNetwork;

    fn decode(&self, genome: &NetworkGenome) -> Option<FeedForwardNetwork> {
        genome.is_well_formed().then(|| FeedForwardNetwork::new(genome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coevo_core::{Agent, Board, Mark, Move, NetworkAgent};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_weight_count() {
        assert_eq!(NetworkGenome::weight_count(0), 9);
        assert_eq!(NetworkGenome::weight_count(4), 40 + 45);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let genome = NetworkGenome::random(4, &mut rng);
        assert_eq!(genome.weights.len(), 85);
        assert!(genome.weights.iter().all(|w| (-1.0..=1.0).contains(w)));
    }

    #[test]
    fn test_decoder_rejects_malformed() {
        let mut genome = NetworkGenome::zeroed(3);
        assert!(NetworkDecoder.decode(&genome).is_some());

        genome.weights[5] = f64::NAN;
        assert!(NetworkDecoder.decode(&genome).is_none());

        genome.weights[5] = 0.0;
        genome.weights.pop();
        assert!(NetworkDecoder.decode(&genome).is_none());
    }

    #[test]
    fn test_output_bias_drives_move() {
        let hidden = 2;
        let mut genome = NetworkGenome::zeroed(hidden);
        // Bias of output 4 (the center cell).
        let output_offset = hidden * (INPUT_COUNT + 1);
        genome.weights[output_offset + 4 * (hidden + 1) + hidden] = 1.0;

        let network = NetworkDecoder.decode(&genome).unwrap();
        let mut agent = NetworkAgent::new(network);
        assert_eq!(agent.choose_move(&Board::new(), Mark::X), Some(Move::new(1, 1)));

        // Center taken: all remaining outputs are zero, first empty cell wins.
        let board: Board = " | | \n |O| \n | | ".parse().unwrap();
        assert_eq!(agent.choose_move(&board, Mark::X), Some(Move::new(0, 0)));
    }

    #[test]
    fn test_hidden_layer_propagates() {
        let hidden = 1;
        let mut genome = NetworkGenome::zeroed(hidden);
        // Hidden neuron reads cell 8; output 0 copies the hidden neuron.
        genome.weights[8] = 1.0;
        let output_offset = INPUT_COUNT + 1;
        genome.weights[output_offset] = 1.0;

        let mut network = NetworkDecoder.decode(&genome).unwrap();
        let mut inputs = [0.0; INPUT_COUNT];
        inputs[8] = 1.0;
        network.set_inputs(&inputs);
        network.activate();

        let expected = 1.0f64.tanh().tanh();
        assert!((network.outputs()[0] - expected).abs() < 1e-12);
        assert_eq!(network.outputs()[1], 0.0);

        network.reset_state();
        assert_eq!(network.outputs()[0], 0.0);
    }
}
