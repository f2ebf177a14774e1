//! Adapter from a decoded decision function (neural network phenome) to an
//! [`Agent`]

use crate::agent::Agent;
use crate::board::{Board, Mark, Move, CELL_COUNT};

/// Inputs the adapter feeds: one per cell, row-major
pub const INPUT_COUNT: usize = CELL_COUNT;

/// Outputs the adapter reads: one score per cell, row-major
pub const OUTPUT_COUNT: usize = CELL_COUNT;

/// Runnable form of a genome, as produced by a decoder.
///
/// The adapter drives it as reset, set inputs, activate, read outputs.
pub trait DecisionFunction {
    /// Clear any recurrent or cached activation state
    fn reset_state(&mut self);

    /// Load the input signal array
    fn set_inputs(&mut self, inputs: &[f64; INPUT_COUNT]);

    /// Propagate inputs to outputs
    fn activate(&mut self);

    /// Output signal array; at least [`OUTPUT_COUNT`] entries
    fn outputs(&self) -> &[f64];
}

impl<D: DecisionFunction + ?Sized> DecisionFunction for &mut D {
    fn reset_state(&mut self) {
        (**self).reset_state()
    }

    fn set_inputs(&mut self, inputs: &[f64; INPUT_COUNT]) {
        (**self).set_inputs(inputs)
    }

    fn activate(&mut self) {
        (**self).activate()
    }

    fn outputs(&self) -> &[f64] {
        (**self).outputs()
    }
}

impl<D: DecisionFunction + ?Sized> DecisionFunction for Box<D> {
    fn reset_state(&mut self) {
        (**self).reset_state()
    }

    fn set_inputs(&mut self, inputs: &[f64; INPUT_COUNT]) {
        (**self).set_inputs(inputs)
    }

    fn activate(&mut self) {
        (**self).activate()
    }

    fn outputs(&self) -> &[f64] {
        (**self).outputs()
    }
}

/// Encode the board from `mark`'s point of view: +1 own, -1 opponent, 0 empty
pub fn encode_board(board: &Board, mark: Mark) -> [f64; INPUT_COUNT] {
    let mut inputs = [0.0; INPUT_COUNT];
    for (i, input) in inputs.iter_mut().enumerate() {
        *input = match board.get(Move::from_index(i)) {
            Some(m) if m == mark => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        };
    }
    inputs
}

/// Agent backed by a decision function
pub struct NetworkAgent<D> {
    network: D,
}

impl<D: DecisionFunction> NetworkAgent<D> {
    pub fn new(network: D) -> Self {
        Self { network }
    }

    pub fn into_inner(self) -> D {
        self.network
    }
}

impl<D: DecisionFunction> Agent for NetworkAgent<D> {
    /// Highest-scoring empty cell. Ties go to the first cell in raster order.
    fn choose_move(&mut self, board: &Board, mark: Mark) -> Option<Move> {
        self.network.reset_state();
        self.network.set_inputs(&encode_board(board, mark));
        self.network.activate();

        let outputs = self.network.outputs();
        let mut best: Option<(Move, f64)> = None;
        for mv in board.empty_cells() {
            let score = outputs.get(mv.index()).copied().unwrap_or(f64::NEG_INFINITY);
            match best {
                Some((_, max)) if !(score > max) => {}
                _ => best = Some((mv, score)),
            }
        }
        best.map(|(mv, _)| mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ignores its inputs and reports fixed outputs
    struct FixedOutputs {
        outputs: [f64; OUTPUT_COUNT],
        last_inputs: [f64; INPUT_COUNT],
        resets: usize,
    }

    impl FixedOutputs {
        fn new(outputs: [f64; OUTPUT_COUNT]) -> Self {
            Self {
                outputs,
                last_inputs: [0.0; INPUT_COUNT],
                resets: 0,
            }
        }
    }

    impl DecisionFunction for FixedOutputs {
        fn reset_state(&mut self) {
            self.resets += 1;
        }

        fn set_inputs(&mut self, inputs: &[f64; INPUT_COUNT]) {
            self.last_inputs = *inputs;
        }

        fn activate(&mut self) {}

        fn outputs(&self) -> &[f64] {
            &self.outputs
        }
    }

    #[test]
    fn test_encode_board_perspective() {
        let board: Board = "X|O| \n | | \n | |X".parse().unwrap();
        let as_x = encode_board(&board, Mark::X);
        let as_o = encode_board(&board, Mark::O);

        assert_eq!(as_x, [1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(as_o, [-1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_picks_highest_empty_cell() {
        let board: Board = " | | \n |X| \n | | ".parse().unwrap();
        // Center scores highest but is taken.
        let outputs = [0.1, 0.2, 0.3, 0.4, 0.9, 0.8, 0.0, 0.0, 0.0];
        let mut agent = NetworkAgent::new(FixedOutputs::new(outputs));

        assert_eq!(agent.choose_move(&board, Mark::O), Some(Move::new(1, 2)));

        let network = agent.into_inner();
        assert_eq!(network.resets, 1);
        assert_eq!(network.last_inputs[4], -1.0);
    }

    #[test]
    fn test_ties_prefer_first_raster_cell() {
        let board: Board = "X| | \n | | \n | | ".parse().unwrap();
        let mut agent = NetworkAgent::new(FixedOutputs::new([0.5; OUTPUT_COUNT]));
        assert_eq!(agent.choose_move(&board, Mark::O), Some(Move::new(0, 1)));
    }

    #[test]
    fn test_full_board_has_no_move() {
        let board: Board = "X|O|X\nX|O|O\nO|X|X".parse().unwrap();
        let mut agent = NetworkAgent::new(FixedOutputs::new([0.5; OUTPUT_COUNT]));
        assert_eq!(agent.choose_move(&board, Mark::X), None);
    }

    #[test]
    fn test_borrowed_network_is_reusable() {
        let board = Board::new();
        let mut network = FixedOutputs::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        for _ in 0..3 {
            let mut agent = NetworkAgent::new(&mut network);
            assert_eq!(agent.choose_move(&board, Mark::X), Some(Move::new(2, 2)));
        }
        assert_eq!(network.resets, 3);
    }
}
