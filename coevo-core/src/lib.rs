//! COEVO Core - Tic-tac-toe engine and agents
//!
//! This crate provides the game side of coevolution:
//! - Board geometry, marks and the `X|O|X` text format
//! - The match simulator (one complete game between two agents)
//! - Random and perfect calibration agents
//! - The adapter that turns a decoded decision function into an agent

pub mod board;
pub mod game;
pub mod agent;
pub mod network;

// Re-exports for convenient access
pub use board::{Board, BoardParseError, Mark, Move, BOARD_SIZE, CELL_COUNT, LINES};
pub use game::{play_game, play_to_end, GameRecord, MatchOutcome};
pub use agent::{Agent, PerfectAgent, RandomAgent};
pub use network::{encode_board, DecisionFunction, NetworkAgent, INPUT_COUNT, OUTPUT_COUNT};
