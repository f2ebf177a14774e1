//! Match simulator - plays one complete game between two agents

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::board::{Board, Mark, Move, CELL_COUNT};

/// Zero-based ply from which the board is checked for a winner. A line needs
/// at least five marks on the board, so earlier checks are wasted work.
const FIRST_WIN_CHECK_PLY: usize = 3;

/// Result of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    XWins,
    OWins,
    Draw,
}

impl MatchOutcome {
    /// Winning mark, `None` for a draw
    pub fn winner(self) -> Option<Mark> {
        match self {
            MatchOutcome::XWins => Some(Mark::X),
            MatchOutcome::OWins => Some(Mark::O),
            MatchOutcome::Draw => None,
        }
    }

    pub fn from_winner(winner: Option<Mark>) -> Self {
        match winner {
            Some(Mark::X) => MatchOutcome::XWins,
            Some(Mark::O) => MatchOutcome::OWins,
            None => MatchOutcome::Draw,
        }
    }

    /// True if `mark` lost this game
    pub fn is_loss_for(self, mark: Mark) -> bool {
        self.winner() == Some(mark.opponent())
    }
}

/// Full record of a played game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    pub outcome: MatchOutcome,
    /// Moves in play order, X first
    pub moves: Vec<Move>,
    /// Board when the game stopped
    pub board: Board,
}

/// Play a game to completion and return only the outcome.
///
/// `first` plays X and moves first, `second` plays O.
pub fn play_to_end(first: &mut dyn Agent, second: &mut dyn Agent) -> MatchOutcome {
    play_game(first, second).outcome
}

/// Play a game to completion, keeping the move history.
///
/// # Panics
/// Panics if an agent returns no move on a non-full board or targets an
/// occupied cell. Both indicate a broken agent, not a recoverable state.
pub fn play_game(first: &mut dyn Agent, second: &mut dyn Agent) -> GameRecord {
    let mut board = Board::new();
    let mut moves = Vec::with_capacity(CELL_COUNT);
    let mut winner = None;

    for ply in 0..CELL_COUNT {
        let mark = if ply % 2 == 0 { Mark::X } else { Mark::O };
        let agent: &mut dyn Agent = match mark {
            Mark::X => &mut *first,
            Mark::O => &mut *second,
        };

        let mv = agent
            .choose_move(&board, mark)
            .unwrap_or_else(|| panic!("agent playing {:?} returned no move on\n{}", mark, board));
        assert!(
            mv.row < 3 && mv.col < 3 && board.is_empty_at(mv),
            "agent playing {:?} made an illegal move {:?} on\n{}",
            mark,
            mv,
            board
        );

        board.place(mv, mark);
        moves.push(mv);

        if ply >= FIRST_WIN_CHECK_PLY {
            winner = board.winner();
            if winner.is_some() {
                break;
            }
        }
    }

    GameRecord {
        outcome: MatchOutcome::from_winner(winner),
        moves,
        board,
    }
}
