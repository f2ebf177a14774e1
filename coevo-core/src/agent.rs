//! Move-choosing agents: the `Agent` trait plus the random and perfect
//! calibration opponents

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::board::{Board, Mark, Move};

/// Anything that can pick a move for `mark` on a non-terminal board.
///
/// Returning `None` is only allowed when the board is full.
pub trait Agent {
    fn choose_move(&mut self, board: &Board, mark: Mark) -> Option<Move>;
}

// ============================================================================
// RANDOM AGENT
// ============================================================================

/// Picks uniformly among the empty cells
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn choose_move(&mut self, board: &Board, _mark: Mark) -> Option<Move> {
        let empty: Vec<Move> = board.empty_cells().collect();
        empty.choose(&mut self.rng).copied()
    }
}

// ============================================================================
// PERFECT AGENT
// ============================================================================

/// Column-major scan (column outer, row inner). Ties between equally good
/// cells go to the first cell in this order.
const SCAN_ORDER: [Move; 9] = [
    Move::new(0, 0),
    Move::new(1, 0),
    Move::new(2, 0),
    Move::new(0, 1),
    Move::new(1, 1),
    Move::new(2, 1),
    Move::new(0, 2),
    Move::new(1, 2),
    Move::new(2, 2),
];

const OPENING_CORNER: Move = Move::new(0, 0);
const CENTER: Move = Move::new(1, 1);

/// Deterministic agent that never loses.
///
/// Priority: fixed corner opening, center reply (corner if the center is
/// taken), immediate win, forced block, then the safest cell with the most
/// immediately winning follow-ups.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerfectAgent;

impl PerfectAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Agent for PerfectAgent {
    fn choose_move(&mut self, board: &Board, mark: Mark) -> Option<Move> {
        let mut board = *board;

        match board.marks_placed() {
            0 => return Some(OPENING_CORNER),
            1 if board.is_empty_at(CENTER) => return Some(CENTER),
            1 => return Some(OPENING_CORNER),
            _ => {}
        }

        if let Some(mv) = completing_move(&mut board, mark) {
            return Some(mv);
        }
        if let Some(mv) = completing_move(&mut board, mark.opponent()) {
            return Some(mv);
        }

        best_positional_move(&mut board, mark)
    }
}

/// First empty cell (scan order) that completes a line for `mark`
fn completing_move(board: &mut Board, mark: Mark) -> Option<Move> {
    SCAN_ORDER
        .iter()
        .copied()
        .find(|&mv| board.is_empty_at(mv) && wins_with(board, mv, mark))
}

/// Cell that keeps the game safe and maximises our immediate threats
fn best_positional_move(board: &mut Board, mark: Mark) -> Option<Move> {
    let empty: Vec<Move> = SCAN_ORDER
        .iter()
        .copied()
        .filter(|&mv| board.is_empty_at(mv))
        .collect();

    let safe: Vec<Move> = empty
        .iter()
        .copied()
        .filter(|&mv| {
            board.place(mv, mark);
            let losing = can_force_win(board, mark.opponent(), mark.opponent());
            board.clear(mv);
            !losing
        })
        .collect();
    let candidates = if safe.is_empty() { empty } else { safe };

    let mut best = None;
    let mut best_threats = -1i32;
    for mv in candidates {
        board.place(mv, mark);
        let threats = SCAN_ORDER
            .iter()
            .filter(|&&reply| board.is_empty_at(reply) && wins_with(board, reply, mark))
            .count() as i32;
        board.clear(mv);

        if threats > best_threats {
            best = Some(mv);
            best_threats = threats;
        }
    }
    best
}

/// Would placing `mark` at `mv` win the game?
fn wins_with(board: &mut Board, mv: Move, mark: Mark) -> bool {
    board.place(mv, mark);
    let winner = board.winner();
    board.clear(mv);
    winner == Some(mark)
}

/// Can `target` force a win from this position with `to_move` on turn?
fn can_force_win(board: &mut Board, to_move: Mark, target: Mark) -> bool {
    if let Some(winner) = board.winner() {
        return winner == target;
    }
    if board.is_full() {
        return false;
    }

    let cells: Vec<Move> = board.empty_cells().collect();
    let mut explore = |mv: Move| {
        board.place(mv, to_move);
        let result = can_force_win(board, to_move.opponent(), target);
        board.clear(mv);
        result
    };

    if to_move == target {
        cells.into_iter().any(&mut explore)
    } else {
        cells.into_iter().all(&mut explore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::play_to_end;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn test_random_agent_picks_empty_cell() {
        let mut agent = RandomAgent::with_seed(3);
        let b = board("X|O|X\nO| |X\nO|X|O");
        for _ in 0..10 {
            assert_eq!(agent.choose_move(&b, Mark::O), Some(Move::new(1, 1)));
        }
    }

    #[test]
    fn test_random_agent_full_board() {
        let mut agent = RandomAgent::with_seed(3);
        let b = board("X|O|X\nX|O|O\nO|X|X");
        assert_eq!(agent.choose_move(&b, Mark::X), None);
    }

    #[test]
    fn test_random_agent_seeded_is_reproducible() {
        let b = Board::new();
        let mut a = RandomAgent::with_seed(11);
        let mut c = RandomAgent::with_seed(11);
        for _ in 0..5 {
            assert_eq!(a.choose_move(&b, Mark::X), c.choose_move(&b, Mark::X));
        }
    }

    #[test]
    fn test_perfect_opening_moves() {
        let mut agent = PerfectAgent::new();
        assert_eq!(agent.choose_move(&Board::new(), Mark::X), Some(Move::new(0, 0)));

        let corner_taken = board("X| | \n | | \n | | ");
        assert_eq!(agent.choose_move(&corner_taken, Mark::O), Some(Move::new(1, 1)));

        let center_taken = board(" | | \n |X| \n | | ");
        assert_eq!(agent.choose_move(&center_taken, Mark::O), Some(Move::new(0, 0)));
    }

    #[test]
    fn test_perfect_takes_win_over_block() {
        let mut agent = PerfectAgent::new();
        // X can win at (0,2); O can win at (1,2).
        let b = board("X|X| \nO|O| \n | | ");
        assert_eq!(agent.choose_move(&b, Mark::X), Some(Move::new(0, 2)));
        assert_eq!(agent.choose_move(&b, Mark::O), Some(Move::new(1, 2)));
    }

    #[test]
    fn test_perfect_avoids_fork_reply() {
        let mut agent = PerfectAgent::new();
        // Opposite corners against the center: a corner reply loses to a
        // fork, so O has to take an edge. (1,0) is the first safe cell.
        let b = board("X| | \n |O| \n | |X");
        assert_eq!(agent.choose_move(&b, Mark::O), Some(Move::new(1, 0)));
    }

    #[test]
    fn test_perfect_never_loses_to_random() {
        let mut perfect = PerfectAgent::new();
        for seed in 0..500 {
            let mut random = RandomAgent::with_seed(seed);
            let outcome = play_to_end(&mut perfect, &mut random);
            assert!(!outcome.is_loss_for(Mark::X), "lost as X with seed {}", seed);

            let mut random = RandomAgent::with_seed(seed + 1_000_000);
            let outcome = play_to_end(&mut random, &mut perfect);
            assert!(!outcome.is_loss_for(Mark::O), "lost as O with seed {}", seed);
        }
    }

    #[test]
    fn test_can_force_win() {
        let opposite_corners = board("X| | \n |O| \n | |X");

        let mut corner_reply = opposite_corners;
        corner_reply.place(Move::new(0, 2), Mark::O);
        assert!(can_force_win(&mut corner_reply, Mark::X, Mark::X));

        let mut edge_reply = opposite_corners;
        edge_reply.place(Move::new(0, 1), Mark::O);
        assert!(!can_force_win(&mut edge_reply, Mark::X, Mark::X));

        // An edge answer to a corner opening is lost for O.
        let mut edge_answer = board("X| | \n | |O\n | | ");
        assert!(can_force_win(&mut edge_answer, Mark::X, Mark::X));

        let mut center_answer = board("X| | \n |O| \n | | ");
        assert!(!can_force_win(&mut center_answer, Mark::X, Mark::X));
    }
}
