//! 3x3 board geometry, marks and the board text format

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Board side length
pub const BOARD_SIZE: usize = 3;

/// Number of cells on the board
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// All eight winning lines as (row, col) triples
pub const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)], // top row
    [(1, 0), (1, 1), (1, 2)], // middle row
    [(2, 0), (2, 1), (2, 2)], // bottom row
    [(0, 0), (1, 0), (2, 0)], // left column
    [(0, 1), (1, 1), (2, 1)], // middle column
    [(0, 2), (1, 2), (2, 2)], // right column
    [(0, 0), (1, 1), (2, 2)], // main diagonal
    [(0, 2), (1, 1), (2, 0)], // anti diagonal
];

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player mark. X always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// A (row, column) coordinate on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major raster index (0..9)
    pub fn index(&self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    /// Inverse of [`Move::index`]
    pub fn from_index(index: usize) -> Self {
        Self::new(index / BOARD_SIZE, index % BOARD_SIZE)
    }
}

/// Tic-tac-toe board. `None` is an empty cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Mark>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mv: Move) -> Option<Mark> {
        self.cells[mv.row][mv.col]
    }

    pub fn is_empty_at(&self, mv: Move) -> bool {
        self.get(mv).is_none()
    }

    /// Place a mark. Callers check emptiness first; the match simulator
    /// treats an occupied target as an agent contract violation.
    pub fn place(&mut self, mv: Move, mark: Mark) {
        debug_assert!(self.is_empty_at(mv), "cell {:?} already occupied", mv);
        self.cells[mv.row][mv.col] = Some(mark);
    }

    /// Clear a cell (used by look-ahead code)
    pub fn clear(&mut self, mv: Move) {
        self.cells[mv.row][mv.col] = None;
    }

    /// Number of marks on the board
    pub fn marks_placed(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.marks_placed() == CELL_COUNT
    }

    /// Empty cells in row-major raster order
    pub fn empty_cells(&self) -> impl Iterator<Item = Move> + '_ {
        (0..CELL_COUNT)
            .map(Move::from_index)
            .filter(move |&mv| self.is_empty_at(mv))
    }

    /// Mark owning a complete line, checked in [`LINES`] order
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let [a, b, c] = line.map(|(r, c)| self.cells[r][c]);
            match a {
                Some(mark) if b == Some(mark) && c == Some(mark) => Some(mark),
                _ => None,
            }
        })
    }

    /// Board with `moves` marks placed at random empty cells, alternating X and O
    pub fn random<R: Rng>(moves: usize, rng: &mut R) -> Self {
        assert!(moves <= CELL_COUNT, "cannot place {} marks on a 3x3 board", moves);

        let mut board = Board::new();
        let mut mark = Mark::X;
        for _ in 0..moves {
            let empty: Vec<Move> = board.empty_cells().collect();
            let mv = empty[rng.gen_range(0..empty.len())];
            board.place(mv, mark);
            mark = mark.opponent();
        }
        board
    }
}

// ============================================================================
// TEXT FORMAT
// ============================================================================

/// Error parsing the `X|O|X` board text format
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardParseError {
    #[error("expected 3 rows, found {0}")]
    RowCount(usize),

    #[error("row {row} has {found} cells, expected 3")]
    CellCount { row: usize, found: usize },

    #[error("unknown cell token {0:?}")]
    UnknownToken(String),
}

impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().filter(|l| !l.trim().is_empty()).collect();
        if rows.len() != BOARD_SIZE {
            return Err(BoardParseError::RowCount(rows.len()));
        }

        let mut board = Board::new();
        for (r, line) in rows.iter().enumerate() {
            let tokens: Vec<&str> = line.trim().split('|').collect();
            if tokens.len() != BOARD_SIZE {
                return Err(BoardParseError::CellCount {
                    row: r,
                    found: tokens.len(),
                });
            }
            for (c, token) in tokens.iter().enumerate() {
                board.cells[r][c] = match token.trim() {
                    "X" => Some(Mark::X),
                    "O" => Some(Mark::O),
                    "" | "N" | "_" => None,
                    other => return Err(BoardParseError::UnknownToken(other.to_string())),
                };
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .map(|c| c.map_or(' ', Mark::symbol).to_string())
                .collect();
            write!(f, "{}", line.join("|"))?;
            if r + 1 < BOARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
