//! # Board Module
//!
//! This module contains all types and functionality related to the checkers
//! board: sides, cells, coordinates and the compact textual form the board is
//! persisted in.
//!
//! ## Key Types
//!
//! - **`Side`** - One of the two players' colours (Black, Red)
//! - **`Cell`** - The content of a square (empty, man or king of either side)
//! - **`Coordinate`** - A position on the board with x,y coordinates
//! - **`Board`** - The 8x8 grid of cells
//!
//! ## Board Layout
//!
//! - Coordinates are 0-indexed (0-7 for both x and y)
//! - A square is dark (playable) when `x + y` is odd; light squares stay empty
//! - Black starts on rows 0-2 and moves towards row 7
//! - Red starts on rows 5-7 and moves towards row 0
//!
//! ## Textual Form
//!
//! Rows are written from y = 0 to y = 7 and joined by `|`. Each row holds 8
//! glyphs: `*` for an empty square (light squares use the same filler),
//! `b`/`B` for a black man/king and `r`/`R` for a red man/king.
//!
//! ```
//! use checkers::board::Board;
//!
//! let board = Board::standard();
//! assert_eq!(
//!     board.to_string(),
//!     "*b*b*b*b|b*b*b*b*|*b*b*b*b|********|********|r*r*r*r*|*r*r*r*r|r*r*r*r*"
//! );
//! assert_eq!(board.to_string().parse::<Board>().unwrap(), board);
//! ```

use std::fmt;
use std::str::FromStr;

use calimero_sdk::borsh::{BorshDeserialize, BorshSerialize};
use calimero_sdk::serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// BOARD MODULE - Everything related to the board and its squares
// ============================================================================

/// Width and height of the board
pub const BOARD_SIZE: u8 = 8;

/// Number of men each side starts with
pub const PIECES_PER_SIDE: usize = 12;

/// Separator between rows in the textual form
pub const ROW_SEPARATOR: char = '|';

/// Glyph of an empty square, also written for light squares
pub const EMPTY_GLYPH: char = '*';

/// Errors raised by board access and decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("coordinate out of bounds: ({x}, {y})")]
    OutOfBounds { x: u8, y: u8 },
    #[error("malformed board: {0}")]
    Malformed(&'static str),
}

/// One of the two sides of a game
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub enum Side {
    /// Starts on rows 0-2 and moves first
    Black,
    /// Starts on rows 5-7
    Red,
}

impl Side {
    /// The other side
    pub fn opponent(self) -> Side {
        match self {
            Side::Black => Side::Red,
            Side::Red => Side::Black,
        }
    }

    /// Direction of travel along the y axis for this side's men
    pub fn forward(self) -> i8 {
        match self {
            Side::Black => 1,
            Side::Red => -1,
        }
    }

    /// Row on which this side's men are crowned
    pub fn crowning_row(self) -> u8 {
        match self {
            Side::Black => BOARD_SIZE - 1,
            Side::Red => 0,
        }
    }

    /// Single-letter code used for the stored turn (`b` or `r`)
    pub fn code(self) -> &'static str {
        match self {
            Side::Black => "b",
            Side::Red => "r",
        }
    }

    /// Parses a code produced by [`Side::code`]
    pub fn from_code(code: &str) -> Option<Side> {
        match code {
            "b" => Some(Side::Black),
            "r" => Some(Side::Red),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Represents a position on the board
///
/// A coordinate is a plain pair and may lie outside the board: moves arrive
/// from clients as raw integers and bounds are a rule of the move validator,
/// not of the type. Use [`Coordinate::is_valid`] and [`Coordinate::is_dark`]
/// to check them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct Coordinate {
    /// The x-coordinate (column, 0-7)
    pub x: u8,
    /// The y-coordinate (row, 0-7)
    pub y: u8,
}

impl Coordinate {
    /// Creates a new coordinate; no bounds check is made
    pub const fn new(x: u8, y: u8) -> Coordinate {
        Coordinate { x, y }
    }

    /// Whether the coordinate lies on the 8x8 board
    pub fn is_valid(&self) -> bool {
        self.x < BOARD_SIZE && self.y < BOARD_SIZE
    }

    /// Whether this is a dark (playable) square, i.e. `x + y` is odd
    pub fn is_dark(&self) -> bool {
        (u16::from(self.x) + u16::from(self.y)) % 2 == 1
    }

    /// Returns the coordinate shifted by `(dx, dy)`, if it stays on the board
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Coordinate> {
        let x = i16::from(self.x) + i16::from(dx);
        let y = i16::from(self.y) + i16::from(dy);
        let size = i16::from(BOARD_SIZE);
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Some(Coordinate::new(x as u8, y as u8))
        } else {
            None
        }
    }

    /// Signed `(dx, dy)` from `self` to `other`
    pub fn delta(&self, other: &Coordinate) -> (i16, i16) {
        (
            i16::from(other.x) - i16::from(self.x),
            i16::from(other.y) - i16::from(self.y),
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the content of a square
///
/// Every rule switches exhaustively over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    BlackMan,
    BlackKing,
    RedMan,
    RedKing,
}

impl Cell {
    /// Uncrowned piece of `side`
    pub fn man(side: Side) -> Cell {
        match side {
            Side::Black => Cell::BlackMan,
            Side::Red => Cell::RedMan,
        }
    }

    /// Crowned piece of `side`
    pub fn king(side: Side) -> Cell {
        match side {
            Side::Black => Cell::BlackKing,
            Side::Red => Cell::RedKing,
        }
    }

    /// Owner of the piece, `None` for an empty square
    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::BlackMan | Cell::BlackKing => Some(Side::Black),
            Cell::RedMan | Cell::RedKing => Some(Side::Red),
        }
    }

    pub fn is_king(self) -> bool {
        matches!(self, Cell::BlackKing | Cell::RedKing)
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Character used in the textual board form
    ///
    /// # Returns
    /// * `b` / `B` - Black man / king
    /// * `r` / `R` - Red man / king
    /// * `*` - Empty square
    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => EMPTY_GLYPH,
            Cell::BlackMan => 'b',
            Cell::BlackKing => 'B',
            Cell::RedMan => 'r',
            Cell::RedKing => 'R',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Cell> {
        match glyph {
            EMPTY_GLYPH => Some(Cell::Empty),
            'b' => Some(Cell::BlackMan),
            'B' => Some(Cell::BlackKing),
            'r' => Some(Cell::RedMan),
            'R' => Some(Cell::RedKing),
            _ => None,
        }
    }
}

/// Represents the 8x8 checkers board
///
/// Cells are stored row-major as `cells[y][x]`. The persisted form is the
/// string produced by `Display` and read back by `FromStr`; the two are
/// exact inverses for every board reachable by play.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Board {
    /// Board with no pieces
    pub fn empty() -> Board {
        Board {
            cells: [[Cell::Empty; BOARD_SIZE as usize]; BOARD_SIZE as usize],
        }
    }

    /// Opening layout: black men on rows 0-2, red men on rows 5-7, dark
    /// squares only.
    pub fn standard() -> Board {
        let mut board = Board::empty();
        for y in 0..BOARD_SIZE {
            let cell = match y {
                0..=2 => Cell::man(Side::Black),
                5..=7 => Cell::man(Side::Red),
                _ => continue,
            };
            for x in 0..BOARD_SIZE {
                let at = Coordinate::new(x, y);
                if at.is_dark() {
                    board.set(at, cell);
                }
            }
        }
        board
    }

    /// Bounds-checked lookup
    pub fn piece_at(&self, x: u8, y: u8) -> Result<Cell, BoardError> {
        if !Coordinate::new(x, y).is_valid() {
            return Err(BoardError::OutOfBounds { x, y });
        }
        Ok(self.cells[y as usize][x as usize])
    }

    /// Lookup for coordinates already known to be on the board.
    /// Off-board coordinates read as empty.
    pub fn get(&self, at: Coordinate) -> Cell {
        self.piece_at(at.x, at.y).unwrap_or(Cell::Empty)
    }

    /// Writes a cell; off-board coordinates are ignored.
    pub fn set(&mut self, at: Coordinate, cell: Cell) {
        if at.is_valid() {
            self.cells[at.y as usize][at.x as usize] = cell;
        }
    }

    /// Coordinates of every piece belonging to `side`, row by row
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = Coordinate> + '_ {
        (0..BOARD_SIZE)
            .flat_map(|y| (0..BOARD_SIZE).map(move |x| Coordinate::new(x, y)))
            .filter(move |at| self.get(*at).side() == Some(side))
    }

    /// Number of pieces `side` has left
    pub fn count(&self, side: Side) -> usize {
        self.pieces(side).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.iter().enumerate() {
            if y > 0 {
                write!(f, "{ROW_SEPARATOR}")?;
            }
            for cell in row {
                write!(f, "{}", cell.glyph())?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Board, BoardError> {
        let rows: Vec<&str> = s.split(ROW_SEPARATOR).collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(BoardError::Malformed("expected 8 rows"));
        }

        let mut board = Board::empty();
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != BOARD_SIZE as usize {
                return Err(BoardError::Malformed("expected 8 squares per row"));
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell = Cell::from_glyph(glyph).ok_or(BoardError::Malformed("unknown glyph"))?;
                let at = Coordinate::new(x as u8, y as u8);
                if !cell.is_empty() && !at.is_dark() {
                    return Err(BoardError::Malformed("piece on a light square"));
                }
                board.set(at, cell);
            }
        }

        for side in [Side::Black, Side::Red] {
            if board.count(side) > PIECES_PER_SIDE {
                return Err(BoardError::Malformed("too many pieces"));
            }
        }
        Ok(board)
    }
}
