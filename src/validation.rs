//! # Move Validation
//!
//! This module decides whether a proposed move is legal for the side to move
//! and, when it is, produces the resulting board in the same pass.
//!
//! ## Architecture Overview
//!
//! Validation follows the strategy pattern used across the codebase:
//! 1. **MoveRule Trait** - The contract every rule implements
//! 2. **MoveInput Struct** - The board, the side to move, the move and an
//!    optional piece that must continue a multi-jump
//! 3. **RuleSet** - An ordered list of rules; the first failure wins
//!
//! The standard rule set checks, in order:
//! 1. both squares are dark squares on the board
//! 2. the origin holds a piece of the side to move
//! 3. a pending multi-jump is continued by the same piece
//! 4. the destination is empty
//! 5. the movement is a diagonal step (men forward only) or a jump
//! 6. a jump passes over exactly one opposing piece
//!
//! [`RuleSet::apply`] then commits the move on a copy of the board, removing
//! the captured piece and crowning a man that reaches its last row. The input
//! board is never touched, so a rejected move leaves no trace.
//!
//! ## Usage
//! ```
//! use checkers::board::{Board, Coordinate, Side};
//! use checkers::validation::{validate_and_apply, Move};
//!
//! let board = Board::standard();
//! let mv = Move::new(Coordinate::new(1, 2), Coordinate::new(2, 3));
//! let outcome = validate_and_apply(&board, Side::Black, mv).unwrap();
//! assert_eq!(outcome.captured, None);
//! assert!(!outcome.must_continue_jump);
//! ```

use crate::board::{Board, Cell, Coordinate, Side};
use calimero_sdk::serde::Serialize;
use thiserror::Error;

// ============================================================================
// MOVES AND OUTCOMES
// ============================================================================

/// A proposed move from one square to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Coordinate,
    pub to: Coordinate,
}

impl Move {
    pub fn new(from: Coordinate, to: Coordinate) -> Move {
        Move { from, to }
    }

    /// Builds a move from raw request integers
    ///
    /// # Arguments
    /// * `from_x`, `from_y` - Origin square as sent by the client
    /// * `to_x`, `to_y` - Destination square as sent by the client
    ///
    /// # Returns
    /// * `Ok(Move)` - Both squares fit the coordinate type; they may still be
    ///   off the board, which [`CoordinateRule`] reports
    /// * `Err(MoveError::OutOfRange)` - A square cannot be represented at
    ///   all; the error carries the values exactly as sent
    pub fn from_request(
        from_x: u64,
        from_y: u64,
        to_x: u64,
        to_y: u64,
    ) -> Result<Move, MoveError> {
        let square = |x: u64, y: u64| match (u8::try_from(x), u8::try_from(y)) {
            (Ok(x), Ok(y)) => Ok(Coordinate::new(x, y)),
            _ => Err(MoveError::OutOfRange { x, y }),
        };
        Ok(Move::new(square(from_x, from_y)?, square(to_x, to_y)?))
    }

    pub fn delta(&self) -> (i16, i16) {
        self.from.delta(&self.to)
    }

    pub fn is_jump(&self) -> bool {
        let (dx, dy) = self.delta();
        dx.abs() == 2 && dy.abs() == 2
    }

    /// Square jumped over, for a jump
    pub fn midpoint(&self) -> Option<Coordinate> {
        if !self.is_jump() {
            return None;
        }
        Some(Coordinate::new(
            ((u16::from(self.from.x) + u16::from(self.to.x)) / 2) as u8,
            ((u16::from(self.from.y) + u16::from(self.to.y)) / 2) as u8,
        ))
    }
}

/// Reasons a move is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(crate = "calimero_sdk::serde")]
#[serde(tag = "reason", content = "at")]
pub enum MoveError {
    #[error("{0} is not a playable square")]
    InvalidCoordinate(Coordinate),
    #[error("({x}, {y}) is not a playable square")]
    OutOfRange { x: u64, y: u64 },
    #[error("no piece of the side to move at {0}")]
    WrongPiece(Coordinate),
    #[error("destination {0} is occupied")]
    OccupiedDestination(Coordinate),
    #[error("piece at {0} cannot move there")]
    IllegalMovement(Coordinate),
    #[error("no opposing piece to capture at {0}")]
    NothingToCapture(Coordinate),
    #[error("the piece at {0} must continue jumping")]
    MustContinueJump(Coordinate),
}

/// Result of an accepted move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub captured: Option<Coordinate>,
    pub promoted: bool,
    /// The moved piece jumped and can jump again from its new square
    pub must_continue_jump: bool,
}

// ============================================================================
// RULE STRATEGY PATTERN
// ============================================================================

/// A single legality rule
pub trait MoveRule {
    fn check(&self, input: &MoveInput<'_>) -> Result<(), MoveError>;

    /// Name used in diagnostics
    fn name(&self) -> &'static str;
}

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct MoveInput<'a> {
    pub board: &'a Board,
    pub side: Side,
    pub mv: Move,
    /// Piece that has to keep jumping, if a multi-jump is in progress
    pub pending: Option<Coordinate>,
}

impl<'a> MoveInput<'a> {
    pub fn new(board: &'a Board, side: Side, mv: Move) -> Self {
        MoveInput {
            board,
            side,
            mv,
            pending: None,
        }
    }

    pub fn continuing(mut self, pending: Option<Coordinate>) -> Self {
        self.pending = pending;
        self
    }

    fn piece(&self) -> Cell {
        self.board.get(self.mv.from)
    }
}

/// Both squares must be dark squares on the board
pub struct CoordinateRule;

impl MoveRule for CoordinateRule {
    fn check(&self, input: &MoveInput<'_>) -> Result<(), MoveError> {
        for at in [input.mv.from, input.mv.to] {
            if !at.is_valid() || !at.is_dark() {
                return Err(MoveError::InvalidCoordinate(at));
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CoordinateRule"
    }
}

/// The origin must hold a piece of the side to move
pub struct OwnershipRule;

impl MoveRule for OwnershipRule {
    fn check(&self, input: &MoveInput<'_>) -> Result<(), MoveError> {
        if input.piece().side() != Some(input.side) {
            return Err(MoveError::WrongPiece(input.mv.from));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "OwnershipRule"
    }
}

/// A pending multi-jump must be continued by the same piece, with a jump
pub struct ContinuationRule;

impl MoveRule for ContinuationRule {
    fn check(&self, input: &MoveInput<'_>) -> Result<(), MoveError> {
        match input.pending {
            Some(at) if input.mv.from != at || !input.mv.is_jump() => {
                Err(MoveError::MustContinueJump(at))
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "ContinuationRule"
    }
}

/// The destination must be empty
pub struct VacancyRule;

impl MoveRule for VacancyRule {
    fn check(&self, input: &MoveInput<'_>) -> Result<(), MoveError> {
        if !input.board.get(input.mv.to).is_empty() {
            return Err(MoveError::OccupiedDestination(input.mv.to));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "VacancyRule"
    }
}

/// Diagonal step or jump; men only move towards the opponent's side
pub struct GeometryRule;

impl MoveRule for GeometryRule {
    fn check(&self, input: &MoveInput<'_>) -> Result<(), MoveError> {
        let (dx, dy) = input.mv.delta();
        let diagonal = dx.abs() == dy.abs() && matches!(dx.abs(), 1 | 2);
        let forward = dy.signum() == i16::from(input.side.forward());
        let piece = input.piece();

        let allowed = match piece {
            Cell::BlackKing | Cell::RedKing => diagonal,
            Cell::BlackMan | Cell::RedMan => diagonal && forward,
            Cell::Empty => false,
        };
        if !allowed {
            return Err(MoveError::IllegalMovement(input.mv.from));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "GeometryRule"
    }
}

/// A jump must pass over an opposing piece
pub struct CaptureRule;

impl MoveRule for CaptureRule {
    fn check(&self, input: &MoveInput<'_>) -> Result<(), MoveError> {
        if let Some(mid) = input.mv.midpoint() {
            if input.board.get(mid).side() != Some(input.side.opponent()) {
                return Err(MoveError::NothingToCapture(mid));
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CaptureRule"
    }
}

/// Ordered collection of rules
pub struct RuleSet {
    rules: Vec<Box<dyn MoveRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet { rules: Vec::new() }
    }

    pub fn add_rule(mut self, rule: Box<dyn MoveRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rules of the game, in the order they are reported
    pub fn standard() -> Self {
        RuleSet::new()
            .add_rule(Box::new(CoordinateRule))
            .add_rule(Box::new(OwnershipRule))
            .add_rule(Box::new(ContinuationRule))
            .add_rule(Box::new(VacancyRule))
            .add_rule(Box::new(GeometryRule))
            .add_rule(Box::new(CaptureRule))
    }

    pub fn check(&self, input: &MoveInput<'_>) -> Result<(), MoveError> {
        for rule in &self.rules {
            rule.check(input)?;
        }
        Ok(())
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Checks every rule, then commits the move on a copy of the board
    pub fn apply(&self, input: &MoveInput<'_>) -> Result<MoveOutcome, MoveError> {
        self.check(input)?;

        let Move { from, to } = input.mv;
        let mut board = input.board.clone();
        let mut piece = board.get(from);
        board.set(from, Cell::Empty);

        let captured = input.mv.midpoint();
        if let Some(mid) = captured {
            board.set(mid, Cell::Empty);
        }

        let promoted = !piece.is_king() && to.y == input.side.crowning_row();
        if promoted {
            piece = Cell::king(input.side);
        }
        board.set(to, piece);

        // Crowning ends the move even if another jump is available.
        let must_continue_jump =
            captured.is_some() && !promoted && !jumps_from_with(self, &board, to).is_empty();

        Ok(MoveOutcome {
            board,
            captured,
            promoted,
            must_continue_jump,
        })
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::standard()
    }
}

// ============================================================================
// PUBLIC HELPERS
// ============================================================================

/// Validates `mv` for `side` with the standard rules and returns the outcome
pub fn validate_and_apply(board: &Board, side: Side, mv: Move) -> Result<MoveOutcome, MoveError> {
    RuleSet::standard().apply(&MoveInput::new(board, side, mv))
}

/// Every legal move of the piece at `from`, steps and jumps alike
pub fn moves_from(board: &Board, from: Coordinate) -> Vec<Move> {
    moves_from_with(&RuleSet::standard(), board, from)
}

/// Every legal jump of the piece at `from`
pub fn jumps_from(board: &Board, from: Coordinate) -> Vec<Move> {
    jumps_from_with(&RuleSet::standard(), board, from)
}

/// Every legal move of `side`
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let rules = RuleSet::standard();
    board
        .pieces(side)
        .flat_map(|from| moves_from_with(&rules, board, from))
        .collect()
}

pub fn has_legal_move(board: &Board, side: Side) -> bool {
    let rules = RuleSet::standard();
    board
        .pieces(side)
        .any(|from| !moves_from_with(&rules, board, from).is_empty())
}

fn moves_from_with(rules: &RuleSet, board: &Board, from: Coordinate) -> Vec<Move> {
    let Some(side) = board.get(from).side() else {
        return Vec::new();
    };
    let mut moves = Vec::new();
    for distance in [1i8, 2] {
        for (dx, dy) in [(-1i8, -1i8), (1, -1), (-1, 1), (1, 1)] {
            let Some(to) = from.offset(dx * distance, dy * distance) else {
                continue;
            };
            let mv = Move::new(from, to);
            if rules.check(&MoveInput::new(board, side, mv)).is_ok() {
                moves.push(mv);
            }
        }
    }
    moves
}

fn jumps_from_with(rules: &RuleSet, board: &Board, from: Coordinate) -> Vec<Move> {
    moves_from_with(rules, board, from)
        .into_iter()
        .filter(Move::is_jump)
        .collect()
}
