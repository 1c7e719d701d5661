//! # Game Module
//!
//! This module contains the game session: the board, whose turn it is, the
//! two players, the deadline and the outcome of a single game.
//!
//! ## Key Types
//!
//! - **`GameSession`** - One game between a black and a red player
//! - **`Winner`** - Outcome marker as persisted (`*`, `b`, `r`, `d`)
//! - **`SessionState`** - Lifecycle view derived from the winner
//!
//! ## Game Flow
//!
//! 1. **Creation**: standard opening layout, black to move
//! 2. **Moves**: the player on turn moves; the turn passes unless the moved
//!    piece jumped and can jump again, in which case the same piece must
//!    continue in the next request
//! 3. **Win**: the mover wins when the opponent has no piece left, or no
//!    legal move once the turn passes
//! 4. **Forfeit**: a game whose deadline has passed is lost by the side on
//!    turn
//!
//! A session is never mutated by a failed request: every check runs before
//! the first field is written.

use crate::board::{Board, Coordinate, Side};
use crate::store::{StoredGame, Timestamp};
use crate::validation::{has_legal_move, Move, MoveInput, RuleSet};
use crate::GameError;
use calimero_sdk::serde::Serialize;

pub const NOT_A_PLAYER: &str = "not a player";
pub const NOT_YOUR_TURN: &str = "not your turn";

/// Outcome marker of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(crate = "calimero_sdk::serde")]
pub enum Winner {
    None,
    Black,
    Red,
    Draw,
}

impl Winner {
    /// Persisted code: `*`, `b`, `r` or `d`
    pub fn code(self) -> &'static str {
        match self {
            Winner::None => "*",
            Winner::Black => "b",
            Winner::Red => "r",
            Winner::Draw => "d",
        }
    }

    pub fn from_code(code: &str) -> Option<Winner> {
        match code {
            "*" => Some(Winner::None),
            "b" => Some(Winner::Black),
            "r" => Some(Winner::Red),
            "d" => Some(Winner::Draw),
            _ => None,
        }
    }
}

impl From<Side> for Winner {
    fn from(side: Side) -> Winner {
        match side {
            Side::Black => Winner::Black,
            Side::Red => Winner::Red,
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Won(Side),
    /// The other side ran out of time
    Forfeited { winner: Side },
    Drawn,
}

/// What an accepted move did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub captured: Option<Coordinate>,
    pub promoted: bool,
    pub must_continue_jump: bool,
    pub winner: Winner,
}

/// A single game between two players
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub index: u64,
    pub board: Board,
    pub turn: Side,
    pub creator: String,
    pub black: String,
    pub red: String,
    pub winner: Winner,
    pub forfeited: bool,
    pub move_count: u64,
    pub deadline: Timestamp,
    /// Piece that must keep jumping before the turn passes
    pub pending_jump: Option<Coordinate>,
}

impl GameSession {
    /// Starts a game in the standard opening with black to move
    ///
    /// # Arguments
    /// * `index` - Index allocated by the ledger
    /// * `creator` - Identifier of whoever created the game
    /// * `black`, `red` - Identifiers of the two players; they may be equal
    /// * `deadline` - Time by which black must make the first move
    pub fn new(
        index: u64,
        creator: String,
        black: String,
        red: String,
        deadline: Timestamp,
    ) -> GameSession {
        GameSession {
            index,
            board: Board::standard(),
            turn: Side::Black,
            creator,
            black,
            red,
            winner: Winner::None,
            forfeited: false,
            move_count: 0,
            deadline,
            pending_jump: None,
        }
    }

    pub fn game_index(&self) -> String {
        self.index.to_string()
    }

    /// Lifecycle view of the session
    pub fn state(&self) -> SessionState {
        match self.winner {
            Winner::None => SessionState::InProgress,
            Winner::Draw => SessionState::Drawn,
            Winner::Black | Winner::Red => {
                let side = if self.winner == Winner::Black {
                    Side::Black
                } else {
                    Side::Red
                };
                if self.forfeited {
                    SessionState::Forfeited { winner: side }
                } else {
                    SessionState::Won(side)
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner != Winner::None
    }

    /// Colour `player` plays. Someone registered on both sides plays
    /// whichever side is on turn.
    pub fn side_of(&self, player: &str) -> Option<Side> {
        match (player == self.black, player == self.red) {
            (true, true) => Some(self.turn),
            (true, false) => Some(Side::Black),
            (false, true) => Some(Side::Red),
            (false, false) => None,
        }
    }

    /// Checks that `player` may move now and returns the side they move.
    ///
    /// # Errors
    /// * `Forbidden(NOT_A_PLAYER)` - `player` is neither black nor red
    /// * `Forbidden(NOT_YOUR_TURN)` - the other side is on turn
    /// * `Finished` - the game already has a winner
    pub fn authorize(&self, player: &str) -> Result<Side, GameError> {
        let side = self
            .side_of(player)
            .ok_or(GameError::Forbidden(NOT_A_PLAYER))?;
        if side != self.turn {
            return Err(GameError::Forbidden(NOT_YOUR_TURN));
        }
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        Ok(side)
    }

    /// Plays `mv` for `player`
    ///
    /// The turn passes to the opponent unless the moved piece jumped and can
    /// jump again, in which case [`GameSession::pending_jump`] is set and the
    /// same player moves next.
    ///
    /// # Arguments
    /// * `player` - Identifier of the requesting player
    /// * `mv` - The move to play
    /// * `next_deadline` - Deadline stored when the move is accepted
    ///
    /// # Returns
    /// * `Ok(MoveResult)` - The captured square, crowning, continuation and
    ///   the winner after the move
    /// * `Err(GameError)` - Any error of [`GameSession::authorize`], or
    ///   `Invalid` when the move breaks a rule. The session is unchanged.
    ///
    /// # Example
    /// ```
    /// use checkers::{Coordinate, GameSession, Move, Side, Winner};
    ///
    /// let mut game = GameSession::new(1, "alice".into(), "bob".into(), "carol".into(), 100);
    /// let mv = Move::new(Coordinate::new(1, 2), Coordinate::new(2, 3));
    /// let result = game.apply_move("bob", mv, 200).unwrap();
    /// assert_eq!(result.winner, Winner::None);
    /// assert_eq!(game.turn, Side::Red);
    /// ```
    pub fn apply_move(
        &mut self,
        player: &str,
        mv: Move,
        next_deadline: Timestamp,
    ) -> Result<MoveResult, GameError> {
        let side = self.authorize(player)?;

        let input = MoveInput::new(&self.board, side, mv).continuing(self.pending_jump);
        let outcome = RuleSet::standard().apply(&input)?;

        let opponent = side.opponent();
        self.board = outcome.board;
        self.move_count += 1;
        self.deadline = next_deadline;
        if outcome.must_continue_jump {
            self.pending_jump = Some(mv.to);
        } else {
            self.pending_jump = None;
            self.turn = opponent;
        }

        let opponent_stuck =
            !outcome.must_continue_jump && !has_legal_move(&self.board, opponent);
        if self.board.count(opponent) == 0 || opponent_stuck {
            self.winner = Winner::from(side);
            self.pending_jump = None;
        }

        Ok(MoveResult {
            captured: outcome.captured,
            promoted: outcome.promoted,
            must_continue_jump: outcome.must_continue_jump && !self.is_finished(),
            winner: self.winner,
        })
    }

    /// Forfeits the side on turn when `now` is past the deadline. Returns the
    /// winner if this call ended the game.
    pub fn check_expiry(&mut self, now: Timestamp) -> Option<Side> {
        if self.is_finished() || now <= self.deadline {
            return None;
        }
        let winner = self.turn.opponent();
        self.winner = Winner::from(winner);
        self.forfeited = true;
        self.pending_jump = None;
        Some(winner)
    }

    /// Persisted form; [`GameSession::from_stored`] restores it exactly
    pub fn to_stored(&self) -> StoredGame {
        StoredGame {
            index: self.game_index(),
            board: self.board.to_string(),
            turn: self.turn.code().to_string(),
            creator: self.creator.clone(),
            black: self.black.clone(),
            red: self.red.clone(),
            winner: self.winner.code().to_string(),
            forfeited: self.forfeited,
            move_count: self.move_count,
            deadline: self.deadline,
            pending_jump: self.pending_jump,
        }
    }

    /// Rebuilds a session from its persisted form. Any field that does not
    /// decode is an `Invariant` error.
    pub fn from_stored(stored: StoredGame) -> Result<GameSession, GameError> {
        let index = stored
            .index
            .parse::<u64>()
            .map_err(|_| GameError::Invariant(format!("stored index {:?}", stored.index)))?;
        let board = stored.board.parse::<Board>()?;
        let turn = Side::from_code(&stored.turn)
            .ok_or_else(|| GameError::Invariant(format!("stored turn {:?}", stored.turn)))?;
        let winner = Winner::from_code(&stored.winner)
            .ok_or_else(|| GameError::Invariant(format!("stored winner {:?}", stored.winner)))?;

        Ok(GameSession {
            index,
            board,
            turn,
            creator: stored.creator,
            black: stored.black,
            red: stored.red,
            winner,
            forfeited: stored.forfeited,
            move_count: stored.move_count,
            deadline: stored.deadline,
            pending_jump: stored.pending_jump,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::validation::MoveError;

    fn at(x: u8, y: u8) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn session() -> GameSession {
        GameSession::new(1, "alice".into(), "bob".into(), "carol".into(), 100)
    }

    fn with_board(pieces: &[(u8, u8, Cell)]) -> GameSession {
        let mut game = session();
        game.board = Board::empty();
        for &(x, y, cell) in pieces {
            game.board.set(at(x, y), cell);
        }
        game
    }

    #[test]
    fn new_session_starts_with_black() {
        let game = session();
        assert_eq!(game.turn, Side::Black);
        assert_eq!(game.state(), SessionState::InProgress);
        assert_eq!(game.board, Board::standard());
        assert_eq!(game.move_count, 0);
    }

    #[test]
    fn accepted_move_flips_turn_and_refreshes_deadline() {
        let mut game = session();
        let result = game
            .apply_move("bob", Move::new(at(1, 2), at(2, 3)), 500)
            .unwrap();
        assert_eq!(result.captured, None);
        assert_eq!(result.winner, Winner::None);
        assert_eq!(game.turn, Side::Red);
        assert_eq!(game.move_count, 1);
        assert_eq!(game.deadline, 500);
    }

    #[test]
    fn rejects_strangers_and_out_of_turn_players() {
        let mut game = session();
        let before = game.clone();
        assert_eq!(
            game.apply_move("alice", Move::new(at(1, 2), at(2, 3)), 500),
            Err(GameError::Forbidden(NOT_A_PLAYER))
        );
        assert_eq!(
            game.apply_move("carol", Move::new(at(0, 5), at(1, 4)), 500),
            Err(GameError::Forbidden(NOT_YOUR_TURN))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn authorize_reports_the_side_on_turn() {
        let mut game = session();
        assert_eq!(game.authorize("bob"), Ok(Side::Black));
        assert_eq!(game.authorize("carol"), Err(GameError::Forbidden(NOT_YOUR_TURN)));
        game.winner = Winner::Red;
        assert_eq!(game.authorize("bob"), Err(GameError::Finished));
    }

    #[test]
    fn invalid_move_leaves_the_session_untouched() {
        let mut game = session();
        let before = game.clone();
        assert_eq!(
            game.apply_move("bob", Move::new(at(0, 1), at(1, 2)), 500),
            Err(GameError::Invalid(MoveError::OccupiedDestination(at(1, 2))))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn same_player_on_both_sides_plays_the_side_on_turn() {
        let mut game = GameSession::new(1, "bob".into(), "bob".into(), "bob".into(), 0);
        game.apply_move("bob", Move::new(at(1, 2), at(2, 3)), 1).unwrap();
        game.apply_move("bob", Move::new(at(0, 5), at(1, 4)), 2).unwrap();
        assert_eq!(game.turn, Side::Black);
    }

    #[test]
    fn multi_jump_keeps_the_turn_until_finished() {
        let mut game = with_board(&[
            (0, 1, Cell::BlackMan),
            (1, 2, Cell::RedMan),
            (3, 4, Cell::RedMan),
            (7, 6, Cell::RedMan),
        ]);

        let first = game
            .apply_move("bob", Move::new(at(0, 1), at(2, 3)), 200)
            .unwrap();
        assert!(first.must_continue_jump);
        assert_eq!(game.turn, Side::Black);
        assert_eq!(game.pending_jump, Some(at(2, 3)));

        assert_eq!(
            game.apply_move("carol", Move::new(at(7, 6), at(6, 5)), 300),
            Err(GameError::Forbidden(NOT_YOUR_TURN))
        );

        let second = game
            .apply_move("bob", Move::new(at(2, 3), at(4, 5)), 300)
            .unwrap();
        assert_eq!(second.captured, Some(at(3, 4)));
        assert!(!second.must_continue_jump);
        assert_eq!(game.turn, Side::Red);
        assert_eq!(game.pending_jump, None);
        assert_eq!(game.move_count, 2);
    }

    #[test]
    fn capturing_the_last_piece_wins() {
        let mut game = with_board(&[(2, 3, Cell::BlackMan), (3, 4, Cell::RedMan)]);
        let result = game
            .apply_move("bob", Move::new(at(2, 3), at(4, 5)), 200)
            .unwrap();
        assert_eq!(result.winner, Winner::Black);
        assert_eq!(result.captured, Some(at(3, 4)));
        assert_eq!(game.state(), SessionState::Won(Side::Black));
        assert_eq!(
            game.apply_move("carol", Move::new(at(0, 5), at(1, 4)), 300),
            Err(GameError::Finished)
        );
    }

    #[test]
    fn blocking_the_opponent_wins() {
        let mut game = with_board(&[
            (0, 7, Cell::RedMan),
            (1, 6, Cell::BlackMan),
            (3, 4, Cell::BlackMan),
        ]);
        game.apply_move("bob", Move::new(at(3, 4), at(2, 5)), 200).unwrap();
        assert_eq!(game.state(), SessionState::Won(Side::Black));
    }

    #[test]
    fn expiry_forfeits_the_side_on_turn_once() {
        let mut game = session();
        assert_eq!(game.check_expiry(100), None);
        assert_eq!(game.check_expiry(101), Some(Side::Red));
        assert_eq!(game.state(), SessionState::Forfeited { winner: Side::Red });
        assert_eq!(game.check_expiry(500), None);
        assert_eq!(game.winner, Winner::Red);
    }

    #[test]
    fn stored_form_restores_the_session() {
        let mut game = session();
        game.apply_move("bob", Move::new(at(1, 2), at(2, 3)), 500).unwrap();
        let stored = game.to_stored();
        assert_eq!(stored.turn, "r");
        assert_eq!(stored.winner, "*");
        assert_eq!(GameSession::from_stored(stored), Ok(game));
    }

    #[test]
    fn corrupt_stored_state_is_an_invariant_violation() {
        let mut stored = session().to_stored();
        stored.turn = "x".to_string();
        assert!(matches!(
            GameSession::from_stored(stored),
            Err(GameError::Invariant(_))
        ));
    }
}
