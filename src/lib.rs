//! # Checkers Game Logic
//!
//! This crate implements turn-based checkers as a Calimero application.
//! Clients submit requests to create a game or play a move; the ledger checks
//! each request against the rules and the persisted state, mutates that state
//! deterministically and records structured events. Every replica computes
//! the same result from the same sequence of requests.
//!
//! ## Architecture Overview
//!
//! - **`board`** - Sides, cells, coordinates, the board and its textual form
//! - **`validation`** - Ordered move rules and move generation
//! - **`game`** - A single game session and its lifecycle
//! - **`store`** - Persisted shapes and the storage seam
//! - **`ledger`** - Index allocation, session lookup, moves and expiry sweeps
//! - **`events`** - Notifications produced by ledger operations
//! - **`players`** - Player identities and address validation
//! - **`config`** - Ledger configuration
//!
//! On `wasm32` the `app` module wires the ledger into the Calimero runtime:
//! the caller is the executor key and time is the host clock.
//!
//! ## Game Flow
//! 1. **Creation**: `create_game` allocates the next index (starting at 1)
//! 2. **Moves**: players alternate; a piece that can keep jumping must do so
//!    in the same player's next request
//! 3. **End**: capturing or blocking every opposing piece wins; a player who
//!    lets the deadline pass forfeits
//!
//! ## Error Handling
//!
//! - `GameError::NotFound` - Unknown game index
//! - `GameError::InvalidAddress` - A participant identifier failed validation
//! - `GameError::Invalid` - The move breaks a rule
//! - `GameError::Forbidden` - Not a player of the game, or not their turn
//! - `GameError::Finished` - The game has ended
//! - `GameError::Invariant` - Persisted state is inconsistent; never caused by
//!   client input

use calimero_sdk::borsh::{BorshDeserialize, BorshSerialize};
use calimero_sdk::serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod board;
pub mod config;
pub mod events;
pub mod game;
pub mod ledger;
pub mod players;
pub mod store;
pub mod validation;

#[cfg(target_arch = "wasm32")]
mod app;

pub use board::{Board, BoardError, Cell, Coordinate, Side, BOARD_SIZE};
pub use config::LedgerConfig;
pub use events::{Event, EventLog};
pub use game::{GameSession, MoveResult, SessionState, Winner};
pub use ledger::Ledger;
pub use players::{AddressValidator, Base58Keys, PublicKey};
pub use store::{MapStore, Store, StoredGame, SystemInfo, Timestamp};
pub use validation::{validate_and_apply, Move, MoveError, MoveOutcome};

// ============================================================================
// REQUESTS AND RESPONSES
// ============================================================================

/// Request to start a game
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct CreateGame {
    pub creator: String,
    pub black: String,
    pub red: String,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct CreateGameResponse {
    pub game_index: String,
}

/// Request to move a piece
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct PlayMove {
    pub creator: String,
    pub game_index: String,
    pub from_x: u64,
    pub from_y: u64,
    pub to_x: u64,
    pub to_y: u64,
}

/// Outcome of a move: the captured square (`-1`, `-1` if none) and the
/// winner code (`*` while the game continues)
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct PlayMoveResponse {
    pub captured_x: i64,
    pub captured_y: i64,
    pub winner: String,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Error type for all game operations
///
/// Serialized with a `kind`/`data` tag so clients can tell the cases apart.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(crate = "calimero_sdk::serde")]
#[serde(tag = "kind", content = "data")]
pub enum GameError {
    #[error("game not found: {0}")]
    NotFound(String),
    #[error("{role} address is invalid: {address}: {reason}")]
    InvalidAddress {
        role: &'static str,
        address: String,
        reason: &'static str,
    },
    #[error("invalid move: {0}")]
    Invalid(#[from] MoveError),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("already finished")]
    Finished,
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<BoardError> for GameError {
    fn from(err: BoardError) -> GameError {
        GameError::Invariant(err.to_string())
    }
}
