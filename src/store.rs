//! # Store Module
//!
//! Persisted shapes and the storage seam of the ledger.
//!
//! The ledger never talks to a concrete database. It reads and writes
//! [`SystemInfo`] and [`StoredGame`] values through the [`Store`] trait and
//! keeps a deadline-ordered expiry index next to them. [`MapStore`] is the
//! BTree-backed implementation; it is borsh-serializable so the Calimero
//! application state can hold it directly.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::Coordinate;
use crate::GameError;
use calimero_sdk::borsh::{BorshDeserialize, BorshSerialize};
use calimero_sdk::serde::{Deserialize, Serialize};

/// Host clock reading (nanoseconds on Calimero)
pub type Timestamp = u64;

/// Process-wide allocator state
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct SystemInfo {
    /// Index handed to the next created game
    pub next_id: u64,
}

impl Default for SystemInfo {
    fn default() -> Self {
        SystemInfo { next_id: 1 }
    }
}

/// Persisted form of a game session
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct StoredGame {
    pub index: String,
    /// Board in its textual form
    pub board: String,
    /// `b` or `r`
    pub turn: String,
    pub creator: String,
    pub black: String,
    pub red: String,
    /// `*` while running, else `b`, `r` or `d`
    pub winner: String,
    pub forfeited: bool,
    pub move_count: u64,
    pub deadline: Timestamp,
    pub pending_jump: Option<Coordinate>,
}

/// Parses a game index as clients send it
///
/// Only the canonical decimal form is accepted, i.e. exactly the string the
/// ledger handed out: `"01"` or `"+1"` do not name game 1.
///
/// # Returns
/// * `Ok(u64)` - The numeric key of the game
/// * `Err(GameError::NotFound)` - The string is not a canonical index
pub fn parse_game_index(game_index: &str) -> Result<u64, GameError> {
    game_index
        .parse::<u64>()
        .ok()
        .filter(|index| index.to_string() == game_index)
        .ok_or_else(|| GameError::NotFound(game_index.to_string()))
}

/// Key-value storage used by the ledger
pub trait Store {
    fn system_info(&self) -> Option<SystemInfo>;

    fn set_system_info(&mut self, info: SystemInfo);

    fn game(&self, index: u64) -> Option<StoredGame>;

    fn set_game(&mut self, index: u64, game: StoredGame);

    /// Every stored game, by ascending index
    fn games(&self) -> Vec<StoredGame>;

    /// Adds `index` to the expiry index, replacing any earlier deadline
    fn schedule_expiry(&mut self, index: u64, deadline: Timestamp);

    fn clear_expiry(&mut self, index: u64);

    /// Indices whose deadline is strictly before `now`, earliest deadline first
    fn expired(&self, now: Timestamp) -> Vec<u64>;

    /// Looks a game up by the index string a client sent
    fn find_game(&self, game_index: &str) -> Result<StoredGame, GameError> {
        let index = parse_game_index(game_index)?;
        self.game(index)
            .ok_or_else(|| GameError::NotFound(game_index.to_string()))
    }
}

impl<S: Store + ?Sized> Store for &mut S {
    fn system_info(&self) -> Option<SystemInfo> {
        (**self).system_info()
    }

    fn set_system_info(&mut self, info: SystemInfo) {
        (**self).set_system_info(info)
    }

    fn game(&self, index: u64) -> Option<StoredGame> {
        (**self).game(index)
    }

    fn set_game(&mut self, index: u64, game: StoredGame) {
        (**self).set_game(index, game)
    }

    fn games(&self) -> Vec<StoredGame> {
        (**self).games()
    }

    fn schedule_expiry(&mut self, index: u64, deadline: Timestamp) {
        (**self).schedule_expiry(index, deadline)
    }

    fn clear_expiry(&mut self, index: u64) {
        (**self).clear_expiry(index)
    }

    fn expired(&self, now: Timestamp) -> Vec<u64> {
        (**self).expired(now)
    }
}

/// BTree-backed store
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[borsh(crate = "calimero_sdk::borsh")]
pub struct MapStore {
    system_info: Option<SystemInfo>,
    games: BTreeMap<u64, StoredGame>,
    /// Current deadline per scheduled game
    deadlines: BTreeMap<u64, Timestamp>,
    /// `(deadline, index)` pairs, ordered for sweeping
    expiry_queue: BTreeSet<(Timestamp, u64)>,
}

impl MapStore {
    pub fn new() -> Self {
        MapStore::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Store for MapStore {
    fn system_info(&self) -> Option<SystemInfo> {
        self.system_info
    }

    fn set_system_info(&mut self, info: SystemInfo) {
        self.system_info = Some(info);
    }

    fn game(&self, index: u64) -> Option<StoredGame> {
        self.games.get(&index).cloned()
    }

    fn set_game(&mut self, index: u64, game: StoredGame) {
        self.games.insert(index, game);
    }

    fn games(&self) -> Vec<StoredGame> {
        self.games.values().cloned().collect()
    }

    fn schedule_expiry(&mut self, index: u64, deadline: Timestamp) {
        self.clear_expiry(index);
        self.deadlines.insert(index, deadline);
        self.expiry_queue.insert((deadline, index));
    }

    fn clear_expiry(&mut self, index: u64) {
        if let Some(deadline) = self.deadlines.remove(&index) {
            self.expiry_queue.remove(&(deadline, index));
        }
    }

    fn expired(&self, now: Timestamp) -> Vec<u64> {
        self.expiry_queue
            .range(..(now, 0))
            .map(|&(_, index)| index)
            .collect()
    }
}
