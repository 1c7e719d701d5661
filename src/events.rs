//! # Events Module
//!
//! This module defines the notifications the checkers application emits for
//! the indexing and transport layers.
//!
//! ## Event Types
//!
//! - **`new-game-created`** - A game was created
//! - **`move-played`** - A move was accepted; carries the captured square
//!   (`-1`, `-1` when nothing was captured) and the winner (`*` while the game
//!   continues)
//! - **`game-forfeited`** - A game expired and the side on turn lost
//!
//! The ledger never emits anything itself: each successful operation appends
//! its events to an [`EventLog`] in the order they occurred, and the runtime
//! layer drains the log after the request.

use calimero_sdk::serde::Serialize;

/// Sentinel written for the captured coordinates of a move without capture
pub const NO_CAPTURE: i64 = -1;

/// Domain events of the checkers application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(crate = "calimero_sdk::serde")]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    /// Emitted when a new game is created
    #[serde(rename = "new-game-created")]
    GameCreated {
        creator: String,
        game_index: String,
        black: String,
        red: String,
    },
    /// Emitted when a move is applied
    MovePlayed {
        creator: String,
        game_index: String,
        captured_x: i64,
        captured_y: i64,
        winner: String,
    },
    /// Emitted when an expired game is forfeited
    GameForfeited { game_index: String, winner: String },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::GameCreated { .. } => "new-game-created",
            Event::MovePlayed { .. } => "move-played",
            Event::GameForfeited { .. } => "game-forfeited",
        }
    }

    /// Flattened key/value attributes, in emission order
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Event::GameCreated {
                creator,
                game_index,
                black,
                red,
            } => vec![
                ("creator", creator.clone()),
                ("game-index", game_index.clone()),
                ("black", black.clone()),
                ("red", red.clone()),
            ],
            Event::MovePlayed {
                creator,
                game_index,
                captured_x,
                captured_y,
                winner,
            } => vec![
                ("creator", creator.clone()),
                ("game-index", game_index.clone()),
                ("captured-x", captured_x.to_string()),
                ("captured-y", captured_y.to_string()),
                ("winner", winner.clone()),
            ],
            Event::GameForfeited { game_index, winner } => vec![
                ("game-index", game_index.clone()),
                ("winner", winner.clone()),
            ],
        }
    }
}

/// Ordered record of the events produced by ledger operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes and returns everything recorded so far
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn move_played() -> Event {
        Event::MovePlayed {
            creator: "bob".to_string(),
            game_index: "1".to_string(),
            captured_x: NO_CAPTURE,
            captured_y: NO_CAPTURE,
            winner: "*".to_string(),
        }
    }

    #[test]
    fn move_played_attributes_use_sentinels() {
        let event = move_played();
        assert_eq!(event.kind(), "move-played");
        assert_eq!(
            event.attributes(),
            vec![
                ("creator", "bob".to_string()),
                ("game-index", "1".to_string()),
                ("captured-x", "-1".to_string()),
                ("captured-y", "-1".to_string()),
                ("winner", "*".to_string()),
            ]
        );
    }

    #[test]
    fn json_encoding_is_tagged_by_kind() {
        let created = Event::GameCreated {
            creator: "alice".to_string(),
            game_index: "1".to_string(),
            black: "bob".to_string(),
            red: "carol".to_string(),
        };
        let value = serde_json::to_value(&created).unwrap();
        assert_eq!(value["type"], "new-game-created");
        assert_eq!(value["game_index"], "1");

        let forfeited = Event::GameForfeited {
            game_index: "3".to_string(),
            winner: "r".to_string(),
        };
        assert_eq!(serde_json::to_value(&forfeited).unwrap()["type"], forfeited.kind());
        assert_eq!(serde_json::to_value(move_played()).unwrap()["type"], "move-played");
    }

    #[test]
    fn log_keeps_order_and_drains() {
        let mut log = EventLog::new();
        log.record(move_played());
        log.record(Event::GameForfeited {
            game_index: "1".to_string(),
            winner: "b".to_string(),
        });
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].kind(), "move-played");

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].kind(), "game-forfeited");
        assert!(log.is_empty());
    }
}
