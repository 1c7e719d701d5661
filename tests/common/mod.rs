//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use checkers::players::PublicKey;
use checkers::{CreateGame, Ledger, LedgerConfig, MapStore, PlayMove};

pub const OPENING: &str =
    "*b*b*b*b|b*b*b*b*|*b*b*b*b|********|********|r*r*r*r*|*r*r*r*r|r*r*r*r*";

pub const TIMEOUT: u64 = 1_000;

pub fn alice() -> String {
    PublicKey([0xa1; 32]).to_base58()
}

pub fn bob() -> String {
    PublicKey([0xb0; 32]).to_base58()
}

pub fn carol() -> String {
    PublicKey([0xc4; 32]).to_base58()
}

pub fn ledger() -> Ledger<MapStore> {
    Ledger::new(
        MapStore::new(),
        LedgerConfig::new().with_session_timeout(TIMEOUT),
    )
}

pub fn create_game(creator: String, black: String, red: String) -> CreateGame {
    CreateGame {
        creator,
        black,
        red,
    }
}

pub fn play(creator: String, game_index: &str, from: (u64, u64), to: (u64, u64)) -> PlayMove {
    PlayMove {
        creator,
        game_index: game_index.to_string(),
        from_x: from.0,
        from_y: from.1,
        to_x: to.0,
        to_y: to.1,
    }
}

/// Ledger holding game "1" between bob (black) and carol (red), created at 0
pub fn ledger_with_one_game() -> Ledger<MapStore> {
    let mut ledger = ledger();
    ledger
        .create_game(&create_game(alice(), bob(), carol()), 0)
        .unwrap();
    ledger.take_events();
    ledger
}
