//! Deadline-driven forfeiture.

mod common;

use checkers::{GameError, Ledger, LedgerConfig, SessionState, Side, Store, Winner};
use common::*;

#[test]
fn test_sweep_forfeits_the_side_on_turn() {
    let mut ledger = ledger_with_one_game();
    assert!(ledger.sweep_expired(TIMEOUT).is_empty());

    let forfeited = ledger.sweep_expired(TIMEOUT + 1);
    assert_eq!(forfeited, vec!["1"]);

    let session = ledger.session("1").unwrap();
    assert_eq!(session.state(), SessionState::Forfeited { winner: Side::Red });
    assert_eq!(session.to_stored().winner, "r");

    let events = ledger.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), "game-forfeited");
    assert_eq!(
        events[0].attributes(),
        vec![("game-index", "1".to_string()), ("winner", "r".to_string())]
    );
}

#[test]
fn test_sweep_is_idempotent() {
    let mut ledger = ledger_with_one_game();
    let later = TIMEOUT * 5;
    assert_eq!(ledger.sweep_expired(later), vec!["1"]);
    assert!(ledger.sweep_expired(later).is_empty());
    assert!(ledger.sweep_expired(later * 2).is_empty());
    assert_eq!(ledger.take_events().len(), 1);
    assert_eq!(ledger.session("1").unwrap().winner, Winner::Red);
}

#[test]
fn test_move_pushes_the_deadline_back() {
    let mut ledger = ledger_with_one_game();
    ledger
        .play_move(&play(bob(), "1", (1, 2), (2, 3)), TIMEOUT - 1)
        .unwrap();
    assert!(ledger.sweep_expired(TIMEOUT + 1).is_empty());

    // red is on turn now and loses when it lets the new deadline pass
    let forfeited = ledger.sweep_expired(2 * TIMEOUT);
    assert_eq!(forfeited, vec!["1"]);
    assert_eq!(ledger.session("1").unwrap().winner, Winner::Black);
}

#[test]
fn test_sweep_only_touches_due_games() {
    let mut ledger = ledger();
    ledger
        .create_game(&create_game(alice(), bob(), carol()), 0)
        .unwrap();
    ledger
        .create_game(&create_game(alice(), carol(), bob()), 500)
        .unwrap();
    ledger
        .create_game(&create_game(alice(), bob(), carol()), 100)
        .unwrap();

    assert_eq!(ledger.sweep_expired(TIMEOUT + 200), vec!["1", "3"]);
    assert_eq!(
        ledger.session("2").unwrap().state(),
        SessionState::InProgress
    );
    assert_eq!(ledger.store().expired(u64::MAX), vec![2]);
}

#[test]
fn test_forfeited_game_rejects_moves() {
    let mut ledger = ledger_with_one_game();
    ledger.sweep_expired(TIMEOUT + 1);
    assert_eq!(
        ledger.play_move(&play(bob(), "1", (1, 2), (2, 3)), TIMEOUT + 2),
        Err(GameError::Finished)
    );
}

#[test]
fn test_undecodable_game_does_not_block_the_sweep() {
    let mut ledger = ledger();
    ledger
        .create_game(&create_game(alice(), bob(), carol()), 0)
        .unwrap();
    ledger
        .create_game(&create_game(alice(), carol(), bob()), 500)
        .unwrap();

    let mut store = ledger.into_store();
    let mut corrupt = store.game(1).unwrap();
    corrupt.turn = "x".to_string();
    store.set_game(1, corrupt.clone());
    let mut ledger = Ledger::new(store, LedgerConfig::new().with_session_timeout(TIMEOUT));

    assert_eq!(ledger.sweep_expired(10_000), vec!["2"]);
    assert_eq!(ledger.session("2").unwrap().winner, Winner::Red);
    assert_eq!(ledger.take_events().len(), 1);

    // dropped from the expiry index, stored value kept as is
    assert!(ledger.store().expired(u64::MAX).is_empty());
    assert_eq!(ledger.store().game(1), Some(corrupt));
    assert!(ledger.sweep_expired(20_000).is_empty());
    assert!(matches!(ledger.session("1"), Err(GameError::Invariant(_))));
}
