//! # Ledger Module
//!
//! The session ledger is the entry point for both requests. It allocates game
//! indices from [`SystemInfo`], loads and persists sessions through a
//! [`Store`], keeps the expiry index in step with each session's deadline and
//! records one [`Event`] per successful operation.
//!
//! Every operation takes `&mut self` and runs to completion, so the
//! read-increment-write of the index counter cannot interleave with another
//! creation. Inputs are fully validated before the store is written.
//!
//! ```
//! use checkers::{CreateGame, Ledger, LedgerConfig, MapStore, PlayMove};
//! use checkers::players::PublicKey;
//!
//! let alice = PublicKey([1; 32]).to_base58();
//! let bob = PublicKey([2; 32]).to_base58();
//! let carol = PublicKey([3; 32]).to_base58();
//!
//! let mut ledger = Ledger::new(MapStore::new(), LedgerConfig::default());
//! let created = ledger
//!     .create_game(&CreateGame { creator: alice, black: bob.clone(), red: carol }, 0)
//!     .unwrap();
//! assert_eq!(created.game_index, "1");
//!
//! let played = ledger
//!     .play_move(
//!         &PlayMove { creator: bob, game_index: "1".into(), from_x: 1, from_y: 2, to_x: 2, to_y: 3 },
//!         1,
//!     )
//!     .unwrap();
//! assert_eq!((played.captured_x, played.captured_y), (-1, -1));
//! assert_eq!(played.winner, "*");
//! ```

use crate::config::LedgerConfig;
use crate::events::{Event, EventLog, NO_CAPTURE};
use crate::game::GameSession;
use crate::players::{validate_player, AddressValidator, Base58Keys};
use crate::store::{Store, SystemInfo, Timestamp};
use crate::validation::Move;
use crate::{CreateGame, CreateGameResponse, GameError, PlayMove, PlayMoveResponse};
use tracing::{debug, info, warn};

/// Session ledger over a store `S`, accepting players approved by `V`
pub struct Ledger<S: Store, V: AddressValidator = Base58Keys> {
    store: S,
    validator: V,
    config: LedgerConfig,
    events: EventLog,
}

impl<S: Store> Ledger<S> {
    /// Opens a ledger that accepts base58 public keys as players
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Ledger::with_validator(store, Base58Keys, config)
    }
}

impl<S: Store, V: AddressValidator> Ledger<S, V> {
    /// Opens the ledger, writing the genesis [`SystemInfo`] if the store has
    /// none yet.
    pub fn with_validator(mut store: S, validator: V, config: LedgerConfig) -> Self {
        if store.system_info().is_none() {
            store.set_system_info(SystemInfo::default());
        }
        Ledger {
            store,
            validator,
            config,
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Allocator state; the genesis value if the store holds none
    pub fn system_info(&self) -> SystemInfo {
        self.store.system_info().unwrap_or_default()
    }

    /// Overwrites the allocator state, e.g. when importing a genesis
    pub fn set_system_info(&mut self, info: SystemInfo) {
        self.store.set_system_info(info);
    }

    /// Events recorded since the last [`Ledger::take_events`]
    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// Removes and returns the recorded events, oldest first
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Starts a game with the standard opening, black to move
    ///
    /// The creator, black and red addresses are validated in that order
    /// before anything is written. The new game gets the next index from
    /// [`SystemInfo`] and a deadline one session timeout after `now`.
    ///
    /// # Arguments
    /// * `msg` - Creator and the two players
    /// * `now` - Current time, used for the first deadline
    ///
    /// # Returns
    /// * `Ok(CreateGameResponse)` - The index of the new game
    /// * `Err(GameError::InvalidAddress)` - An address failed validation
    /// * `Err(GameError::Invariant)` - The allocated index is already taken
    pub fn create_game(
        &mut self,
        msg: &CreateGame,
        now: Timestamp,
    ) -> Result<CreateGameResponse, GameError> {
        validate_player(&self.validator, "creator", &msg.creator)?;
        validate_player(&self.validator, "black", &msg.black)?;
        validate_player(&self.validator, "red", &msg.red)?;

        let mut system = self.system_info();
        let index = system.next_id;
        if self.store.game(index).is_some() {
            return Err(GameError::Invariant(format!(
                "game index {index} already in use"
            )));
        }
        system.next_id = index
            .checked_add(1)
            .ok_or_else(|| GameError::Invariant("game index space exhausted".to_string()))?;

        let session = GameSession::new(
            index,
            msg.creator.clone(),
            msg.black.clone(),
            msg.red.clone(),
            self.config.deadline_from(now),
        );
        self.store.set_game(index, session.to_stored());
        self.store.schedule_expiry(index, session.deadline);
        self.store.set_system_info(system);

        info!(game_index = index, black = %msg.black, red = %msg.red, "game created");
        self.events.record(Event::GameCreated {
            creator: msg.creator.clone(),
            game_index: session.game_index(),
            black: msg.black.clone(),
            red: msg.red.clone(),
        });

        Ok(CreateGameResponse {
            game_index: session.game_index(),
        })
    }

    /// Loads the game named by `game_index`
    ///
    /// # Returns
    /// * `Ok(GameSession)` - The decoded session
    /// * `Err(GameError::NotFound)` - `game_index` is not the canonical index
    ///   of a stored game
    /// * `Err(GameError::Invariant)` - The stored game does not decode
    pub fn session(&self, game_index: &str) -> Result<GameSession, GameError> {
        let stored = self.store.find_game(game_index)?;
        GameSession::from_stored(stored).inspect_err(|err| {
            warn!(game_index, error = %err, "stored game failed to decode");
        })
    }

    /// Plays a move on behalf of `msg.creator`
    ///
    /// Checks run in a fixed order: the game exists, the sender is a player,
    /// it is their turn, the game is still running, then the move rules. On
    /// success the session is saved, its deadline pushed to one session
    /// timeout after `now` and a `move-played` event recorded.
    ///
    /// # Arguments
    /// * `msg` - Sender, game index and the two squares
    /// * `now` - Current time, used for the next deadline
    ///
    /// # Returns
    /// * `Ok(PlayMoveResponse)` - Captured square (`-1`, `-1` if none) and
    ///   winner code
    /// * `Err(GameError)` - `NotFound`, `Forbidden`, `Finished` or `Invalid`;
    ///   nothing is written
    pub fn play_move(
        &mut self,
        msg: &PlayMove,
        now: Timestamp,
    ) -> Result<PlayMoveResponse, GameError> {
        let mut session = self.session(&msg.game_index)?;
        session.authorize(&msg.creator)?;
        let mv = Move::from_request(msg.from_x, msg.from_y, msg.to_x, msg.to_y)?;
        let result = session.apply_move(&msg.creator, mv, self.config.deadline_from(now))?;

        self.store.set_game(session.index, session.to_stored());
        if session.is_finished() {
            self.store.clear_expiry(session.index);
        } else {
            self.store.schedule_expiry(session.index, session.deadline);
        }

        let (captured_x, captured_y) = result
            .captured
            .map_or((NO_CAPTURE, NO_CAPTURE), |at| (i64::from(at.x), i64::from(at.y)));
        let winner = result.winner.code().to_string();

        debug!(
            game_index = session.index,
            from = %mv.from,
            to = %mv.to,
            captured = result.captured.is_some(),
            continue_jump = result.must_continue_jump,
            winner = %winner,
            "move played"
        );
        if session.is_finished() {
            info!(game_index = session.index, winner = %winner, "game won");
        }
        self.events.record(Event::MovePlayed {
            creator: msg.creator.clone(),
            game_index: session.game_index(),
            captured_x,
            captured_y,
            winner: winner.clone(),
        });

        Ok(PlayMoveResponse {
            captured_x,
            captured_y,
            winner,
        })
    }

    /// Every session, by ascending index
    pub fn sessions(&self) -> Result<Vec<GameSession>, GameError> {
        self.store
            .games()
            .into_iter()
            .map(GameSession::from_stored)
            .collect()
    }

    /// Forfeits every running session whose deadline is before `now` and
    /// returns their indices. Running it again with the same `now` is a no-op.
    ///
    /// A due game that is missing or does not decode is dropped from the
    /// expiry index and skipped; it never stops the rest of the sweep.
    pub fn sweep_expired(&mut self, now: Timestamp) -> Vec<String> {
        let due = self.store.expired(now);
        debug!(now, due = due.len(), "sweeping expired games");

        let mut forfeited = Vec::new();
        for index in due {
            let Some(stored) = self.store.game(index) else {
                self.store.clear_expiry(index);
                continue;
            };
            let mut session = match GameSession::from_stored(stored) {
                Ok(session) => session,
                Err(err) => {
                    warn!(game_index = index, error = %err, "skipping undecodable game");
                    self.store.clear_expiry(index);
                    continue;
                }
            };

            match session.check_expiry(now) {
                Some(winner) => {
                    self.store.set_game(index, session.to_stored());
                    self.store.clear_expiry(index);
                    info!(game_index = index, winner = %winner, "game forfeited");
                    self.events.record(Event::GameForfeited {
                        game_index: session.game_index(),
                        winner: winner.code().to_string(),
                    });
                    forfeited.push(session.game_index());
                }
                None if session.is_finished() => self.store.clear_expiry(index),
                None => self.store.schedule_expiry(index, session.deadline),
            }
        }
        forfeited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::PublicKey;
    use crate::store::MapStore;

    fn key(seed: u8) -> String {
        PublicKey([seed; 32]).to_base58()
    }

    fn ledger() -> Ledger<MapStore> {
        Ledger::new(MapStore::new(), LedgerConfig::new().with_session_timeout(10))
    }

    fn create(ledger: &mut Ledger<MapStore>, now: Timestamp) -> String {
        ledger
            .create_game(
                &CreateGame {
                    creator: key(1),
                    black: key(2),
                    red: key(3),
                },
                now,
            )
            .unwrap()
            .game_index
    }

    #[test]
    fn genesis_is_written_on_open() {
        let ledger = ledger();
        assert_eq!(ledger.store().system_info(), Some(SystemInfo { next_id: 1 }));
    }

    #[test]
    fn existing_system_info_is_kept() {
        let mut store = MapStore::new();
        store.set_system_info(SystemInfo { next_id: 9 });
        let ledger = Ledger::new(store, LedgerConfig::default());
        assert_eq!(ledger.system_info().next_id, 9);
    }

    #[test]
    fn creation_schedules_the_deadline() {
        let mut ledger = ledger();
        create(&mut ledger, 5);
        assert_eq!(ledger.session("1").unwrap().deadline, 15);
        assert!(ledger.store().expired(15).is_empty());
        assert_eq!(ledger.store().expired(16), vec![1]);
    }

    #[test]
    fn unknown_or_malformed_index_is_not_found() {
        let ledger = ledger();
        assert_eq!(
            ledger.session("1"),
            Err(GameError::NotFound("1".to_string()))
        );
        assert_eq!(
            ledger.session("one"),
            Err(GameError::NotFound("one".to_string()))
        );
    }

    #[test]
    fn collision_with_an_existing_game_is_an_invariant_violation() {
        let mut ledger = ledger();
        create(&mut ledger, 0);
        ledger.set_system_info(SystemInfo { next_id: 1 });
        let err = ledger
            .create_game(
                &CreateGame {
                    creator: key(1),
                    black: key(2),
                    red: key(3),
                },
                0,
            )
            .unwrap_err();
        assert!(matches!(err, GameError::Invariant(_)));
        assert_eq!(ledger.system_info().next_id, 1);
    }

    #[test]
    fn move_reschedules_the_deadline() {
        let mut ledger = ledger();
        create(&mut ledger, 0);
        ledger
            .play_move(
                &PlayMove {
                    creator: key(2),
                    game_index: "1".to_string(),
                    from_x: 1,
                    from_y: 2,
                    to_x: 2,
                    to_y: 3,
                },
                7,
            )
            .unwrap();
        assert_eq!(ledger.session("1").unwrap().deadline, 17);
        assert!(ledger.store().expired(17).is_empty());
        assert_eq!(ledger.store().expired(18), vec![1]);
    }
}
