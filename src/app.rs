//! Calimero application state.
//!
//! Exposes the ledger operations as application methods. The caller is the
//! executor's public key, time comes from the host clock and the events each
//! request records are emitted once the request succeeded.

use crate::events::Event;
use crate::ledger::Ledger;
use crate::players::PublicKey;
use crate::store::{MapStore, Store, StoredGame, SystemInfo};
use crate::{
    CreateGame, CreateGameResponse, GameError, LedgerConfig, PlayMove, PlayMoveResponse,
};
use calimero_sdk::app;
use calimero_sdk::borsh::{BorshDeserialize, BorshSerialize};
use calimero_storage::env;

/// Events as published to the runtime
#[app::event]
pub enum CheckersEvent<'a> {
    NewGameCreated {
        creator: &'a str,
        game_index: &'a str,
        black: &'a str,
        red: &'a str,
    },
    MovePlayed {
        creator: &'a str,
        game_index: &'a str,
        captured_x: i64,
        captured_y: i64,
        winner: &'a str,
    },
    GameForfeited {
        game_index: &'a str,
        winner: &'a str,
    },
}

#[app::state(emits = for<'a> CheckersEvent<'a>)]
#[derive(Debug, BorshSerialize, BorshDeserialize)]
#[borsh(crate = "calimero_sdk::borsh")]
pub struct CheckersState {
    store: MapStore,
    config: LedgerConfig,
}

impl PublicKey {
    pub fn from_executor_id() -> Result<PublicKey, GameError> {
        PublicKey::from_bytes(&calimero_sdk::env::executor_id())
            .map_err(|reason| GameError::Invariant(format!("executor id: {reason}")))
    }
}

fn publish(events: Vec<Event>) {
    for event in &events {
        match event {
            Event::GameCreated {
                creator,
                game_index,
                black,
                red,
            } => app::emit!(CheckersEvent::NewGameCreated {
                creator,
                game_index,
                black,
                red,
            }),
            Event::MovePlayed {
                creator,
                game_index,
                captured_x,
                captured_y,
                winner,
            } => app::emit!(CheckersEvent::MovePlayed {
                creator,
                game_index,
                captured_x: *captured_x,
                captured_y: *captured_y,
                winner,
            }),
            Event::GameForfeited { game_index, winner } => {
                app::emit!(CheckersEvent::GameForfeited { game_index, winner })
            }
        }
    }
}

#[app::logic]
impl CheckersState {
    #[app::init]
    pub fn init() -> CheckersState {
        let mut store = MapStore::new();
        store.set_system_info(SystemInfo::default());
        CheckersState {
            store,
            config: LedgerConfig::default(),
        }
    }

    fn ledger(&mut self) -> Ledger<&mut MapStore> {
        Ledger::new(&mut self.store, self.config)
    }

    /// Starts a game created by the caller
    pub fn create_game(&mut self, black: String, red: String) -> app::Result<CreateGameResponse> {
        let creator = PublicKey::from_executor_id()?.to_base58();
        let mut ledger = self.ledger();
        let response = ledger.create_game(&CreateGame { creator, black, red }, env::time_now())?;
        publish(ledger.take_events());
        Ok(response)
    }

    /// Moves a piece on behalf of the caller
    pub fn play_move(
        &mut self,
        game_index: String,
        from_x: u64,
        from_y: u64,
        to_x: u64,
        to_y: u64,
    ) -> app::Result<PlayMoveResponse> {
        let creator = PublicKey::from_executor_id()?.to_base58();
        let msg = PlayMove {
            creator,
            game_index,
            from_x,
            from_y,
            to_x,
            to_y,
        };
        let mut ledger = self.ledger();
        let response = ledger.play_move(&msg, env::time_now())?;
        publish(ledger.take_events());
        Ok(response)
    }

    /// Forfeits every game whose deadline has passed
    pub fn sweep_expired(&mut self) -> app::Result<Vec<String>> {
        let mut ledger = self.ledger();
        let forfeited = ledger.sweep_expired(env::time_now());
        publish(ledger.take_events());
        Ok(forfeited)
    }

    /// Stored game by its index, as listed by `get_games`
    pub fn get_game(&self, game_index: String) -> app::Result<StoredGame> {
        Ok(self.store.find_game(&game_index)?)
    }

    pub fn get_games(&self) -> app::Result<Vec<StoredGame>> {
        Ok(self.store.games())
    }

    pub fn get_system_info(&self) -> app::Result<SystemInfo> {
        Ok(self.store.system_info().unwrap_or_default())
    }

    pub fn get_current_user(&self) -> app::Result<String> {
        Ok(PublicKey::from_executor_id()?.to_base58())
    }
}
