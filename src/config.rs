//! Ledger configuration.

use calimero_sdk::borsh::{BorshDeserialize, BorshSerialize};
use calimero_sdk::serde::{Deserialize, Serialize};

/// One day in host clock units (nanoseconds)
pub const DEFAULT_SESSION_TIMEOUT: u64 = 24 * 60 * 60 * 1_000_000_000;

/// Tunables of the session ledger
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct LedgerConfig {
    /// Time a player has to move before the game is forfeited. Every
    /// accepted move pushes the deadline to `now + session_timeout`.
    pub session_timeout: u64,
}

impl LedgerConfig {
    /// Configuration with the default one-day timeout
    pub fn new() -> Self {
        LedgerConfig::default()
    }

    /// Sets the session timeout, in host clock units
    #[must_use]
    pub fn with_session_timeout(mut self, timeout: u64) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Deadline for a session touched at `now`
    pub fn deadline_from(&self, now: u64) -> u64 {
        now.saturating_add(self.session_timeout)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}
