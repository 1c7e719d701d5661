//! # Players Module
//!
//! Players are identified by their public keys, written as Base58 strings the
//! same way the Calimero runtime reports executor identities. The ledger
//! treats an identifier as opaque and only asks an [`AddressValidator`]
//! whether it is acceptable before creating a game.
//!
//! ```
//! use checkers::players::{AddressValidator, Base58Keys, PublicKey};
//!
//! let key = PublicKey([7u8; 32]).to_base58();
//! assert!(Base58Keys.check(&key).is_ok());
//! assert_eq!(Base58Keys.check(""), Err("empty address string is not allowed"));
//! ```

use crate::GameError;
use calimero_sdk::borsh::{BorshDeserialize, BorshSerialize};
use calimero_sdk::serde::{Deserialize, Serialize};

// ============================================================================
// PLAYERS MODULE - Player identities
// ============================================================================

/// Represents a player's public key
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize, Serialize, Deserialize, PartialEq, Eq)]
#[borsh(crate = "calimero_sdk::borsh")]
#[serde(crate = "calimero_sdk::serde")]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Builds a key from raw bytes
    ///
    /// # Returns
    /// * `Ok(PublicKey)` - `bytes` is exactly 32 bytes long
    /// * `Err(&str)` - `"key must be 32 bytes"` otherwise
    pub fn from_bytes(bytes: &[u8]) -> Result<PublicKey, &'static str> {
        if bytes.len() != 32 {
            return Err("key must be 32 bytes");
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(PublicKey(arr))
    }

    /// Decodes a base58 address
    ///
    /// # Arguments
    /// * `encoded` - Base58 text of a 32-byte key
    ///
    /// # Returns
    /// * `Ok(PublicKey)` - The decoded key
    /// * `Err(&str)` - The reason the address was rejected: empty, not
    ///   base58, or not 32 bytes
    ///
    /// # Example
    /// ```
    /// use checkers::PublicKey;
    ///
    /// let key = PublicKey([7; 32]);
    /// assert_eq!(PublicKey::from_base58(&key.to_base58()), Ok(key));
    /// assert!(PublicKey::from_base58("").is_err());
    /// ```
    pub fn from_base58(encoded: &str) -> Result<PublicKey, &'static str> {
        if encoded.is_empty() {
            return Err("empty address string is not allowed");
        }
        let decoded = bs58::decode(encoded)
            .into_vec()
            .map_err(|_| "decoding base58 failed")?;
        PublicKey::from_bytes(&decoded)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }
}

/// Decides whether a string names a valid player
pub trait AddressValidator {
    /// Returns the reason the address is rejected, if it is
    fn check(&self, address: &str) -> Result<(), &'static str>;
}

/// Accepts Base58-encoded 32-byte public keys
#[derive(Debug, Clone, Copy, Default)]
pub struct Base58Keys;

impl AddressValidator for Base58Keys {
    fn check(&self, address: &str) -> Result<(), &'static str> {
        PublicKey::from_base58(address).map(|_| ())
    }
}

/// Checks `address` for the given role (`creator`, `black`, `red`)
pub fn validate_player<V: AddressValidator + ?Sized>(
    validator: &V,
    role: &'static str,
    address: &str,
) -> Result<(), GameError> {
    validator
        .check(address)
        .map_err(|reason| GameError::InvalidAddress {
            role,
            address: address.to_string(),
            reason,
        })
}
