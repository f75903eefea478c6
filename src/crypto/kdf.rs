//! Key derivation using scrypt.
//!
//! scrypt is memory-hard and CPU-hard.  The vault always derives with
//! `ScryptCost::VAULT`, a compiled-in constant: a vault written by one
//! build must open under every other build, so the cost is not read from
//! configuration.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, VaultError};

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// scrypt cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptCost {
    /// log2 of the CPU/memory cost `N`.
    pub log_n: u8,
    /// Block size `r`.
    pub r: u32,
    /// Parallelism `p`.
    pub p: u32,
}

impl ScryptCost {
    /// The cost every vault is derived with: N = 2^20, r = 8, p = 1.
    ///
    /// Needs roughly 1 GiB of memory and several hundred milliseconds.
    pub const VAULT: ScryptCost = ScryptCost {
        log_n: 20,
        r: 8,
        p: 1,
    };
}

/// A 32-byte symmetric key that zeroes its memory when dropped.
///
/// Lives only in memory; nothing in the crate writes it anywhere.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for DerivedKey {}

/// Derive the vault key from credential material with `ScryptCost::VAULT`.
pub fn derive_key(salt: &[u8], password: &[u8]) -> Result<DerivedKey> {
    derive_key_with_cost(salt, password, &ScryptCost::VAULT)
}

/// Derive a 32-byte key with explicit scrypt cost.
///
/// The same salt + password + cost always produce the same key.
pub fn derive_key_with_cost(salt: &[u8], password: &[u8], cost: &ScryptCost) -> Result<DerivedKey> {
    let params = scrypt::Params::new(cost.log_n, cost.r, cost.p, KEY_LEN)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid scrypt params: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    let derived = scrypt::scrypt(password, salt, &params, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("scrypt failed: {e}")))
        .map(|()| DerivedKey::new(key));
    key.zeroize();
    derived
}
