//! OS keyring as a blob store.
//!
//! Keeps the encrypted blob in the operating system's per-user
//! credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! Windows caps credential blobs at 2560 bytes, so large documents
//! should stay on the file store there.

use crate::errors::{Result, VaultError};
use crate::vault::backend::SingleValueStore;

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "secvault";

/// `SingleValueStore` backed by the OS keyring.
#[derive(Debug, Clone, Default)]
pub struct KeyringStore;

fn entry(name: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, &format!("blob:{name}"))
        .map_err(|e| VaultError::StorageWriteFailure(format!("failed to create keyring entry: {e}")))
}

impl SingleValueStore for KeyringStore {
    fn describe(&self) -> String {
        "OS keyring".to_string()
    }

    /// Returns `None` if nothing is stored (rather than an error).
    fn get(&self, name: &str) -> Result<Option<String>> {
        match entry(name)?.get_password() {
            Ok(blob) => Ok(Some(blob)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(VaultError::Io(std::io::Error::other(format!(
                "failed to read from keyring: {e}"
            )))),
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        entry(name)?.set_password(value).map_err(|e| {
            VaultError::StorageWriteFailure(format!("failed to store blob in keyring: {e}"))
        })
    }
}
