//! Vault module — the encrypted secrets document and its storage.
//!
//! This module provides:
//! - The `SecretDocument` data model and its pure operations (`document`)
//! - The `SingleValueStore` trait, its stores and the cached backend (`backend`)
//! - The high-level `Vault` façade (`store`)
//! - Timestamped backups of document and credential files (`backup`)

pub mod backend;
pub mod backup;
pub mod document;
pub mod store;

// Re-export the most commonly used items.
pub use backend::{EnvVarStore, FileStore, MemoryStore, PersistenceBackend, SingleValueStore};
#[cfg(windows)]
pub use backend::UserEnvStore;
pub use backup::{BackupExporter, BackupReport};
pub use document::{merge, FieldMap, FieldValue, SecretDocument};
pub use store::{ImportMode, SharedVault, Vault};
