//! Cryptographic primitives for secvault.
//!
//! This module provides:
//! - Salt and password files that seed the key (`credentials`)
//! - scrypt key derivation (`kdf`)
//! - AES-256-GCM encryption and blob framing (`encryption`)

pub mod credentials;
pub mod encryption;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use credentials::CredentialMaterial;
pub use encryption::{decrypt, encrypt, seal, unseal, BlobFormat};
pub use kdf::{derive_key, derive_key_with_cost, DerivedKey, ScryptCost};
