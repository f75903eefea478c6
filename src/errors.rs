use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in secvault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Credential material ---
    #[error("Credential file {path} exists but cannot be read: {reason}")]
    MissingCredentialMaterial { path: PathBuf, reason: String },

    // --- Storage ---
    #[error("Storage write failed: {0}")]
    StorageWriteFailure(String),

    // --- Crypto errors ---
    #[error("Decryption failed: wrong key, or the stored blob is corrupted or tampered")]
    DecryptionAuthenticationFailure,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Document errors ---
    #[error("Secret '{field}' not found for service '{service}'")]
    SecretNotFound { service: String, field: String },

    #[error("Malformed secrets document: {0}")]
    MalformedDocument(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Shorthand for `SecretNotFound` from borrowed names.
    pub fn not_found(service: &str, field: &str) -> Self {
        Self::SecretNotFound {
            service: service.to_string(),
            field: field.to_string(),
        }
    }
}

/// Convenience type alias for secvault results.
pub type Result<T> = std::result::Result<T, VaultError>;
