//! The vault façade used by CLI commands and embedding hosts.
//!
//! `Vault` ties the pieces together: credential material and the KDF
//! produce the key once at `open`, the document is decrypted lazily on
//! first access, and every mutation is re-encrypted under a fresh nonce
//! and written back before the call returns.
//!
//! ```text
//! open ──► KeyReady ──first access──► Loaded(doc) ──mutation──► persisted ──► Loaded(doc')
//!                          │
//!                          └─ blob present but unreadable ──► error, document stays unset
//! ```

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::{derive_key, seal, unseal, BlobFormat, CredentialMaterial, DerivedKey};
use crate::errors::Result;

use super::backend::PersistenceBackend;
use super::document::{FieldMap, FieldValue, SecretDocument};

/// A vault shared between threads of one process.
pub type SharedVault = Arc<Mutex<Vault>>;

/// How an imported document is combined with the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Right-biased merge into the existing document.
    Append,
    /// Replace the existing document entirely.
    Overwrite,
}

/// The main vault handle.  Create one with `Vault::open` (or
/// `Vault::with_key` when the host already holds a key) and pass it to
/// whatever needs it.
pub struct Vault {
    /// Derived once, immutable for the life of the handle.
    key: DerivedKey,

    /// Blob storage plus the last-written cache.
    backend: PersistenceBackend,

    /// Framing of the stored blob; fixed per vault.
    format: BlobFormat,

    /// Salt/password files the key came from, if known.
    credentials: Option<CredentialMaterial>,

    /// Decrypted document; `None` until first access.
    document: Option<SecretDocument>,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the vault described by `settings`.
    ///
    /// Connects the configured store, then reads (or on first run
    /// creates) the salt and password files and derives the key with the
    /// fixed scrypt cost.  Nothing is decrypted yet.
    ///
    /// A store the settings cannot provide fails before any credential
    /// file is touched or the key is derived.
    pub fn open(settings: &Settings) -> Result<Self> {
        let backend = PersistenceBackend::new(settings.open_store()?, settings.entry_name.clone());

        let credentials = CredentialMaterial::new(&settings.config_dir);
        let salt = credentials.get_or_create_salt()?;
        let password = credentials.get_or_create_password()?;
        let key = derive_key(&salt, &password)?;

        Ok(Self {
            key,
            backend,
            format: settings.blob_format,
            credentials: Some(credentials),
            document: None,
        })
    }

    /// Build a vault from an already derived key.
    pub fn with_key(key: DerivedKey, backend: PersistenceBackend, format: BlobFormat) -> Self {
        Self {
            key,
            backend,
            format,
            credentials: None,
            document: None,
        }
    }

    /// Record which credential files the key was derived from, so backups
    /// can copy them.
    pub fn with_credentials(mut self, credentials: CredentialMaterial) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Move the vault behind a mutex for multi-threaded hosts.
    pub fn into_shared(self) -> SharedVault {
        Arc::new(Mutex::new(self))
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Value of one field; `None` if the service or field is absent.
    pub fn get(&mut self, service: &str, field: &str) -> Result<Option<FieldValue>> {
        Ok(self.loaded()?.get(service, field).cloned())
    }

    /// All fields of one service; empty if the service is unknown.
    pub fn get_all_for_service(&mut self, service: &str) -> Result<FieldMap> {
        Ok(self.loaded()?.get_all_for_service(service))
    }

    /// Service names, sorted.
    pub fn list_services(&mut self) -> Result<Vec<String>> {
        Ok(self.loaded()?.list_services())
    }

    /// The decrypted document, loading it if needed.
    pub fn document(&mut self) -> Result<&SecretDocument> {
        self.loaded().map(|doc| &*doc)
    }

    /// Re-read and decrypt the stored blob, replacing the loaded document.
    ///
    /// On failure the previously loaded document (if any) is kept.
    pub fn reload(&mut self) -> Result<()> {
        let doc = self.read_document()?;
        self.document = Some(doc);
        Ok(())
    }

    /// Pretty JSON snapshot of the stored document.  Forces a reload;
    /// never writes.
    pub fn export(&mut self) -> Result<Zeroizing<String>> {
        self.reload()?;
        self.loaded()?.to_json_pretty().map(Zeroizing::new)
    }

    // ------------------------------------------------------------------
    // Mutations (each one is persisted before returning)
    // ------------------------------------------------------------------

    /// Insert or overwrite one field.
    pub fn set(&mut self, service: &str, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        self.mutate(|doc| {
            doc.set(service, field, value);
            Ok(())
        })
    }

    /// Remove one field, pruning the service if it becomes empty.
    pub fn remove(&mut self, service: &str, field: &str) -> Result<FieldValue> {
        self.mutate(|doc| doc.remove(service, field))
    }

    /// Upsert several fields of one service.
    pub fn update_service(&mut self, service: &str, fields: FieldMap) -> Result<()> {
        self.mutate(|doc| {
            doc.update_service(service, fields);
            Ok(())
        })
    }

    /// Merge `from` into the current document (append).
    pub fn merge(&mut self, from: SecretDocument) -> Result<()> {
        self.mutate(|doc| {
            doc.merge(from);
            Ok(())
        })
    }

    /// Replace the whole document (overwrite).
    ///
    /// The current blob is not read first, so this also recovers a vault
    /// whose stored blob no longer decrypts.
    pub fn replace(&mut self, doc: SecretDocument) -> Result<()> {
        self.persist(&doc)?;
        self.document = Some(doc);
        Ok(())
    }

    /// Load a `{"services": {...}}` JSON file and append or overwrite.
    ///
    /// Returns the number of services in the imported file.
    pub fn import_json_file(&mut self, path: &Path, mode: ImportMode) -> Result<usize> {
        let content = fs::read_to_string(path)?;
        let incoming = SecretDocument::from_json_str(&content)?;
        let count = incoming.service_count();

        match mode {
            ImportMode::Append => self.merge(incoming)?,
            ImportMode::Overwrite => self.replace(incoming)?,
        }

        Ok(count)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// `true` once a document has been decrypted (or bootstrapped empty).
    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn credentials(&self) -> Option<&CredentialMaterial> {
        self.credentials.as_ref()
    }

    pub fn backend(&self) -> &PersistenceBackend {
        &self.backend
    }

    pub fn format(&self) -> BlobFormat {
        self.format
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn loaded(&mut self) -> Result<&mut SecretDocument> {
        if self.document.is_none() {
            let doc = self.read_document()?;
            self.document = Some(doc);
        }
        Ok(self.document.get_or_insert_with(SecretDocument::new))
    }

    /// No stored blob is the empty document; a stored blob that does not
    /// decrypt or parse is an error, never an empty document.
    fn read_document(&self) -> Result<SecretDocument> {
        match self.backend.load()? {
            None => Ok(SecretDocument::new()),
            Some(blob) => {
                let plaintext = unseal(self.key.as_bytes(), &blob, self.format)?;
                SecretDocument::from_json_slice(&plaintext)
            }
        }
    }

    /// Apply `f` to a copy, persist the copy, then commit it.  A failed
    /// write leaves the loaded document untouched.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut SecretDocument) -> Result<T>) -> Result<T> {
        let mut next = self.loaded()?.clone();
        let out = f(&mut next)?;
        self.persist(&next)?;
        self.document = Some(next);
        Ok(out)
    }

    fn persist(&mut self, doc: &SecretDocument) -> Result<()> {
        let json = Zeroizing::new(doc.to_json_vec()?);
        let blob = seal(self.key.as_bytes(), &json, self.format)?;
        self.backend.store(blob)
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("backend", &self.backend.describe())
            .field("format", &self.format)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
