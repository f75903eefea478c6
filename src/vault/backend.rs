//! Where the encrypted blob lives.
//!
//! The vault only needs a place that holds one string per name.  That
//! capability is the `SingleValueStore` trait; the concrete store is
//! picked from configuration at startup:
//!
//! - `FileStore`: one file per entry in the config directory
//! - `UserEnvStore` (Windows): the persistent per-user environment,
//!   `HKCU\Environment`
//! - `EnvVarStore`: the process environment, for embedding hosts
//! - `KeyringStore` (feature `keyring-store`): the OS credential store
//! - `MemoryStore`: in-process, for tests and embedding hosts
//!
//! `PersistenceBackend` sits on top and remembers the last blob it wrote,
//! so reading back right after a local write never touches the store.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::{Result, VaultError};

/// A named single-value store with last-write-wins semantics.
pub trait SingleValueStore: Send {
    /// Human-readable description for status output.
    fn describe(&self) -> String;

    /// Read the value stored under `name`; `None` if nothing is stored.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Replace the value stored under `name`.
    fn set(&mut self, name: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Stores each entry as a file named after it inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl SingleValueStore for FileStore {
    fn describe(&self) -> String {
        format!("file store in {}", self.dir.display())
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        validate_entry_name(name)?;
        match fs::read_to_string(self.entry_path(name)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::Io(e)),
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        validate_entry_name(name)?;
        crate::crypto::credentials::create_private_dir(&self.dir)?;
        write_atomic(&self.entry_path(name), value.as_bytes()).map_err(|e| {
            VaultError::StorageWriteFailure(format!("cannot write entry '{name}': {e}"))
        })
    }
}

/// Write to a temp file in the same directory, then rename over `path`.
///
/// Readers never observe a half-written blob.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, data)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)
}

// ---------------------------------------------------------------------------
// EnvVarStore
// ---------------------------------------------------------------------------

/// Stores entries as environment variables of the current process.
///
/// A value exported by the user's shell profile is picked up on read.
/// Writes are visible to this process and the children it spawns; they
/// do not outlive the process, so the CLI never selects this store.
#[derive(Debug, Clone, Default)]
pub struct EnvVarStore;

impl SingleValueStore for EnvVarStore {
    fn describe(&self) -> String {
        "process environment".to_string()
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        // A non-Unicode value is passed through lossily; it then fails
        // base64 decoding like any other corrupted blob.
        Ok(std::env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        validate_entry_name(name)?;
        if value.contains('\0') {
            return Err(VaultError::StorageWriteFailure(
                "environment values cannot contain NUL".into(),
            ));
        }
        std::env::set_var(name, value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// UserEnvStore
// ---------------------------------------------------------------------------

/// Stores entries as per-user environment variables in
/// `HKCU\Environment`, which survive the process and the session.
///
/// Writes are mirrored into the current process environment so children
/// spawned afterwards see the new value without a new login.
#[cfg(windows)]
#[derive(Debug, Clone, Default)]
pub struct UserEnvStore;

#[cfg(windows)]
impl UserEnvStore {
    const SUBKEY: &'static str = "Environment";

    fn open_key(flags: u32) -> std::io::Result<winreg::RegKey> {
        winreg::RegKey::predef(winreg::enums::HKEY_CURRENT_USER)
            .open_subkey_with_flags(Self::SUBKEY, flags)
    }
}

#[cfg(windows)]
impl SingleValueStore for UserEnvStore {
    fn describe(&self) -> String {
        "user environment (HKCU\\Environment)".to_string()
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        validate_entry_name(name)?;
        let key = match Self::open_key(winreg::enums::KEY_READ) {
            Ok(key) => key,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(VaultError::Io(e)),
        };
        match key.get_value::<String, _>(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::Io(e)),
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        validate_entry_name(name)?;
        let key = Self::open_key(winreg::enums::KEY_READ | winreg::enums::KEY_WRITE).map_err(
            |e| VaultError::StorageWriteFailure(format!("cannot open HKCU\\Environment: {e}")),
        )?;
        key.set_value(name, &value.to_string()).map_err(|e| {
            VaultError::StorageWriteFailure(format!("cannot write user variable '{name}': {e}"))
        })?;
        std::env::set_var(name, value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store.  Clones share the same map, so a host can keep a
/// handle and observe what the vault wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SingleValueStore for MemoryStore {
    fn describe(&self) -> String {
        "in-memory store".to_string()
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Entry names double as file and variable names, and come from
/// configuration, so a bad one is a config error on read and write alike.
fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultError::ConfigError(
            "entry name cannot be empty".into(),
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
        || name.starts_with('.')
    {
        return Err(VaultError::ConfigError(format!(
            "entry name '{name}' is invalid; only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PersistenceBackend
// ---------------------------------------------------------------------------

/// One named entry in a `SingleValueStore`, plus a cache of the last blob
/// written through it.
pub struct PersistenceBackend {
    store: Box<dyn SingleValueStore>,
    entry: String,
    cached: Option<String>,
}

impl PersistenceBackend {
    pub fn new(store: Box<dyn SingleValueStore>, entry: impl Into<String>) -> Self {
        Self {
            store,
            entry: entry.into(),
            cached: None,
        }
    }

    /// Name of the entry the blob is stored under.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn describe(&self) -> String {
        format!("'{}' in {}", self.entry, self.store.describe())
    }

    /// The blob to decrypt: the cached one if this process wrote one,
    /// otherwise whatever the store holds.  An absent or empty entry is
    /// `None`, which is normal before the first write.
    pub fn load(&self) -> Result<Option<String>> {
        if let Some(blob) = &self.cached {
            return Ok(Some(blob.clone()));
        }
        Ok(self
            .store
            .get(&self.entry)?
            .filter(|blob| !blob.trim().is_empty()))
    }

    /// Write the blob to the store, then cache it.  Not retried.
    pub fn store(&mut self, blob: String) -> Result<()> {
        self.store.set(&self.entry, &blob)?;
        self.cached = Some(blob);
        Ok(())
    }

    /// Forget the cached blob so the next `load` reads the store.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }
}
