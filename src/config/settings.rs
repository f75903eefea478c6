use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::BlobFormat;
use crate::errors::{Result, VaultError};
use crate::vault::backend::{FileStore, SingleValueStore};

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "SECVAULT_DIR";

/// Default config directory name under the user's home.
const DEFAULT_DIR_NAME: &str = ".secrets_manager";

/// Which `SingleValueStore` holds the encrypted blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// A file named after the entry, inside the config directory.
    #[default]
    File,
    /// The persistent per-user environment (`HKCU\Environment`).
    /// Windows only; elsewhere a write would not outlive the process.
    Env,
    /// The OS keyring (requires the `keyring-store` feature).
    Keyring,
}

/// Per-user configuration, loaded from `<config_dir>/secvault.toml`.
///
/// Every field has a sensible default so secvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the credential files, the config file and
    /// (for the file store) the blob.  Not read from the file itself.
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Name of the entry the encrypted blob is stored under.
    #[serde(default = "default_entry_name")]
    pub entry_name: String,

    /// Where the blob lives.
    #[serde(default)]
    pub store: StoreKind,

    /// Blob framing.  Must stay the same for the life of a vault.
    #[serde(default)]
    pub blob_format: BlobFormat,

    /// Root directory for backups (default: current directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_entry_name() -> String {
    "ENCRYPTED_SECRETS".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_DIR_NAME),
            entry_name: default_entry_name(),
            store: StoreKind::default(),
            blob_format: BlobFormat::default(),
            backup_dir: None,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    pub const FILE_NAME: &'static str = "secvault.toml";

    /// Resolve the config directory.
    ///
    /// Order: explicit override, then `SECVAULT_DIR`, then
    /// `~/.secrets_manager`.
    pub fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_DIR_NAME))
            .ok_or_else(|| {
                VaultError::ConfigError(format!(
                    "cannot determine home directory; set {CONFIG_DIR_ENV}"
                ))
            })
    }

    /// Load settings from `<config_dir>/secvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        let mut settings = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&contents).map_err(|e| {
                VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
            })?
        } else {
            Self::default()
        };

        settings.config_dir = config_dir.to_path_buf();
        Ok(settings)
    }

    /// Root directory for backups.
    pub fn backup_root(&self) -> Result<PathBuf> {
        match &self.backup_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Path of the operation log database.
    pub fn audit_db_path(&self) -> PathBuf {
        self.config_dir.join("audit.db")
    }

    /// Build the configured blob store.
    pub fn open_store(&self) -> Result<Box<dyn SingleValueStore>> {
        match self.store {
            StoreKind::File => Ok(Box::new(FileStore::new(&self.config_dir))),
            #[cfg(windows)]
            StoreKind::Env => Ok(Box::new(crate::vault::backend::UserEnvStore)),
            #[cfg(not(windows))]
            StoreKind::Env => Err(VaultError::ConfigError(
                "store = \"env\" needs the Windows per-user environment; use \"file\" or \"keyring\" here".into(),
            )),
            #[cfg(feature = "keyring-store")]
            StoreKind::Keyring => Ok(Box::new(crate::keyring::KeyringStore)),
            #[cfg(not(feature = "keyring-store"))]
            StoreKind::Keyring => Err(VaultError::ConfigError(
                "store = \"keyring\" requires building with `--features keyring-store`".into(),
            )),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
