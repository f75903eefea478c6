//! Backups of the decrypted document plus the credential files.
//!
//! Layout:
//!
//! ```text
//! <root>/secrets_backup_<YYYYMMDD_HHMMSS>/
//!     secrets_backup.json   plaintext document
//!     salt.bin              copy of the salt file
//!     password.bin          copy of the password file
//! ```
//!
//! The JSON file is plaintext.  Whoever holds a backup directory holds
//! every secret in it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::errors::{Result, VaultError};

use super::store::Vault;

/// Name of the plaintext snapshot inside a backup directory.
pub const BACKUP_JSON: &str = "secrets_backup.json";

/// Prefix of every backup directory name.
pub const BACKUP_PREFIX: &str = "secrets_backup_";

/// Outcome of a backup run.
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// The directory that was created.
    pub dir: PathBuf,
    /// Credential files that made it into the backup.
    pub copied: Vec<PathBuf>,
    /// Per-file problems that did not stop the backup.
    pub warnings: Vec<String>,
}

/// Writes backups under a root directory.
#[derive(Debug, Clone)]
pub struct BackupExporter {
    root: PathBuf,
}

impl BackupExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Snapshot `vault` into a new timestamped directory.
    ///
    /// Failing to export the document, create the directory or write the
    /// JSON is an error.  A credential file that is missing or cannot be
    /// copied only adds a warning.
    pub fn backup(&self, vault: &mut Vault) -> Result<BackupReport> {
        let snapshot = vault.export()?;

        let dir = self.create_unique_dir()?;

        let json_path = dir.join(BACKUP_JSON);
        write_private(&json_path, snapshot.as_bytes()).map_err(|e| {
            VaultError::StorageWriteFailure(format!("cannot write {}: {e}", json_path.display()))
        })?;

        let mut copied = Vec::new();
        let mut warnings = Vec::new();

        match vault.credentials() {
            Some(credentials) => {
                for (label, source) in credentials.files() {
                    let target = dir.join(format!("{label}.bin"));
                    match fs::copy(&source, &target) {
                        Ok(_) => copied.push(target),
                        Err(e) if e.kind() == ErrorKind::NotFound => warnings.push(format!(
                            "{label} file not found at {}",
                            source.display()
                        )),
                        Err(e) => warnings.push(format!(
                            "could not copy {label} file {}: {e}",
                            source.display()
                        )),
                    }
                }
            }
            None => warnings.push("no credential files are attached to this vault".to_string()),
        }

        Ok(BackupReport {
            dir,
            copied,
            warnings,
        })
    }

    /// `secrets_backup_<timestamp>`, with `_<n>` appended if two backups
    /// land in the same second.
    fn create_unique_dir(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| {
            VaultError::StorageWriteFailure(format!(
                "cannot create backup root {}: {e}",
                self.root.display()
            ))
        })?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let base = format!("{BACKUP_PREFIX}{stamp}");

        for attempt in 0u32.. {
            let name = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}_{attempt}")
            };
            let dir = self.root.join(name);
            match fs::create_dir(&dir) {
                Ok(()) => {
                    restrict_dir(&dir)?;
                    return Ok(dir);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(VaultError::StorageWriteFailure(format!(
                        "cannot create backup directory {}: {e}",
                        dir.display()
                    )));
                }
            }
        }

        Err(VaultError::StorageWriteFailure(
            "no free backup directory name".into(),
        ))
    }
}

fn restrict_dir(dir: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700)).map_err(|e| {
            VaultError::StorageWriteFailure(format!(
                "failed to set permissions on {}: {e}",
                dir.display()
            ))
        })?;
    }
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
