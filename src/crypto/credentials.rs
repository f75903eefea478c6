//! Local credential material that seeds key derivation.
//!
//! Two raw files live in the per-user config directory:
//! - `salt.bin`: 16 random bytes
//! - `secret_password.bin`: 32 random bytes
//!
//! Both are generated on first use and read verbatim forever after.
//! Regenerating either one makes every existing blob undecryptable, so
//! nothing here ever overwrites an existing file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Length of a freshly generated salt.
pub const SALT_LEN: usize = 16;

/// Length of a freshly generated password.
pub const PASSWORD_LEN: usize = 32;

/// File name of the salt inside the config directory.
pub const SALT_FILE: &str = "salt.bin";

/// File name of the password inside the config directory.
pub const PASSWORD_FILE: &str = "secret_password.bin";

/// Handle on the salt and password files in one directory.
#[derive(Debug, Clone)]
pub struct CredentialMaterial {
    dir: PathBuf,
}

impl CredentialMaterial {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn salt_path(&self) -> PathBuf {
        self.dir.join(SALT_FILE)
    }

    pub fn password_path(&self) -> PathBuf {
        self.dir.join(PASSWORD_FILE)
    }

    /// The credential files keyed by the short name used in backups.
    pub fn files(&self) -> [(&'static str, PathBuf); 2] {
        [("salt", self.salt_path()), ("password", self.password_path())]
    }

    /// Return the salt, generating and persisting it on first use.
    pub fn get_or_create_salt(&self) -> Result<Zeroizing<Vec<u8>>> {
        get_or_create(&self.salt_path(), SALT_LEN)
    }

    /// Return the password, generating and persisting it on first use.
    pub fn get_or_create_password(&self) -> Result<Zeroizing<Vec<u8>>> {
        get_or_create(&self.password_path(), PASSWORD_LEN)
    }
}

/// Read `path` verbatim, or create it with `len` random bytes.
///
/// Existing contents are not validated: whatever was used to encrypt the
/// vault is what has to be used to decrypt it.
fn get_or_create(path: &Path, len: usize) -> Result<Zeroizing<Vec<u8>>> {
    if path.exists() {
        return read_existing(path);
    }

    let mut bytes = Zeroizing::new(vec![0u8; len]);
    rand::rng().fill_bytes(&mut bytes);

    if let Some(parent) = path.parent() {
        create_private_dir(parent)?;
    }

    // `create_new` so a concurrent first run can never clobber material
    // another process already used.
    let mut file = match open_new_private(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return read_existing(path),
        Err(e) => {
            return Err(VaultError::StorageWriteFailure(format!(
                "cannot create {}: {e}",
                path.display()
            )));
        }
    };

    file.write_all(&bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            VaultError::StorageWriteFailure(format!("cannot write {}: {e}", path.display()))
        })?;

    Ok(bytes)
}

fn read_existing(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    fs::read(path)
        .map(Zeroizing::new)
        .map_err(|e| VaultError::MissingCredentialMaterial {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Create `dir` (and parents); on Unix restrict it to the owner.
pub(crate) fn create_private_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| {
        VaultError::StorageWriteFailure(format!("cannot create directory {}: {e}", dir.display()))
    })?;

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

    Ok(())
}

fn open_new_private(path: &Path) -> std::io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}
