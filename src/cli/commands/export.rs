//! `secvault export` — print or save the decrypted document as JSON.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::audit::log_audit;
use crate::cli::output;
use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::Vault;

/// Execute the `export` command.
pub fn execute(settings: &Settings, vault: &mut Vault, output_path: Option<&Path>) -> Result<()> {
    // Never clobber an existing file with plaintext secrets.
    if let Some(dest) = output_path.filter(|p| p.exists()) {
        return Err(VaultError::CommandFailed(format!(
            "refusing to overwrite existing file {}",
            dest.display()
        )));
    }

    let json = vault.export()?;

    log_audit(
        settings,
        "export",
        None,
        None,
        output_path.map(|p| p.display().to_string()).as_deref(),
    );

    match output_path {
        Some(dest) => {
            write_private(dest, json.as_bytes()).map_err(|e| {
                VaultError::StorageWriteFailure(format!("failed to write export file: {e}"))
            })?;

            output::success(&format!("Exported secrets to {}", dest.display()));
            output::warning("The export is plaintext; delete it when you are done.");
        }
        None => {
            // Write to stdout (no success message, just raw output).
            println!("{}", json.as_str());
        }
    }

    Ok(())
}

/// Create `path` (failing if it appeared meanwhile) with owner-only
/// permissions from the start.
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)?.write_all(data)
}
