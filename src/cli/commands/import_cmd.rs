//! `secvault import` — load secrets from a JSON file.
//!
//! The file must use the same shape as the vault document:
//!
//! ```json
//! { "services": { "github": { "token": "..." } } }
//! ```
//!
//! By default the file is merged into the vault (fields in the file win);
//! `--overwrite` replaces the vault contents entirely.

use std::io::{self, IsTerminal};
use std::path::Path;

use dialoguer::Confirm;

use crate::audit::log_audit;
use crate::cli::output;
use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::{ImportMode, Vault};

/// Execute the `import` command.
pub fn execute(
    settings: &Settings,
    vault: &mut Vault,
    file: &Path,
    overwrite: bool,
    yes: bool,
) -> Result<()> {
    let mode = if overwrite {
        ImportMode::Overwrite
    } else {
        ImportMode::Append
    };
    import(settings, vault, file, mode, yes, |existing| {
        prompt_overwrite(existing, file)
    })?;
    Ok(())
}

/// Import `file`, asking `confirm` before an overwrite discards a
/// populated vault (unless `yes`).  Returns the imported service count.
fn import(
    settings: &Settings,
    vault: &mut Vault,
    file: &Path,
    mode: ImportMode,
    yes: bool,
    confirm: impl FnOnce(usize) -> Result<bool>,
) -> Result<usize> {
    if !file.exists() {
        return Err(VaultError::CommandFailed(format!(
            "import file not found: {}",
            file.display()
        )));
    }

    if mode == ImportMode::Overwrite && !yes {
        let existing = vault.list_services()?.len();
        if existing > 0 && !confirm(existing)? {
            return Err(VaultError::UserCancelled);
        }
    }

    let count = vault.import_json_file(file, mode)?;

    let verb = match mode {
        ImportMode::Append => "merged",
        ImportMode::Overwrite => "overwrote with",
    };
    log_audit(
        settings,
        "import",
        None,
        None,
        Some(&format!("{verb} {count} services from {}", file.display())),
    );

    output::success(&format!(
        "Imported {count} service(s) from {} ({})",
        file.display(),
        match mode {
            ImportMode::Append => "append",
            ImportMode::Overwrite => "overwrite",
        }
    ));

    Ok(count)
}

fn prompt_overwrite(existing: usize, file: &Path) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Err(VaultError::CommandFailed(format!(
            "vault holds {existing} service(s); pass --yes to overwrite them without a prompt"
        )));
    }

    Confirm::new()
        .with_prompt(format!(
            "Vault holds {existing} service(s). Replace them all with {}?",
            file.display()
        ))
        .default(false)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))
}
