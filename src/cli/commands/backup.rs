//! `secvault backup` — snapshot the document and credential files.

use std::path::Path;

use crate::audit::log_audit;
use crate::cli::output;
use crate::config::Settings;
use crate::errors::Result;
use crate::vault::{BackupExporter, Vault};

/// Execute the `backup` command.
pub fn execute(settings: &Settings, vault: &mut Vault, dest: Option<&Path>) -> Result<()> {
    let root = match dest {
        Some(dir) => dir.to_path_buf(),
        None => settings.backup_root()?,
    };

    let report = BackupExporter::new(root).backup(vault)?;

    for warning in &report.warnings {
        output::warning(&format!("Warning: {warning}"));
    }

    log_audit(
        settings,
        "backup",
        None,
        None,
        Some(&report.dir.display().to_string()),
    );

    output::success(&format!(
        "Backup completed: {} ({} credential file(s) copied)",
        report.dir.display(),
        report.copied.len()
    ));
    output::tip("The backup contains plaintext secrets; store it somewhere safe.");

    Ok(())
}
