//! `secvault delete` — remove a secret field.

use dialoguer::Confirm;

use crate::audit::log_audit;
use crate::cli::{output, validate_name};
use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::Vault;

/// Execute the `delete` command.
pub fn execute(
    settings: &Settings,
    vault: &mut Vault,
    service: &str,
    field: &str,
    force: bool,
) -> Result<()> {
    validate_name("service", service)?;
    validate_name("field", field)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete secret '{service}/{field}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    if remove_field(vault, service, field)? {
        output::tip(&format!("Service '{service}' had no fields left and was removed."));
    }

    log_audit(settings, "delete", Some(service), Some(field), None);

    Ok(())
}

/// Remove the field and report it; `true` if the service went with it.
fn remove_field(vault: &mut Vault, service: &str, field: &str) -> Result<bool> {
    vault.remove(service, field)?;
    output::success(&format!("Deleted secret '{service}/{field}'"));
    Ok(!vault.list_services()?.iter().any(|s| s == service))
}
