//! `secvault show` — display the fields of one service.

use crate::cli::{output, validate_name};
use crate::errors::Result;
use crate::vault::Vault;

/// Execute the `show` command.
pub fn execute(vault: &mut Vault, service: &str, reveal: bool) -> Result<()> {
    validate_name("service", service)?;

    let fields = vault.get_all_for_service(service)?;
    if fields.is_empty() {
        output::info(&format!("Service '{service}' has no fields."));
        return Ok(());
    }

    output::info(&format!("{service}: {} field(s)", fields.len()));
    output::print_fields_table(&fields, reveal);

    if !reveal {
        output::tip("Pass --reveal to print values.");
    }

    Ok(())
}
