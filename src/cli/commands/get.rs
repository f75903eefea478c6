//! `secvault get` — print a single field's value.

use crate::cli::validate_name;
use crate::errors::{Result, VaultError};
use crate::vault::{FieldValue, Vault};

/// Execute the `get` command.
///
/// A null value prints an empty line; an absent field is an error so
/// scripts can tell the two apart by exit code.
pub fn execute(vault: &mut Vault, service: &str, field: &str) -> Result<()> {
    validate_name("service", service)?;
    validate_name("field", field)?;

    let value = vault
        .get(service, field)?
        .ok_or_else(|| VaultError::not_found(service, field))?;

    println!("{}", printable(&value));

    Ok(())
}

fn printable(value: &FieldValue) -> &str {
    value.as_str().unwrap_or_default()
}
