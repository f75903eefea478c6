//! `secvault set` — add or update a secret field.

use std::io::{self, IsTerminal, Read};

use crate::audit::log_audit;
use crate::cli::{output, validate_name};
use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::{FieldValue, Vault};

/// Execute the `set` command.
pub fn execute(
    settings: &Settings,
    vault: &mut Vault,
    service: &str,
    field: &str,
    value: Option<&str>,
) -> Result<()> {
    validate_name("service", service)?;
    validate_name("field", field)?;

    // Determine the value from one of three sources.
    let raw = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line; it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end().to_string()
    } else {
        // Source 3: Interactive secure prompt (default).
        dialoguer::Password::new()
            .with_prompt(format!("Enter value for {service}/{field} (leave empty for null)"))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?
    };

    let field_value = to_field_value(raw);

    let existed = vault.get(service, field)?.is_some();
    vault.set(service, field, field_value)?;

    let op_detail = if existed { "updated" } else { "added" };
    log_audit(settings, "set", Some(service), Some(field), Some(op_detail));

    output::success(&format!("Secret '{service}/{field}' {op_detail}"));

    Ok(())
}

/// Empty input means "known field, no value".
fn to_field_value(raw: String) -> FieldValue {
    if raw.is_empty() {
        FieldValue::null()
    } else {
        FieldValue::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::fixture;

    #[test]
    fn empty_input_becomes_null() {
        assert!(to_field_value(String::new()).is_null());
    }

    #[test]
    fn non_empty_input_is_kept_verbatim() {
        assert_eq!(to_field_value(" x ".into()).as_str(), Some(" x "));
    }

    #[test]
    fn empty_inline_value_stores_null() {
        let (_dir, settings, mut vault) = fixture();
        execute(&settings, &mut vault, "db", "pass", Some("")).unwrap();

        let value = vault.get("db", "pass").unwrap().unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn inline_value_is_stored_and_overwritten() {
        let (_dir, settings, mut vault) = fixture();
        execute(&settings, &mut vault, "db", "user", Some("admin")).unwrap();
        execute(&settings, &mut vault, "db", "user", Some("root")).unwrap();

        let value = vault.get("db", "user").unwrap().unwrap();
        assert_eq!(value.as_str(), Some("root"));
        assert_eq!(vault.list_services().unwrap(), vec!["db"]);
    }

    #[test]
    fn empty_field_name_is_refused_before_writing() {
        let (_dir, settings, mut vault) = fixture();
        assert!(execute(&settings, &mut vault, "db", "", Some("x")).is_err());
        assert!(!vault.backend().is_cached());
    }
}
