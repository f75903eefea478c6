//! `secvault list` — display all services in a table.

use crate::cli::output;
use crate::errors::Result;
use crate::vault::Vault;

/// Execute the `list` command.
pub fn execute(vault: &mut Vault) -> Result<()> {
    let doc = vault.document()?;
    let services: Vec<(String, usize)> = doc
        .services
        .iter()
        .map(|(name, fields)| (name.clone(), fields.len()))
        .collect();

    output::info(&format!("{} service(s)", services.len()));
    output::print_services_table(&services);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::fixture;

    #[test]
    fn lists_empty_and_populated_vaults() {
        let (_dir, _settings, mut vault) = fixture();
        execute(&mut vault).unwrap();

        vault.set("github", "token", "ghp").unwrap();
        execute(&mut vault).unwrap();
        // Listing never writes.
        let blob = vault.backend().load().unwrap();
        execute(&mut vault).unwrap();
        assert_eq!(vault.backend().load().unwrap(), blob);
    }
}
