//! `secvault audit` — display the operation log.
//!
//! Usage:
//!   secvault audit               # last 50 operations
//!   secvault audit --last 20
//!   secvault audit --since 7d    # also 24h, 30m

use chrono::{DateTime, Duration, Utc};

use crate::cli::output;
use crate::config::Settings;
use crate::errors::{Result, VaultError};

/// Execute the `audit` command.
#[cfg(feature = "audit-log")]
pub fn execute(settings: &Settings, last: usize, since: Option<&str>) -> Result<()> {
    let since = since.map(parse_since).transpose()?;

    let log = crate::audit::AuditLog::open(&settings.audit_db_path()).ok_or_else(|| {
        VaultError::AuditError(format!(
            "cannot open {}",
            settings.audit_db_path().display()
        ))
    })?;

    let entries = log.query(last, since)?;
    if entries.is_empty() {
        output::info("No operations recorded yet.");
        return Ok(());
    }

    output::print_audit_table(&entries);
    Ok(())
}

/// Execute the `audit` command.
#[cfg(not(feature = "audit-log"))]
pub fn execute(_settings: &Settings, _last: usize, since: Option<&str>) -> Result<()> {
    since.map(parse_since).transpose()?;
    output::warning("This build records no operations (built without `audit-log`).");
    Ok(())
}

/// Turn `7d` / `24h` / `30m` into the instant that long ago.
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        VaultError::CommandFailed(format!(
            "invalid duration '{input}': expected a number followed by d, h or m (e.g. 7d)"
        ))
    };

    let unit = input.chars().last().ok_or_else(invalid)?;
    let amount: i64 = input[..input.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;
    if amount < 0 {
        return Err(invalid());
    }

    let span = match unit {
        'd' => Duration::try_days(amount),
        'h' => Duration::try_hours(amount),
        'm' => Duration::try_minutes(amount),
        _ => None,
    };

    span.and_then(|span| Utc::now().checked_sub_signed(span))
        .ok_or_else(invalid)
}
