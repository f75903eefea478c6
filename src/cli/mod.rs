//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;
use crate::errors::{Result, VaultError};

/// secvault CLI: local encrypted secrets vault.
#[derive(Parser)]
#[command(
    name = "secvault",
    about = "Local encrypted secrets vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory holding the credential files (default: ~/.secrets_manager)
    #[arg(long, global = true, env = "SECVAULT_DIR")]
    pub config_dir: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print one secret field
    Get {
        /// Service name (e.g. github)
        service: String,
        /// Field name (e.g. token)
        field: String,
    },

    /// Set a secret field (add or update)
    Set {
        /// Service name
        service: String,
        /// Field name
        field: String,
        /// Field value (omit for interactive prompt; empty stores null)
        value: Option<String>,
    },

    /// Delete a secret field
    Delete {
        /// Service name
        service: String,
        /// Field name
        field: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List all services
    List,

    /// Show the fields of one service
    Show {
        /// Service name
        service: String,
        /// Print values instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Import secrets from a JSON file shaped as {"services": {...}}
    Import {
        /// Path to the JSON file
        file: PathBuf,
        /// Replace the whole vault instead of merging into it
        #[arg(long)]
        overwrite: bool,
        /// Skip confirmation prompt when overwriting
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the decrypted document as JSON
    Export {
        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Back up the document and credential files to a timestamped directory
    Backup {
        /// Directory to create the backup in (default: config `backup_dir` or cwd)
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// View the log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the config directory and load `secvault.toml` from it.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let dir = Settings::resolve_config_dir(cli.config_dir.as_deref())?;
    Settings::load(&dir)
}

/// Validate a service or field name typed on the command line.
///
/// The document itself accepts any string; the CLI only refuses names
/// that are empty or padded, since those are almost always typos.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultError::CommandFailed(format!("{kind} name cannot be empty")));
    }
    if name.trim() != name {
        return Err(VaultError::CommandFailed(format!(
            "{kind} name '{name}' has leading or trailing whitespace"
        )));
    }
    Ok(())
}
