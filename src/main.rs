use clap::Parser;
use secvault::cli::{commands, load_settings, output, Cli, Commands};
use secvault::config::Settings;
use secvault::errors::Result;
use secvault::vault::Vault;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that never touch the vault skip key derivation.
    if let Commands::Completions { shell } = cli.command {
        return commands::completions::execute(shell);
    }

    let settings = load_settings(&cli)?;

    if let Commands::Audit { last, ref since } = cli.command {
        return commands::audit_cmd::execute(&settings, last, since.as_deref());
    }

    let mut vault = Vault::open(&settings)?;
    dispatch(&settings, &mut vault, cli.command)
}

fn dispatch(settings: &Settings, vault: &mut Vault, command: Commands) -> Result<()> {
    match command {
        Commands::Get { service, field } => commands::get::execute(vault, &service, &field),
        Commands::Set {
            service,
            field,
            value,
        } => commands::set::execute(settings, vault, &service, &field, value.as_deref()),
        Commands::Delete {
            service,
            field,
            force,
        } => commands::delete::execute(settings, vault, &service, &field, force),
        Commands::List => commands::list::execute(vault),
        Commands::Show { service, reveal } => commands::show::execute(vault, &service, reveal),
        Commands::Import {
            file,
            overwrite,
            yes,
        } => commands::import_cmd::execute(settings, vault, &file, overwrite, yes),
        Commands::Export { output } => {
            commands::export::execute(settings, vault, output.as_deref())
        }
        Commands::Backup { dest } => commands::backup::execute(settings, vault, dest.as_deref()),
        Commands::Audit { .. } | Commands::Completions { .. } => Ok(()),
    }
}
