use blt::{
    Config, FsStore, Journal, Profile,
    cli::{self, Cli, Commands},
    logging, utils,
};
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::io;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev selects a separate config and data directory
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load_with_profile(profile)?,
    };

    let env_value = std::env::var(utils::DATA_DIR_ENV).ok();
    let data_root = utils::resolve_data_root(
        cli.data_dir.as_deref(),
        env_value.as_deref(),
        config.data_dir(),
        profile,
    )
    .ok_or_else(|| eyre!("Could not determine a data directory; pass --data-dir or set {}", utils::DATA_DIR_ENV))?;

    if let Err(e) = logging::init_logging(&config.log_level, &data_root.join("logs")) {
        eprintln!("WARNING: logging disabled: {}", e);
    }

    let store = FsStore::new(&data_root)?;
    let journal = Journal::new(store);
    let mut out = io::stdout().lock();

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            drop(out);
            let app = blt::tui::App::new(config, journal, data_root)?;
            blt::tui::run_event_loop(app)?;
        }
        Commands::List { timespan, date, kinds, tags, text, json } => {
            cli::handle_list(&journal, timespan, date, kinds, tags, text, json, &mut out)?;
        }
        Commands::Add { text, note, kind, date, tags } => {
            cli::handle_add(&journal, text, note, kind, date, tags, &mut out)?;
        }
        Commands::Delete { index, date } => {
            cli::handle_delete(&journal, index, date, &mut out)?;
        }
        Commands::Complete { index, date } => {
            cli::handle_complete(&journal, index, date, &mut out)?;
        }
        Commands::Migrate { index, date } => {
            cli::handle_migrate(&journal, index, date, &mut out)?;
        }
        Commands::Schedule { index, date, to } => {
            cli::handle_schedule(&journal, index, date, to, &mut out)?;
        }
        Commands::Edit { index, date, set } => {
            cli::handle_edit(&journal, index, date, set, &mut out)?;
        }
        Commands::Retype { index, date, kind } => {
            cli::handle_retype(&journal, index, date, kind, &mut out)?;
        }
        Commands::Tag { index, date, tags } => {
            cli::handle_tag(&journal, index, date, tags, &mut out)?;
        }
    }

    Ok(())
}
