//! rFichaje library root.
//! Exposes the CLI parser, the attendance services and their storage.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use crate::core::clock::{Clock, FixedClock, SystemClock};
use errors::AppResult;

/// Clock for this invocation: pinned by `--now`, otherwise the system clock
/// in the configured civil time zone.
pub fn clock_for(cli: &Cli, cfg: &Config) -> AppResult<Box<dyn Clock>> {
    match &cli.now {
        Some(raw) => Ok(Box::new(FixedClock::new(utils::time::require_datetime(raw)?))),
        None => Ok(Box::new(SystemClock::new(cfg.offset()?))),
    }
}

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let clock = clock_for(cli, cfg)?;
    let clock = clock.as_ref();

    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Plan { .. } => cli::commands::plan::handle(&cli.command, cfg),
        Commands::Shifts { .. } => cli::commands::shifts::handle(&cli.command, cfg, clock),
        Commands::Clock { .. } => cli::commands::clock::handle(&cli.command, cfg, clock),
        Commands::Status { .. } => cli::commands::status::handle(&cli.command, cfg, clock),
        Commands::Eligibility { .. } => {
            cli::commands::eligibility::handle(&cli.command, cfg, clock)
        }
        Commands::Transitions { .. } => {
            cli::commands::transitions::handle(&cli.command, cfg, clock)
        }
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once and shared by every handler
    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }

    dispatch(&cli, &cfg)
}
