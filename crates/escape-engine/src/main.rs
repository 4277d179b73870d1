//! # Escape EM
//!
//! Command-line front end for the escape room's progress codes.
//!
//! Reads the locally saved game and lets a player:
//! - Export it as a portable code
//! - Import a code produced on another device
//! - Inspect or reset the saved game

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use escape_gameplay::{
    FileStore, GameSession, ImportOutcome, Milestone, ProgressState, PuzzleStatus, SessionError,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{Cli, Command};
use crate::config::{EngineConfig, DEFAULT_LOG_FILTER};

/// Main entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Read the config before tracing starts so its filter applies, but log
    // the outcome only once the subscriber is installed.
    let config_path = cli.config.clone().unwrap_or_else(EngineConfig::config_path);
    let loaded = EngineConfig::read_from(&config_path);
    let log_filter = match &loaded {
        Ok(Some(config)) => config.log_filter.as_str(),
        _ => DEFAULT_LOG_FILTER,
    };

    // RUST_LOG wins over the configured filter.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("Escape EM {}", env!("CARGO_PKG_VERSION"));
    let config = EngineConfig::from_loaded(loaded, &config_path);

    match cli.command {
        Command::InitConfig { force } => init_config(&config, &config_path, force),
        command => run_session(command, cli.save_dir, &config, &config_path),
    }
}

/// Writes the effective configuration to `path`.
fn init_config(config: &EngineConfig, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config
        .save_to(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Runs a command against the saved game.
fn run_session(
    command: Command,
    save_dir: Option<PathBuf>,
    config: &EngineConfig,
    config_path: &Path,
) -> Result<()> {
    let save_dir = save_dir.unwrap_or_else(|| config.resolved_save_dir());
    let store = FileStore::new(&save_dir);
    info!("Progress record: {}", store.path().display());

    let mut session = GameSession::open(store)
        .context("failed to open saved game")?
        .with_teacher_code(config.teacher_code.clone());

    match command {
        Command::Export => println!("{}", session.export_code()),
        Command::Import { code } => match session.import_code(&code) {
            Ok(ImportOutcome::Restored) => {
                println!("Progress restored.");
                print_status(session.state());
            },
            Ok(ImportOutcome::TeacherMode) => println!("Teacher mode enabled."),
            Err(SessionError::Code(e)) => {
                anyhow::bail!("{} ({e})", e.kind().player_message());
            },
            Err(e) => return Err(e).context("failed to save imported progress"),
        },
        Command::Status => print_status(session.state()),
        Command::Reset => {
            session.reset().context("failed to reset saved game")?;
            println!("Saved game deleted.");
        },
        Command::InitConfig { force } => return init_config(config, config_path, force),
    }

    Ok(())
}

fn print_status(state: &ProgressState) {
    println!("Scene:       {}", state.current_scene_id);

    let seals: Vec<String> = Milestone::ALL
        .into_iter()
        .map(|m| {
            let mark = if state.is_milestone_complete(m) { 'x' } else { ' ' };
            format!("[{mark}] {m}")
        })
        .collect();
    println!("Seals:       {}", seals.join("  "));

    let done = state
        .puzzle_states
        .values()
        .filter(|p| p.status == PuzzleStatus::Done)
        .count();
    println!("Puzzles:     {done}/{} done", state.puzzle_states.len());

    let items: Vec<&str> = state.inventory.iter().map(|item| item.as_str()).collect();
    if items.is_empty() {
        println!("Inventory:   (empty)");
    } else {
        println!("Inventory:   {}", items.join(", "));
    }

    if state.teacher_mode() {
        println!("Teacher mode is on.");
    }
}
