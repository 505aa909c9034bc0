//! Strictly Morris - Unified CLI
//!
//! Rule set inspection, record verification and session listing.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::{Path, PathBuf};
use strictly_morris::{
    GameRepository, ParticipantRole, RuleSet, Session, SessionRecord, SessionStatus,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Rules { config } => print_rules(config),
        Command::Replay { file } => replay(&file),
        Command::Sessions {
            db,
            participant,
            role,
            status,
        } => list_sessions(db, &participant, role, status),
    }
}

/// Print the effective rule set
#[instrument]
fn print_rules(config: Option<PathBuf>) -> Result<()> {
    let rules = match config {
        Some(path) => RuleSet::from_file(&path)?,
        None => RuleSet::default(),
    };
    print!("{}", rules.to_toml()?);
    Ok(())
}

/// Replay a stored record and print where it stands
#[instrument]
fn replay(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let record: SessionRecord = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let session = Session::from_record(&record)?;
    info!(session_id = session.id(), "Record verified");

    println!("{}", session.board().display());
    println!();
    println!("status: {}", session.status());
    println!("phase:  {}", session.phase());
    match session.current_turn() {
        Some(side) => println!("turn:   {}", side),
        None => println!("turn:   -"),
    }
    println!("moves:  {}", session.moves().len());
    Ok(())
}

/// List stored sessions
#[instrument]
fn list_sessions(
    db: String,
    participant: &str,
    role: ParticipantRole,
    status: SessionStatus,
) -> Result<()> {
    let repo = GameRepository::open(db)?;
    let records = repo.find_sessions(participant, role, status)?;

    for record in &records {
        println!(
            "{}\t{} vs {}\t{}\t{} moves\t{}",
            record.id,
            record.initiator_id,
            record.opponent_id,
            record.game_type,
            record.moves.len(),
            record.updated_at.to_rfc3339(),
        );
    }
    info!(count = records.len(), "Listed sessions");
    Ok(())
}
