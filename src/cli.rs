//! Command-line interface for strictly_morris.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_morris::{ParticipantRole, SessionStatus};

/// Strictly Morris - authoritative session engine for mill-forming games
#[derive(Parser, Debug)]
#[command(name = "strictly_morris")]
#[command(about = "Inspect rule sets and stored morris sessions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective rule set as TOML
    Rules {
        /// Rule set file; defaults to nine men's morris
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Verify a session record (JSON) by replaying its move log
    Replay {
        /// Path to the session record
        file: PathBuf,
    },

    /// List stored sessions for a participant
    Sessions {
        /// Path to the database file
        #[arg(long, default_value = "strictly_morris.db")]
        db: String,

        /// Participant id
        #[arg(long)]
        participant: String,

        /// Role the participant holds (initiator or opponent)
        #[arg(long, default_value = "initiator")]
        role: ParticipantRole,

        /// Session status (pending, active, completed, declined)
        #[arg(long, default_value = "active")]
        status: SessionStatus,
    },
}
