//! Strictly Morris - authoritative session engine for mill-forming board games
//!
//! Two participants, red and blue, place pieces on a grid of vertices,
//! then slide them along lines. Completing a line of three earns the right
//! to remove opposing pieces. The engine owns the rules: every transition
//! is validated, all-or-nothing, and produces a new immutable snapshot.
//!
//! # Architecture
//!
//! - **Games**: board model, phase machine and session engine
//!   ([`Session`], [`Board`], [`Phase`])
//! - **Config**: rule parameters ([`RuleSet`]), loadable from TOML
//! - **Session**: per-session serialized transitions with lock-free
//!   snapshot reads ([`SessionManager`])
//! - **Db**: persisted session records ([`SessionStore`], [`GameRepository`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strictly_morris::{GameType, MovePayload, Position, RuleSet, Session, Side};
//!
//! # fn example() -> Result<(), strictly_morris::MoveError> {
//! let session = Session::new(
//!     "game-1".to_string(),
//!     "alice".to_string(),
//!     "bob".to_string(),
//!     GameType::Friendly,
//!     Arc::new(RuleSet::default()),
//! )
//! .mark_ready(Side::Red)?
//! .mark_ready(Side::Blue)?;
//!
//! let next = session.submit_move(Side::Red, MovePayload::Place { to: Position::new(0, 0) })?;
//! assert_eq!(next.current_turn(), Some(Side::Blue));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod games;
mod session;

// Crate-level exports - Rules configuration
pub use config::{ConfigError, RuleSet};

// Crate-level exports - Persistence
pub use db::{
    DbError, DbErrorKind, GameRepository, MemoryStore, ParticipantRole, SessionRow, SessionStore,
};

// Crate-level exports - Session management
pub use session::{SessionError, SessionManager};

// Crate-level exports - Game types
pub use games::morris::{
    AcceptsMoves, Board, BoardMatchesCountsInvariant, BoardRecord, CompletionConsistentInvariant,
    Contract, ErrorKind, GameType, Grid, GridKind, Invariant, InvariantSet, InvariantViolation,
    Line, MoveClass, MoveEntry, MoveError, MovePayload, MoveRecord, Outcome, ParticipantId,
    PayloadMatchesPhase, PerSide, Phase, PhaseName, Piece, PieceId, PieceRecord,
    PlacedCountBoundedInvariant, PlayersRecord, Position, ReadyRecord, RecordError,
    ResumePhase, Session, SessionId, SessionInvariants, SessionRecord, SessionStatus, Side,
    SidesTurn, SubmitContract, TurnMatchesStatusInvariant,
};

/// Rule helpers: line detection, removal eligibility, mobility and terminal checks.
pub use games::morris::rules;
