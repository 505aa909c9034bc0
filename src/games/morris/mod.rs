//! Mill-forming board games ("morris"): board model, phase machine and session engine.

mod action;
mod board;
mod contracts;
mod engine;
mod grid;
mod invariants;
mod phases;
mod record;
pub mod rules;
mod session;
mod types;

pub use action::{ErrorKind, MoveClass, MoveError, MovePayload, MoveRecord};
pub use board::Board;
pub use contracts::{AcceptsMoves, Contract, PayloadMatchesPhase, SidesTurn, SubmitContract};
pub use grid::{Grid, GridKind, Line};
pub use invariants::{
    BoardMatchesCountsInvariant, CompletionConsistentInvariant, Invariant, InvariantSet,
    InvariantViolation, PlacedCountBoundedInvariant, SessionInvariants,
    TurnMatchesStatusInvariant,
};
pub use phases::{GameType, Outcome, Phase, ResumePhase, SessionStatus};
pub use record::{
    BoardRecord, MoveEntry, PhaseName, PieceRecord, PlayersRecord, ReadyRecord, RecordError,
    SessionRecord,
};
pub use session::{ParticipantId, Session, SessionId};
pub use types::{PerSide, Piece, PieceId, Position, Side};
