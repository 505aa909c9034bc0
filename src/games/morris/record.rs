//! Persisted form of a session.
//!
//! The record is the logical layout a storage collaborator saves and
//! loads. Loading never trusts the stored board: the move log is replayed
//! and must reproduce it.

use super::invariants::{InvariantSet, SessionInvariants};
use super::{
    GameType, MoveError, MovePayload, MoveRecord, Outcome, Phase, PieceId, Position,
    ResumePhase, Session, SessionStatus, Side,
};
use crate::config::RuleSet;
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Persisted session document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Session id.
    pub id: String,
    /// Participant who created the session.
    pub initiator_id: String,
    /// Invited participant.
    pub opponent_id: String,
    /// Participant per side.
    pub players: PlayersRecord,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Stake type.
    pub game_type: GameType,
    /// Rules in force.
    pub rules: RuleSet,
    /// In-game phase name.
    pub phase: PhaseName,
    /// Phase to resume after a removal, only while removing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_phase: Option<ResumePhase>,
    /// Removals owed, only while removing.
    #[serde(default)]
    pub pending_removals: u8,
    /// Side that must act next.
    pub current_turn: Option<Side>,
    /// Pieces on the board.
    pub board: BoardRecord,
    /// Pieces placed by red.
    pub placed_pieces_red: u8,
    /// Pieces placed by blue.
    pub placed_pieces_blue: u8,
    /// Ready flags.
    pub ready_players: ReadyRecord,
    /// Winner of a decisive game.
    pub winner: Option<Side>,
    /// True for a drawn game.
    #[serde(default)]
    pub is_draw: bool,
    /// Consecutive relocations since the last removal.
    #[serde(default)]
    pub quiet_moves: u32,
    /// Move log, oldest first.
    pub moves: Vec<MoveEntry>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last change.
    pub updated_at: DateTime<Utc>,
}

/// Participants by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayersRecord {
    /// Red participant.
    pub red: String,
    /// Blue participant.
    pub blue: String,
}

/// Ready flags by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyRecord {
    /// Red is ready.
    pub red: bool,
    /// Blue is ready.
    pub blue: bool,
}

/// Phase name as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseName {
    /// Placing.
    Placing,
    /// Moving.
    Moving,
    /// Removing.
    Removing,
    /// Game over.
    GameOver,
}

/// On-board pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRecord {
    /// Pieces in grid vertex order.
    pub pieces: Vec<PieceRecord>,
}

/// One on-board piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRecord {
    /// Piece id.
    pub id: PieceId,
    /// Owning side.
    pub side: Side,
    /// Where it stands.
    pub position: Position,
}

/// One move in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntry {
    /// Participant who made the move.
    pub player_id: String,
    /// Encoded payload (`place x,y`, `move x,y x,y`, `remove x,y`).
    #[serde(rename = "move")]
    pub encoded_move: String,
    /// When the move was accepted.
    pub timestamp: DateTime<Utc>,
}

/// A stored record that cannot be turned back into a session.
#[derive(Debug, Clone, Display, Error)]
#[display("Invalid session record {}: {}", session_id, message)]
pub struct RecordError {
    /// Offending session.
    pub session_id: String,
    /// What is wrong with it.
    pub message: String,
}

impl RecordError {
    fn new(session_id: &str, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.to_string(),
            message: message.into(),
        }
    }
}

impl Session {
    /// Converts the snapshot to its persisted form.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn to_record(&self) -> SessionRecord {
        let (phase, resume_phase, pending_removals) = match self.phase {
            Phase::Placing => (PhaseName::Placing, None, 0),
            Phase::Moving => (PhaseName::Moving, None, 0),
            Phase::Removing { resume, pending } => (PhaseName::Removing, Some(resume), pending),
            Phase::GameOver(_) => (PhaseName::GameOver, None, 0),
        };

        SessionRecord {
            id: self.id.clone(),
            initiator_id: self.initiator.clone(),
            opponent_id: self.opponent.clone(),
            players: PlayersRecord {
                red: self.players.red.clone(),
                blue: self.players.blue.clone(),
            },
            status: self.status,
            game_type: self.game_type,
            rules: (*self.rules).clone(),
            phase,
            resume_phase,
            pending_removals,
            current_turn: self.current_turn,
            board: BoardRecord {
                pieces: self
                    .board
                    .pieces()
                    .into_iter()
                    .filter_map(|piece| {
                        piece.position().map(|position| PieceRecord {
                            id: piece.id().clone(),
                            side: *piece.side(),
                            position,
                        })
                    })
                    .collect(),
            },
            placed_pieces_red: self.placed.red,
            placed_pieces_blue: self.placed.blue,
            ready_players: ReadyRecord {
                red: self.ready.red,
                blue: self.ready.blue,
            },
            winner: self.winner(),
            is_draw: self.is_draw(),
            quiet_moves: self.quiet_moves,
            moves: self
                .moves
                .iter()
                .map(|m| MoveEntry {
                    player_id: self.players.of(*m.side()).clone(),
                    encoded_move: m.payload().to_string(),
                    timestamp: *m.timestamp(),
                })
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Rebuilds a snapshot from its persisted form.
    ///
    /// The move log is replayed from the empty board and must reproduce
    /// the stored board, counters and phase.
    ///
    /// # Errors
    ///
    /// [`RecordError`] if the record is completed without a winner or draw,
    /// names an unknown player, holds an undecodable or illegal move, or
    /// disagrees with its own move log.
    #[instrument(skip(record), fields(session_id = %record.id))]
    pub fn from_record(record: &SessionRecord) -> Result<Session, RecordError> {
        let fail = |message: String| {
            warn!(%message, "Rejecting session record");
            RecordError::new(&record.id, message)
        };

        if record.status == SessionStatus::Completed && record.winner.is_none() && !record.is_draw {
            return Err(fail(MoveError::InconsistentCompletion.to_string()));
        }
        if record.players.red != record.initiator_id || record.players.blue != record.opponent_id {
            return Err(fail("players do not match initiator and opponent".to_string()));
        }
        record
            .rules
            .validate()
            .map_err(|e| fail(e.message.clone()))?;

        let mut log = Vec::with_capacity(record.moves.len());
        for entry in &record.moves {
            let side = if entry.player_id == record.players.red {
                Side::Red
            } else if entry.player_id == record.players.blue {
                Side::Blue
            } else {
                return Err(fail(format!("unknown player '{}' in move log", entry.player_id)));
            };
            let payload: MovePayload = entry
                .encoded_move
                .parse()
                .map_err(|e| fail(format!("bad move '{}': {}", entry.encoded_move, e)))?;
            log.push(MoveRecord::new(side, payload, entry.timestamp));
        }

        let rules = Arc::new(record.rules.clone());
        let mut session = if log.is_empty() {
            Session::new_at(
                record.id.clone(),
                record.initiator_id.clone(),
                record.opponent_id.clone(),
                record.game_type,
                rules,
                record.created_at,
            )
        } else {
            Session::replay(
                record.id.clone(),
                record.initiator_id.clone(),
                record.opponent_id.clone(),
                record.game_type,
                rules,
                record.created_at,
                &log,
            )
            .map_err(|e| fail(format!("move log does not replay: {}", e)))?
        };

        if session.to_record().board != record.board {
            return Err(fail("stored board differs from replayed move log".to_string()));
        }
        if session.placed.red != record.placed_pieces_red
            || session.placed.blue != record.placed_pieces_blue
        {
            return Err(fail("placed counters differ from replayed move log".to_string()));
        }

        let replayed_phase = session.phase;
        let replayed_turn = session.current_turn;

        // Readiness, resignation, decline and agreed results are not moves.
        session.ready.red = record.ready_players.red;
        session.ready.blue = record.ready_players.blue;
        session.status = record.status;
        session.current_turn = record.current_turn;
        session.phase = match record.phase {
            PhaseName::Placing => Phase::Placing,
            PhaseName::Moving => Phase::Moving,
            PhaseName::Removing => Phase::Removing {
                resume: record
                    .resume_phase
                    .ok_or_else(|| fail("removing phase without resume phase".to_string()))?,
                pending: record.pending_removals,
            },
            PhaseName::GameOver => match (record.winner, record.is_draw) {
                (Some(side), false) => Phase::GameOver(Outcome::Winner(side)),
                (None, true) => Phase::GameOver(Outcome::Draw),
                _ => return Err(fail(MoveError::InconsistentCompletion.to_string())),
            },
        };
        session.updated_at = record.updated_at;

        // An empty log replays to a pending session, so only the phase is comparable.
        let replayed_turn_known = !session.moves.is_empty();
        let consistent = match (session.phase, replayed_phase) {
            (Phase::GameOver(stored), Phase::GameOver(replayed)) => stored == replayed,
            (Phase::GameOver(_), _) => true,
            (stored, replayed) => {
                stored == replayed
                    && (!replayed_turn_known || session.current_turn == replayed_turn)
            }
        };
        if !consistent {
            return Err(fail("stored phase differs from replayed move log".to_string()));
        }
        if record.quiet_moves != session.quiet_moves {
            return Err(fail(format!(
                "quiet-move counter {} differs from replayed move log ({})",
                record.quiet_moves, session.quiet_moves
            )));
        }

        SessionInvariants::check_all(&session).map_err(|violations| {
            let descriptions: Vec<_> = violations.iter().map(|v| v.description.clone()).collect();
            fail(descriptions.join("; "))
        })?;

        debug!(phase = %session.phase, moves = session.moves.len(), "Session restored");
        Ok(session)
    }
}
