//! Session engine: validated, all-or-nothing transitions between snapshots.
//!
//! Every operation borrows the current snapshot and either returns a new
//! one or a typed [`MoveError`]. The input snapshot is never modified, so
//! a rejected move leaves the caller holding exactly what it had.

use super::contracts::{Contract, SubmitContract};
use super::rules::{
    can_fly, check_removable, detect_outcome, legal_relocations, removable_positions,
    removals_owed,
};
use super::{
    GameType, MoveError, MovePayload, MoveRecord, Outcome, ParticipantId, Phase, Piece, PieceId,
    ResumePhase, Session, SessionId, SessionStatus, Side,
};
use crate::config::RuleSet;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

impl Session {
    /// Marks `side` ready; activates the session once both sides are.
    ///
    /// Marking an already-ready side again changes nothing.
    ///
    /// # Errors
    ///
    /// [`MoveError::AlreadyActive`] if the session is no longer pending.
    pub fn mark_ready(&self, side: Side) -> Result<Session, MoveError> {
        self.mark_ready_at(side, Utc::now())
    }

    /// [`Session::mark_ready`] with an explicit timestamp.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn mark_ready_at(&self, side: Side, at: DateTime<Utc>) -> Result<Session, MoveError> {
        if self.status != SessionStatus::Pending {
            warn!(status = %self.status, "Ready signal on a session that is not pending");
            return Err(MoveError::AlreadyActive);
        }
        if self.ready.get(side) {
            debug!("Side already ready");
            return Ok(self.clone());
        }

        let mut next = self.clone();
        *next.ready.get_mut(side) = true;
        next.updated_at = at;

        if next.ready.red && next.ready.blue {
            let first = *next.rules.first_side();
            next.status = SessionStatus::Active;
            next.current_turn = Some(first);
            info!(first_side = %first, "Session activated");
        } else {
            info!("Side marked ready, waiting for opponent");
        }
        Ok(next)
    }

    /// Validates and applies a move by `side`.
    ///
    /// # Errors
    ///
    /// [`MoveError::InvalidPhase`] if the session does not accept moves or
    /// the payload is the wrong class for the phase,
    /// [`MoveError::IllegalTurn`] if `side` does not hold the turn, and the
    /// board errors for geometry or ownership violations.
    pub fn submit_move(&self, side: Side, payload: MovePayload) -> Result<Session, MoveError> {
        self.submit_move_at(side, payload, Utc::now())
    }

    /// [`Session::submit_move`] with an explicit timestamp for the move record.
    #[instrument(skip(self), fields(session_id = %self.id, phase = %self.phase))]
    pub fn submit_move_at(
        &self,
        side: Side,
        payload: MovePayload,
        at: DateTime<Utc>,
    ) -> Result<Session, MoveError> {
        SubmitContract::pre(self, &(side, payload)).inspect_err(|e| {
            warn!(%side, %payload, error = %e, "Move rejected");
        })?;

        let next = self.apply(side, payload, at).inspect_err(|e| {
            warn!(%side, %payload, error = %e, "Illegal move");
        })?;

        #[cfg(debug_assertions)]
        SubmitContract::post(self, &next)?;

        info!(
            %side,
            %payload,
            phase = %next.phase,
            turn = ?next.current_turn,
            "Move accepted"
        );
        Ok(next)
    }

    fn apply(
        &self,
        side: Side,
        payload: MovePayload,
        at: DateTime<Utc>,
    ) -> Result<Session, MoveError> {
        let limit = *self.rules.removals_per_capturing_move();
        let mut next = self.clone();

        match payload {
            MovePayload::Place { to } => {
                let ordinal = self.placed.get(side) + 1;
                let piece = Piece::new(PieceId::nth(side, ordinal), side);
                next.board = self.board.place(piece, to)?;
                *next.placed.get_mut(side) = ordinal;

                let owed = removals_owed(&next.board, side, to, limit);
                next.settle_line_check(side, owed, ResumePhase::Placing);
            }
            MovePayload::Relocate { from, to } => {
                let flying = can_fly(&self.board, side, *self.rules.flying_threshold());
                next.board = self.board.relocate(side, from, to, flying)?;
                next.quiet_moves += 1;

                let owed = removals_owed(&next.board, side, to, limit);
                next.settle_line_check(side, owed, ResumePhase::Moving);
            }
            MovePayload::Remove { at: target } => {
                let Phase::Removing { resume, pending } = self.phase else {
                    return Err(MoveError::InvalidPhase(format!(
                        "Cannot remove while {}",
                        self.phase
                    )));
                };
                check_removable(&self.board, side, target)?;
                next.board = self.board.remove(target)?;
                next.quiet_moves = 0;

                let pending = pending - 1;
                if pending > 0 && !removable_positions(&next.board, side.opponent()).is_empty() {
                    next.phase = Phase::Removing { resume, pending };
                } else {
                    next.phase = next.resume_into(resume);
                    next.current_turn = Some(side.opponent());
                }
            }
        }

        next.moves.push(MoveRecord::new(side, payload, at));
        next.updated_at = at;
        Ok(next.evaluate_terminal())
    }

    /// Enters `removing` if removals are owed, otherwise passes the turn.
    fn settle_line_check(&mut self, side: Side, owed: u8, resume: ResumePhase) {
        if owed > 0 {
            info!(%side, owed, "Capturing line formed");
            self.phase = Phase::Removing {
                resume,
                pending: owed,
            };
        } else {
            self.phase = self.resume_into(resume);
            self.current_turn = Some(side.opponent());
        }
    }

    /// Phase to continue in; placing ends once both sides placed every piece.
    fn resume_into(&self, resume: ResumePhase) -> Phase {
        let per_side = *self.rules.pieces_per_side();
        match resume {
            ResumePhase::Placing if self.placed.red == per_side && self.placed.blue == per_side => {
                info!("All pieces placed, moving phase begins");
                Phase::Moving
            }
            other => other.into(),
        }
    }

    /// Ends the game if the snapshot is terminal; otherwise returns it as is.
    ///
    /// Idempotent: a snapshot that is already over, or not terminal, comes
    /// back unchanged.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn evaluate_terminal(&self) -> Session {
        match detect_outcome(self) {
            Some(outcome) => self.finish(outcome),
            None => self.clone(),
        }
    }

    fn finish(&self, outcome: Outcome) -> Session {
        let mut next = self.clone();
        next.phase = Phase::GameOver(outcome);
        next.status = SessionStatus::Completed;
        next.current_turn = None;
        info!(session_id = %self.id, %outcome, moves = self.moves.len(), "Game over");
        next
    }

    /// Completes an active session with an externally decided outcome.
    ///
    /// # Errors
    ///
    /// [`MoveError::InconsistentCompletion`] when `outcome` is `None`,
    /// [`MoveError::InvalidPhase`] if the session is not active.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn complete(&self, outcome: Option<Outcome>) -> Result<Session, MoveError> {
        let Some(outcome) = outcome else {
            warn!("Completion requested without winner or draw");
            return Err(MoveError::InconsistentCompletion);
        };
        if self.status != SessionStatus::Active {
            return Err(MoveError::InvalidPhase(format!(
                "Cannot complete a {} session",
                self.status
            )));
        }
        Ok(self.finish(outcome))
    }

    /// `side` concedes; the opponent wins.
    ///
    /// # Errors
    ///
    /// [`MoveError::InvalidPhase`] if the session is not active.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn resign(&self, side: Side) -> Result<Session, MoveError> {
        if self.status != SessionStatus::Active {
            return Err(MoveError::InvalidPhase(format!(
                "Cannot resign a {} session",
                self.status
            )));
        }
        info!(%side, "Side resigned");
        Ok(self.finish(Outcome::Winner(side.opponent())))
    }

    /// Refuses a pending session.
    ///
    /// # Errors
    ///
    /// [`MoveError::AlreadyActive`] if the session is no longer pending.
    pub fn decline(&self) -> Result<Session, MoveError> {
        self.decline_at(Utc::now())
    }

    /// [`Session::decline`] with an explicit timestamp.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn decline_at(&self, at: DateTime<Utc>) -> Result<Session, MoveError> {
        if self.status != SessionStatus::Pending {
            return Err(MoveError::AlreadyActive);
        }
        let mut next = self.clone();
        next.status = SessionStatus::Declined;
        next.updated_at = at;
        info!("Session declined");
        Ok(next)
    }

    /// Lists every payload the side to move may submit right now.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn legal_moves(&self) -> Vec<MovePayload> {
        let Some(side) = self.current_turn else {
            return Vec::new();
        };
        if self.status != SessionStatus::Active {
            return Vec::new();
        }

        match self.phase {
            Phase::Placing => self
                .board
                .grid()
                .vertices()
                .filter(|v| self.board.is_empty_at(*v))
                .map(|to| MovePayload::Place { to })
                .collect(),
            Phase::Moving => {
                let flying = can_fly(&self.board, side, *self.rules.flying_threshold());
                legal_relocations(&self.board, side, flying)
                    .into_iter()
                    .map(|(from, to)| MovePayload::Relocate { from, to })
                    .collect()
            }
            Phase::Removing { .. } => removable_positions(&self.board, side.opponent())
                .into_iter()
                .map(|at| MovePayload::Remove { at })
                .collect(),
            Phase::GameOver(_) => Vec::new(),
        }
    }

    /// Rebuilds a session by replaying its move log from the empty board.
    ///
    /// # Errors
    ///
    /// The first [`MoveError`] raised by a move in the log.
    #[instrument(skip(rules, moves), fields(moves = moves.len()))]
    pub fn replay(
        id: SessionId,
        initiator: ParticipantId,
        opponent: ParticipantId,
        game_type: GameType,
        rules: Arc<RuleSet>,
        created_at: DateTime<Utc>,
        moves: &[MoveRecord],
    ) -> Result<Session, MoveError> {
        let mut session = Session::new_at(id, initiator, opponent, game_type, rules, created_at)
            .mark_ready_at(Side::Red, created_at)?
            .mark_ready_at(Side::Blue, created_at)?;

        for record in moves {
            session =
                session.submit_move_at(*record.side(), *record.payload(), *record.timestamp())?;
        }
        debug!(phase = %session.phase, "Replay complete");
        Ok(session)
    }
}
