//! Contract-based validation for session transitions.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} action {Q}

use super::invariants::{InvariantSet, SessionInvariants};
use super::{MovePayload, MoveError, Phase, Session, SessionStatus, Side};
use tracing::instrument;

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
///
/// - Precondition: {P(state, action)} - must hold before applying action
/// - Postcondition: {Q(before, after)} - must hold after applying action
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions (checked in this order)
// ─────────────────────────────────────────────────────────────

/// Precondition: the session is active and its phase accepts moves.
pub struct AcceptsMoves;

impl AcceptsMoves {
    /// Checks that the session can take any move at all.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn check(session: &Session) -> Result<(), MoveError> {
        match session.status() {
            SessionStatus::Active => {}
            status => {
                return Err(MoveError::InvalidPhase(format!(
                    "Session is {}, not active",
                    status
                )));
            }
        }
        if let Phase::GameOver(outcome) = session.phase() {
            return Err(MoveError::InvalidPhase(format!("Game is over ({})", outcome)));
        }
        Ok(())
    }
}

/// Precondition: it must be the acting side's turn.
pub struct SidesTurn;

impl SidesTurn {
    /// Checks the acting side against the current turn.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn check(side: Side, session: &Session) -> Result<(), MoveError> {
        if session.current_turn() == Some(side) {
            Ok(())
        } else {
            Err(MoveError::IllegalTurn(side))
        }
    }
}

/// Precondition: the payload is the class of move the phase expects.
pub struct PayloadMatchesPhase;

impl PayloadMatchesPhase {
    /// Checks the payload's move class against the phase.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn check(payload: &MovePayload, session: &Session) -> Result<(), MoveError> {
        let phase = session.phase();
        if phase.accepts() == Some(payload.class()) {
            Ok(())
        } else {
            Err(MoveError::InvalidPhase(format!(
                "Cannot {} while {}",
                payload.class(),
                phase
            )))
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Submit Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move submission.
///
/// Preconditions, in order:
/// - Session active and not over
/// - Acting side holds the turn
/// - Payload class matches the phase
///
/// Postconditions:
/// - All session invariants hold
pub struct SubmitContract;

impl Contract<Session, (Side, MovePayload)> for SubmitContract {
    fn pre(session: &Session, (side, payload): &(Side, MovePayload)) -> Result<(), MoveError> {
        AcceptsMoves::check(session)?;
        SidesTurn::check(*side, session)?;
        PayloadMatchesPhase::check(payload, session)?;
        Ok(())
    }

    fn post(_before: &Session, after: &Session) -> Result<(), MoveError> {
        SessionInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}
