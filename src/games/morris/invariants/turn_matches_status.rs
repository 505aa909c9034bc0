//! Turn/phase consistency invariant.

use super::super::{Phase, Session, SessionStatus};
use super::Invariant;

/// Invariant: `current_turn` and `phase` agree with the session status.
///
/// - Only an active session has a side to move.
/// - A pending or declined session has no moves in its log.
/// - An active session is never in `gameOver`.
/// - A removal phase always owes at least one removal.
pub struct TurnMatchesStatusInvariant;

impl Invariant<Session> for TurnMatchesStatusInvariant {
    fn holds(session: &Session) -> bool {
        let turn_ok = match session.status() {
            SessionStatus::Active => {
                session.current_turn().is_some() && !session.phase().is_game_over()
            }
            SessionStatus::Pending | SessionStatus::Declined => {
                session.current_turn().is_none() && session.moves().is_empty()
            }
            SessionStatus::Completed => session.current_turn().is_none(),
        };

        let removal_ok = match session.phase() {
            Phase::Removing { pending, .. } => pending >= 1,
            _ => true,
        };

        turn_ok && removal_ok
    }

    fn description() -> &'static str {
        "Only active sessions have a turn; removing phases owe at least one removal"
    }
}
