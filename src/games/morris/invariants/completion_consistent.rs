//! Completion invariant: a completed session always has a result.

use super::super::{Session, SessionStatus};
use super::Invariant;

/// Invariant: `status == completed` exactly when the game is over.
///
/// The outcome lives on the `gameOver` phase, so a completed session
/// always has a winner or a draw.
pub struct CompletionConsistentInvariant;

impl Invariant<Session> for CompletionConsistentInvariant {
    fn holds(session: &Session) -> bool {
        (session.status() == SessionStatus::Completed) == session.phase().is_game_over()
    }

    fn description() -> &'static str {
        "Completed sessions, and only those, carry a winner or a draw"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;
    use crate::games::morris::{GameType, Outcome, Phase, Side};
    use std::sync::Arc;

    #[test]
    fn test_resigned_session_is_consistent() {
        let session = Session::new(
            "c".into(),
            "a".into(),
            "b".into(),
            GameType::Staked,
            Arc::new(RuleSet::nine_mens_morris()),
        )
        .mark_ready(Side::Red)
        .unwrap()
        .mark_ready(Side::Blue)
        .unwrap()
        .resign(Side::Blue)
        .unwrap();

        assert!(CompletionConsistentInvariant::holds(&session));

        let mut corrupted = session.clone();
        corrupted.phase = Phase::Moving;
        assert!(!CompletionConsistentInvariant::holds(&corrupted));

        let mut corrupted = session;
        corrupted.status = SessionStatus::Active;
        corrupted.phase = Phase::GameOver(Outcome::Draw);
        assert!(!CompletionConsistentInvariant::holds(&corrupted));
    }
}
