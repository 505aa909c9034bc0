//! Terminal-state detection.

use super::super::{Outcome, Phase, Session, SessionStatus, Side};
use super::mobility::{can_fly, has_legal_relocation};
use tracing::{debug, instrument};

/// Pieces `side` still commands: on the board plus not yet placed.
pub fn pieces_remaining(session: &Session, side: Side) -> usize {
    let in_hand = session
        .rules()
        .pieces_per_side()
        .saturating_sub(session.placed().get(side));
    session.board().count(side) + usize::from(in_hand)
}

/// Determines whether the current snapshot ends the game.
///
/// Only an active session can end here. Falling below the minimum ends
/// the game in any phase, even with removals still owed; blocking and the
/// quiet-move draw apply only while moving.
#[instrument(skip(session), fields(session_id = %session.id()))]
pub fn detect_outcome(session: &Session) -> Option<Outcome> {
    if session.status() != SessionStatus::Active {
        return None;
    }
    let phase = session.phase();
    if phase.is_game_over() {
        return None;
    }

    let min_pieces = usize::from(*session.rules().min_pieces());
    for side in [Side::Red, Side::Blue] {
        let remaining = pieces_remaining(session, side);
        if remaining < min_pieces {
            debug!(%side, remaining, min_pieces, "Side fell below minimum viable pieces");
            return Some(Outcome::Winner(side.opponent()));
        }
    }

    if phase == Phase::Moving {
        if let Some(to_move) = session.current_turn() {
            let flying = can_fly(session.board(), to_move, *session.rules().flying_threshold());
            if !has_legal_relocation(session.board(), to_move, flying) {
                debug!(side = %to_move, "Side to move is blocked");
                return Some(Outcome::Winner(to_move.opponent()));
            }
        }

        let limit = *session.rules().draw_after_quiet_moves();
        if limit > 0 && session.quiet_moves() >= limit {
            debug!(quiet_moves = session.quiet_moves(), limit, "Quiet-move limit reached");
            return Some(Outcome::Draw);
        }
    }

    None
}
