//! Placement counter invariant: `0 <= placed <= pieces_per_side`, matching the log.

use super::super::{MoveClass, Session, Side};
use super::Invariant;

/// Invariant: each side's placed counter is bounded and equals its placements in the move log.
///
/// Removals never decrease the counter.
pub struct PlacedCountBoundedInvariant;

impl Invariant<Session> for PlacedCountBoundedInvariant {
    fn holds(session: &Session) -> bool {
        let limit = *session.rules().pieces_per_side();
        [Side::Red, Side::Blue].into_iter().all(|side| {
            let placed = session.placed().get(side);
            let logged = session
                .moves()
                .iter()
                .filter(|m| *m.side() == side && m.payload().class() == MoveClass::Place)
                .count();
            placed <= limit && usize::from(placed) == logged
        })
    }

    fn description() -> &'static str {
        "Placed counts stay within pieces_per_side and match placements in the log"
    }
}
