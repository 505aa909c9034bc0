//! Board consistency invariant.

use super::super::{Session, Side};
use super::Invariant;

/// Invariant: the board agrees with the placement counters.
///
/// For each side, pieces on the board plus pieces removed equals pieces
/// placed. Every piece stands on a grid vertex and records that vertex as
/// its own position.
pub struct BoardMatchesCountsInvariant;

impl Invariant<Session> for BoardMatchesCountsInvariant {
    fn holds(session: &Session) -> bool {
        let board = session.board();

        let counts_match = [Side::Red, Side::Blue].into_iter().all(|side| {
            board.count(side) + board.removed_count(side)
                == usize::from(session.placed().get(side))
        });

        let positions_match = board.entries().all(|(position, piece)| {
            board.grid().contains(*position) && *piece.position() == Some(*position)
        });

        counts_match && positions_match
    }

    fn description() -> &'static str {
        "On-board plus removed pieces equal placed pieces; pieces sit on grid vertices"
    }
}
