//! Relocation rules: stepping along move edges, and flying.

use super::super::{Board, Position, Side};
use tracing::instrument;

/// Returns true if `side` may move to any empty vertex.
pub fn can_fly(board: &Board, side: Side, flying_threshold: Option<u8>) -> bool {
    flying_threshold.is_some_and(|threshold| board.count(side) == usize::from(threshold))
}

/// Lists every `(from, to)` relocation available to `side`.
#[instrument(skip(board))]
pub fn legal_relocations(board: &Board, side: Side, flying: bool) -> Vec<(Position, Position)> {
    let grid = board.grid();
    let mut moves = Vec::new();

    for from in board.positions_of(side) {
        if flying {
            moves.extend(
                grid.vertices()
                    .filter(|to| board.is_empty_at(*to))
                    .map(|to| (from, to)),
            );
        } else {
            moves.extend(
                grid.neighbors(from)
                    .filter(|to| board.is_empty_at(*to))
                    .map(|to| (from, to)),
            );
        }
    }
    moves
}

/// Returns true if `side` has at least one relocation.
pub fn has_legal_relocation(board: &Board, side: Side, flying: bool) -> bool {
    !legal_relocations(board, side, flying).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::morris::{GridKind, Piece, PieceId};
    use std::sync::Arc;

    #[test]
    fn test_blocked_corner() {
        let board = Board::new(Arc::new(GridKind::NineMensMorris.build()))
            .place(Piece::new(PieceId::nth(Side::Red, 1), Side::Red), Position::new(0, 0))
            .unwrap()
            .place(Piece::new(PieceId::nth(Side::Blue, 1), Side::Blue), Position::new(3, 0))
            .unwrap()
            .place(Piece::new(PieceId::nth(Side::Blue, 2), Side::Blue), Position::new(0, 3))
            .unwrap();

        assert!(!has_legal_relocation(&board, Side::Red, false));
        assert!(has_legal_relocation(&board, Side::Red, true));
        assert_eq!(legal_relocations(&board, Side::Red, true).len(), 21);
    }

    #[test]
    fn test_flying_threshold() {
        let board = Board::new(Arc::new(GridKind::NineMensMorris.build()))
            .place(Piece::new(PieceId::nth(Side::Red, 1), Side::Red), Position::new(0, 0))
            .unwrap();
        assert!(can_fly(&board, Side::Red, Some(1)));
        assert!(!can_fly(&board, Side::Red, Some(3)));
        assert!(!can_fly(&board, Side::Red, None));
    }
}
