//! Capture accounting: which lines a move formed and which pieces may be taken.

use super::super::{Board, Line, MoveError, Position, Side};
use tracing::instrument;

/// Returns the capturing lines of `side` passing through `to`.
///
/// `to` was empty before the move landed there, so each of these lines is
/// newly formed by that move.
#[instrument(skip(board))]
pub fn newly_formed_lines(board: &Board, side: Side, to: Position) -> Vec<&Line> {
    board
        .find_capturing_lines(side)
        .into_iter()
        .filter(|line| line.contains(to))
        .collect()
}

/// Returns the vertices of `victim`'s pieces that may be removed.
///
/// Pieces inside an intact line of their owner are exempt unless every
/// piece of that side is in one.
#[instrument(skip(board))]
pub fn removable_positions(board: &Board, victim: Side) -> Vec<Position> {
    let all = board.positions_of(victim);
    let exposed: Vec<_> = all
        .iter()
        .copied()
        .filter(|p| !board.in_capturing_line(*p))
        .collect();

    if exposed.is_empty() { all } else { exposed }
}

/// Number of removals the acting side earns for a move landing on `to`.
///
/// Bounded by the per-move policy and by how many opposing pieces exist.
#[instrument(skip(board))]
pub fn removals_owed(board: &Board, side: Side, to: Position, per_move_limit: u8) -> u8 {
    let formed = newly_formed_lines(board, side, to).len();
    let available = board.count(side.opponent());
    let owed = formed.min(usize::from(per_move_limit)).min(available);
    u8::try_from(owed).unwrap_or(per_move_limit)
}

/// Checks that `remover` may take the piece on `at`.
///
/// # Errors
///
/// [`MoveError::OutOfBounds`], [`MoveError::EmptyPosition`],
/// [`MoveError::OwnPiece`] or [`MoveError::ProtectedPiece`].
#[instrument(skip(board))]
pub fn check_removable(board: &Board, remover: Side, at: Position) -> Result<(), MoveError> {
    if !board.grid().contains(at) {
        return Err(MoveError::OutOfBounds(at));
    }
    let piece = board.occupant(at).ok_or(MoveError::EmptyPosition(at))?;
    if *piece.side() == remover {
        return Err(MoveError::OwnPiece(at));
    }
    if !removable_positions(board, remover.opponent()).contains(&at) {
        return Err(MoveError::ProtectedPiece(at));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::morris::{GridKind, Piece, PieceId};
    use std::sync::Arc;

    fn setup(red: &[(i32, i32)], blue: &[(i32, i32)]) -> Board {
        let mut board = Board::new(Arc::new(GridKind::NineMensMorris.build()));
        for (n, &(x, y)) in red.iter().enumerate() {
            let piece = Piece::new(PieceId::nth(Side::Red, n as u8 + 1), Side::Red);
            board = board.place(piece, Position::new(x, y)).unwrap();
        }
        for (n, &(x, y)) in blue.iter().enumerate() {
            let piece = Piece::new(PieceId::nth(Side::Blue, n as u8 + 1), Side::Blue);
            board = board.place(piece, Position::new(x, y)).unwrap();
        }
        board
    }

    #[test]
    fn test_double_mill_is_capped_by_policy() {
        // (0,0) completes both the top row and the left column
        let board = setup(&[(0, 0), (3, 0), (6, 0), (0, 3), (0, 6)], &[(1, 1), (5, 5)]);
        let to = Position::new(0, 0);
        assert_eq!(newly_formed_lines(&board, Side::Red, to).len(), 2);
        assert_eq!(removals_owed(&board, Side::Red, to, 1), 1);
        assert_eq!(removals_owed(&board, Side::Red, to, 2), 2);
    }

    #[test]
    fn test_removals_bounded_by_available_pieces() {
        let board = setup(&[(0, 0), (3, 0), (6, 0)], &[]);
        assert_eq!(removals_owed(&board, Side::Red, Position::new(6, 0), 1), 0);
    }

    #[test]
    fn test_protected_piece_rejected() {
        let board = setup(&[(1, 1)], &[(0, 0), (3, 0), (6, 0), (5, 5)]);
        assert_eq!(
            check_removable(&board, Side::Red, Position::new(3, 0)),
            Err(MoveError::ProtectedPiece(Position::new(3, 0)))
        );
        assert!(check_removable(&board, Side::Red, Position::new(5, 5)).is_ok());
        assert_eq!(
            check_removable(&board, Side::Red, Position::new(1, 1)),
            Err(MoveError::OwnPiece(Position::new(1, 1)))
        );
        assert_eq!(
            check_removable(&board, Side::Red, Position::new(1, 3)),
            Err(MoveError::EmptyPosition(Position::new(1, 3)))
        );
    }

    #[test]
    fn test_protection_lifts_when_all_pieces_in_lines() {
        let board = setup(&[(1, 1)], &[(0, 0), (3, 0), (6, 0)]);
        assert_eq!(removable_positions(&board, Side::Blue).len(), 3);
        assert!(check_removable(&board, Side::Red, Position::new(3, 0)).is_ok());
    }
}
