//! Board model: pieces on grid vertices.
//!
//! Every mutating operation returns a new [`Board`] and leaves the
//! receiver untouched, so callers can validate against one value and
//! publish another without ever observing a half-applied move.

use super::{Grid, Line, MoveError, Piece, Position, Side};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Pieces on a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: Arc<Grid>,
    occupied: HashMap<Position, Piece>,
    removed: Vec<Piece>,
}

impl Board {
    /// Creates an empty board on `grid`.
    #[instrument(skip(grid), fields(grid = %grid.kind()))]
    pub fn new(grid: Arc<Grid>) -> Self {
        Self {
            grid,
            occupied: HashMap::new(),
            removed: Vec::new(),
        }
    }

    /// Returns the grid geometry.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the piece standing on `position`, if any.
    pub fn occupant(&self, position: Position) -> Option<&Piece> {
        self.occupied.get(&position)
    }

    /// Returns true if no piece stands on `position`.
    pub fn is_empty_at(&self, position: Position) -> bool {
        !self.occupied.contains_key(&position)
    }

    /// Returns on-board pieces in grid vertex order.
    pub fn pieces(&self) -> Vec<&Piece> {
        self.grid
            .vertices()
            .filter_map(|v| self.occupied.get(&v))
            .collect()
    }

    /// Returns positions held by `side` in grid vertex order.
    pub fn positions_of(&self, side: Side) -> Vec<Position> {
        self.grid
            .vertices()
            .filter(|v| self.occupied.get(v).is_some_and(|p| *p.side() == side))
            .collect()
    }

    /// Returns how many pieces `side` has on the board.
    pub fn count(&self, side: Side) -> usize {
        self.occupied.values().filter(|p| *p.side() == side).count()
    }

    /// Returns pieces that have been removed, oldest first.
    pub fn removed(&self) -> &[Piece] {
        &self.removed
    }

    /// Returns how many of `side`'s pieces have been removed.
    pub fn removed_count(&self, side: Side) -> usize {
        self.removed.iter().filter(|p| *p.side() == side).count()
    }

    /// Iterates over `(position, piece)` pairs in arbitrary order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&Position, &Piece)> + '_ {
        self.occupied.iter()
    }

    fn check_bounds(&self, position: Position) -> Result<(), MoveError> {
        if self.grid.contains(position) {
            Ok(())
        } else {
            Err(MoveError::OutOfBounds(position))
        }
    }

    /// Puts `piece` on `position`.
    ///
    /// # Errors
    ///
    /// [`MoveError::OutOfBounds`] if `position` is not a vertex,
    /// [`MoveError::Occupied`] if it already holds a piece.
    #[instrument(skip(self, piece), fields(piece = %piece.id()))]
    pub fn place(&self, piece: Piece, position: Position) -> Result<Board, MoveError> {
        self.check_bounds(position)?;
        if !self.is_empty_at(position) {
            return Err(MoveError::Occupied(position));
        }

        let mut next = self.clone();
        next.occupied.insert(position, piece.at(position));
        debug!(%position, "Piece placed");
        Ok(next)
    }

    /// Moves `side`'s piece from `from` to `to`.
    ///
    /// With `flying` set the destination may be any empty vertex.
    ///
    /// # Errors
    ///
    /// [`MoveError::OutOfBounds`], [`MoveError::EmptyPosition`] if `from` is
    /// empty, [`MoveError::NotOwned`] if the piece belongs to the other side,
    /// [`MoveError::Occupied`] if `to` is taken, [`MoveError::NotAdjacent`]
    /// if no move edge joins the two vertices.
    #[instrument(skip(self))]
    pub fn relocate(
        &self,
        side: Side,
        from: Position,
        to: Position,
        flying: bool,
    ) -> Result<Board, MoveError> {
        self.check_bounds(from)?;
        self.check_bounds(to)?;

        let piece = self
            .occupant(from)
            .ok_or(MoveError::EmptyPosition(from))?;
        if *piece.side() != side {
            return Err(MoveError::NotOwned {
                position: from,
                side,
            });
        }
        if !self.is_empty_at(to) {
            return Err(MoveError::Occupied(to));
        }
        if !flying && !self.grid.is_adjacent(from, to) {
            return Err(MoveError::NotAdjacent { from, to });
        }

        let mut next = self.clone();
        if let Some(piece) = next.occupied.remove(&from) {
            next.occupied.insert(to, piece.at(to));
        }
        debug!(%from, %to, "Piece relocated");
        Ok(next)
    }

    /// Takes the piece on `position` off the board.
    ///
    /// # Errors
    ///
    /// [`MoveError::OutOfBounds`] or [`MoveError::EmptyPosition`].
    #[instrument(skip(self))]
    pub fn remove(&self, position: Position) -> Result<Board, MoveError> {
        self.check_bounds(position)?;

        let mut next = self.clone();
        let piece = next
            .occupied
            .remove(&position)
            .ok_or(MoveError::EmptyPosition(position))?;
        debug!(%position, piece = %piece.id(), "Piece removed");
        next.removed.push(piece.off_board());
        Ok(next)
    }

    /// Returns every line fully held by `side`, in grid line order.
    ///
    /// Depends only on the current placement of pieces.
    pub fn find_capturing_lines(&self, side: Side) -> Vec<&Line> {
        self.grid
            .lines()
            .iter()
            .filter(|line| {
                line.positions()
                    .iter()
                    .all(|p| self.occupied.get(p).is_some_and(|piece| *piece.side() == side))
            })
            .collect()
    }

    /// Returns true if the piece on `position` sits in a line fully held by its owner.
    pub fn in_capturing_line(&self, position: Position) -> bool {
        let Some(piece) = self.occupant(position) else {
            return false;
        };
        let side = *piece.side();
        self.grid.lines_through(position).any(|line| {
            line.positions()
                .iter()
                .all(|p| self.occupied.get(p).is_some_and(|other| *other.side() == side))
        })
    }

    /// Formats the board as a character grid (`R`, `B`, `+` for empty vertices).
    pub fn display(&self) -> String {
        let vertices: Vec<_> = self.grid.vertices().collect();
        let width = vertices.iter().map(|p| p.x).max().unwrap_or(0);
        let height = vertices.iter().map(|p| p.y).max().unwrap_or(0);

        let mut rows = Vec::new();
        for y in 0..=height {
            let mut row = String::new();
            for x in 0..=width {
                let position = Position::new(x, y);
                let symbol = match self.occupant(position) {
                    Some(piece) if *piece.side() == Side::Red => 'R',
                    Some(_) => 'B',
                    None if self.grid.contains(position) => '+',
                    None => ' ',
                };
                row.push(symbol);
                if x < width {
                    row.push(' ');
                }
            }
            rows.push(row.trim_end().to_string());
        }
        rows.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::morris::{GridKind, PieceId};

    fn board() -> Board {
        Board::new(Arc::new(GridKind::NineMensMorris.build()))
    }

    fn piece(side: Side, n: u8) -> Piece {
        Piece::new(PieceId::nth(side, n), side)
    }

    #[test]
    fn test_place_is_pure() {
        let empty = board();
        let next = empty.place(piece(Side::Red, 1), Position::new(0, 0)).unwrap();
        assert!(empty.occupant(Position::new(0, 0)).is_none());
        assert_eq!(
            next.occupant(Position::new(0, 0)).map(|p| *p.position()),
            Some(Some(Position::new(0, 0)))
        );
    }

    #[test]
    fn test_place_rejects_occupied_and_off_grid() {
        let b = board().place(piece(Side::Red, 1), Position::new(0, 0)).unwrap();
        assert_eq!(
            b.place(piece(Side::Blue, 1), Position::new(0, 0)),
            Err(MoveError::Occupied(Position::new(0, 0)))
        );
        assert_eq!(
            b.place(piece(Side::Blue, 1), Position::new(3, 3)),
            Err(MoveError::OutOfBounds(Position::new(3, 3)))
        );
    }

    #[test]
    fn test_relocate_checks() {
        let b = board()
            .place(piece(Side::Red, 1), Position::new(0, 0))
            .unwrap()
            .place(piece(Side::Blue, 1), Position::new(0, 3))
            .unwrap();

        assert_eq!(
            b.relocate(Side::Blue, Position::new(0, 0), Position::new(3, 0), false),
            Err(MoveError::NotOwned {
                position: Position::new(0, 0),
                side: Side::Blue
            })
        );
        assert_eq!(
            b.relocate(Side::Red, Position::new(0, 0), Position::new(0, 3), false),
            Err(MoveError::Occupied(Position::new(0, 3)))
        );
        assert_eq!(
            b.relocate(Side::Red, Position::new(0, 0), Position::new(6, 0), false),
            Err(MoveError::NotAdjacent {
                from: Position::new(0, 0),
                to: Position::new(6, 0)
            })
        );
        assert_eq!(
            b.relocate(Side::Red, Position::new(3, 0), Position::new(6, 0), false),
            Err(MoveError::EmptyPosition(Position::new(3, 0)))
        );

        let moved = b
            .relocate(Side::Red, Position::new(0, 0), Position::new(3, 0), false)
            .unwrap();
        assert!(moved.is_empty_at(Position::new(0, 0)));
        assert_eq!(moved.count(Side::Red), 1);

        let flown = b
            .relocate(Side::Red, Position::new(0, 0), Position::new(6, 6), true)
            .unwrap();
        assert!(!flown.is_empty_at(Position::new(6, 6)));
    }

    #[test]
    fn test_remove_keeps_identity() {
        let b = board().place(piece(Side::Blue, 1), Position::new(6, 6)).unwrap();
        assert_eq!(
            b.remove(Position::new(0, 0)),
            Err(MoveError::EmptyPosition(Position::new(0, 0)))
        );

        let after = b.remove(Position::new(6, 6)).unwrap();
        assert_eq!(after.count(Side::Blue), 0);
        assert_eq!(after.removed_count(Side::Blue), 1);
        assert_eq!(after.removed()[0].id().as_str(), "blue-1");
        assert_eq!(*after.removed()[0].position(), None);
    }

    #[test]
    fn test_capturing_lines_are_order_independent() {
        let spots = [Position::new(0, 0), Position::new(3, 0), Position::new(6, 0)];

        let mut forward = board();
        for (n, spot) in spots.iter().enumerate() {
            forward = forward.place(piece(Side::Red, n as u8 + 1), *spot).unwrap();
        }
        let mut backward = board();
        for (n, spot) in spots.iter().rev().enumerate() {
            backward = backward.place(piece(Side::Red, n as u8 + 1), *spot).unwrap();
        }

        assert_eq!(forward.find_capturing_lines(Side::Red).len(), 1);
        assert_eq!(
            forward.find_capturing_lines(Side::Red),
            backward.find_capturing_lines(Side::Red)
        );
        assert!(forward.find_capturing_lines(Side::Blue).is_empty());
        assert!(forward.in_capturing_line(Position::new(3, 0)));
    }

    #[test]
    fn test_display_three_mens() {
        let b = Board::new(Arc::new(GridKind::ThreeMensMorris.build()))
            .place(piece(Side::Red, 1), Position::new(0, 0))
            .unwrap()
            .place(piece(Side::Blue, 1), Position::new(1, 1))
            .unwrap();
        assert_eq!(b.display(), "R + +\n+ B +\n+ + +");
    }
}
