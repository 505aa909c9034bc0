//! First-class move types for mill-forming games.
//!
//! Moves are domain events, not side effects. A payload carries the
//! player's intent and is validated against the session before anything
//! is applied; an accepted payload becomes an append-only [`MoveRecord`].

use super::{Position, Side};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The semantic payload of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MovePayload {
    /// Put a new piece on an empty vertex.
    Place {
        /// Target vertex.
        to: Position,
    },
    /// Slide an own piece along a move edge (or fly, when allowed).
    Relocate {
        /// Vertex the piece leaves.
        from: Position,
        /// Vertex the piece lands on.
        to: Position,
    },
    /// Take an opposing piece off the board.
    Remove {
        /// Vertex of the piece being removed.
        at: Position,
    },
}

impl MovePayload {
    /// Returns the class of move this payload belongs to.
    pub fn class(&self) -> MoveClass {
        match self {
            MovePayload::Place { .. } => MoveClass::Place,
            MovePayload::Relocate { .. } => MoveClass::Relocate,
            MovePayload::Remove { .. } => MoveClass::Remove,
        }
    }
}

/// Encodes as `place x,y`, `move x,y x,y` or `remove x,y`.
impl std::fmt::Display for MovePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovePayload::Place { to } => write!(f, "place {}", to),
            MovePayload::Relocate { from, to } => write!(f, "move {} {}", from, to),
            MovePayload::Remove { at } => write!(f, "remove {}", at),
        }
    }
}

impl std::str::FromStr for MovePayload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts.next().ok_or_else(|| "Empty move".to_string())?;
        let mut next_position = || -> Result<Position, String> {
            parts
                .next()
                .ok_or_else(|| format!("Missing coordinate in '{}'", s))?
                .parse()
        };

        let payload = match verb {
            "place" => MovePayload::Place { to: next_position()? },
            "move" => {
                let from = next_position()?;
                let to = next_position()?;
                MovePayload::Relocate { from, to }
            }
            "remove" => MovePayload::Remove { at: next_position()? },
            other => return Err(format!("Unknown move kind '{}'", other)),
        };

        if parts.next().is_some() {
            return Err(format!("Trailing input in '{}'", s));
        }
        Ok(payload)
    }
}

/// Class of move, as gated by the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MoveClass {
    /// Placement.
    Place,
    /// Relocation.
    Relocate,
    /// Removal.
    Remove,
}

/// An accepted move in the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MoveRecord {
    /// Side that made the move.
    side: Side,
    /// What the move did.
    payload: MovePayload,
    /// When the move was accepted.
    timestamp: DateTime<Utc>,
}

impl MoveRecord {
    /// Creates a new move record.
    #[instrument]
    pub fn new(side: Side, payload: MovePayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            side,
            payload,
            timestamp,
        }
    }
}

impl std::fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.side, self.payload)
    }
}

/// Error that can occur when validating or applying a transition.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// Position is not a vertex of the grid.
    #[display("Position ({}) is off the board", _0)]
    OutOfBounds(Position),

    /// Position already holds a piece.
    #[display("Position ({}) is already occupied", _0)]
    Occupied(Position),

    /// Position holds no piece.
    #[display("Position ({}) is empty", _0)]
    EmptyPosition(Position),

    /// The two positions are not connected by a move edge.
    #[display("({}) is not adjacent to ({})", from, to)]
    NotAdjacent {
        /// Origin.
        from: Position,
        /// Destination.
        to: Position,
    },

    /// The piece being moved belongs to the other side.
    #[display("Piece at ({}) does not belong to {}", position, side)]
    NotOwned {
        /// Position of the piece.
        position: Position,
        /// Side that attempted the move.
        side: Side,
    },

    /// A side tried to remove one of its own pieces.
    #[display("Piece at ({}) is your own", _0)]
    OwnPiece(Position),

    /// The targeted piece sits in an intact capturing line.
    #[display("Piece at ({}) is protected by a mill", _0)]
    ProtectedPiece(Position),

    /// It is not this side's turn.
    #[display("It's not {}'s turn", _0)]
    IllegalTurn(Side),

    /// The session or phase does not accept this kind of operation.
    #[display("{}", _0)]
    InvalidPhase(String),

    /// The session has already left the pending state.
    #[display("Session is no longer pending")]
    AlreadyActive,

    /// Completion was requested without a winner or a draw.
    #[display("Cannot complete a session without a winner or a draw")]
    InconsistentCompletion,

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}

impl MoveError {
    /// Returns the kind of this error, for user-facing explanations.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MoveError::OutOfBounds(_) => ErrorKind::OutOfBounds,
            MoveError::Occupied(_) => ErrorKind::Occupied,
            MoveError::EmptyPosition(_) => ErrorKind::EmptyPosition,
            MoveError::NotAdjacent { .. } => ErrorKind::NotAdjacent,
            MoveError::NotOwned { .. } | MoveError::OwnPiece(_) => ErrorKind::NotOwned,
            MoveError::ProtectedPiece(_) => ErrorKind::Protected,
            MoveError::IllegalTurn(_) => ErrorKind::IllegalTurn,
            MoveError::InvalidPhase(_) => ErrorKind::InvalidPhase,
            MoveError::AlreadyActive => ErrorKind::AlreadyActive,
            MoveError::InconsistentCompletion => ErrorKind::InconsistentCompletion,
            MoveError::InvariantViolation(_) => ErrorKind::InvariantViolation,
        }
    }
}

/// Coarse classification of [`MoveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorKind {
    /// Off the board.
    #[strum(to_string = "illegal move: off the board")]
    OutOfBounds,
    /// Target occupied.
    #[strum(to_string = "illegal move: position taken")]
    Occupied,
    /// Nothing to act on.
    #[strum(to_string = "illegal move: no piece there")]
    EmptyPosition,
    /// Not a legal step.
    #[strum(to_string = "illegal move: not adjacent")]
    NotAdjacent,
    /// Wrong piece owner.
    #[strum(to_string = "illegal move: wrong piece")]
    NotOwned,
    /// Piece protected by a mill.
    #[strum(to_string = "illegal move: piece is protected")]
    Protected,
    /// Out of turn.
    #[strum(to_string = "not your turn")]
    IllegalTurn,
    /// Wrong move type for the phase.
    #[strum(to_string = "move not allowed now")]
    InvalidPhase,
    /// Already started.
    #[strum(to_string = "game already started")]
    AlreadyActive,
    /// Bad completion.
    #[strum(to_string = "game cannot end without a result")]
    InconsistentCompletion,
    /// Internal corruption.
    #[strum(to_string = "internal error")]
    InvariantViolation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_matches_parser() {
        let moves = [
            MovePayload::Place {
                to: Position::new(3, 0),
            },
            MovePayload::Relocate {
                from: Position::new(3, 0),
                to: Position::new(3, 1),
            },
            MovePayload::Remove {
                at: Position::new(6, 6),
            },
        ];
        for payload in moves {
            assert_eq!(payload.to_string().parse::<MovePayload>(), Ok(payload));
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("jump 1,1".parse::<MovePayload>().is_err());
        assert!("move 1,1".parse::<MovePayload>().is_err());
        assert!("place 1,1 2,2".parse::<MovePayload>().is_err());
        assert!("".parse::<MovePayload>().is_err());
    }

    #[test]
    fn test_error_kinds_distinguish_turn_from_phase() {
        assert_eq!(MoveError::IllegalTurn(Side::Red).kind().to_string(), "not your turn");
        assert_eq!(
            MoveError::InvalidPhase("placing".into()).kind(),
            ErrorKind::InvalidPhase
        );
    }
}
