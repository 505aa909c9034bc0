//! Core domain types for mill-forming games.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two competing sides.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// Red side (moves first under the default rules).
    Red,
    /// Blue side.
    Blue,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }
}

/// A vertex on the grid, addressed by integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Creates a new position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("Expected 'x,y', got '{}'", s))?;
        let x = x
            .trim()
            .parse()
            .map_err(|e| format!("Invalid x coordinate '{}': {}", x, e))?;
        let y = y
            .trim()
            .parse()
            .map_err(|e| format!("Invalid y coordinate '{}': {}", y, e))?;
        Ok(Self { x, y })
    }
}

/// Identifier of a piece, unique within a session (e.g. `red-3`).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    /// Builds the id of the `ordinal`-th piece placed by `side` (1-based).
    pub fn nth(side: Side, ordinal: u8) -> Self {
        Self(format!("{}-{}", side, ordinal))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PieceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A game piece.
///
/// A removed piece keeps its identity but has no position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Piece {
    /// Piece id.
    id: PieceId,
    /// Owning side.
    side: Side,
    /// Current position, `None` once removed from the board.
    position: Option<Position>,
}

impl Piece {
    /// Creates a piece that is not yet on the board.
    #[instrument]
    pub fn new(id: PieceId, side: Side) -> Self {
        Self {
            id,
            side,
            position: None,
        }
    }

    /// Returns this piece standing on `position`.
    pub(crate) fn at(self, position: Position) -> Self {
        Self {
            position: Some(position),
            ..self
        }
    }

    /// Returns this piece marked off-board.
    pub(crate) fn off_board(self) -> Self {
        Self {
            position: None,
            ..self
        }
    }
}

/// A pair of per-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSide<T> {
    /// Red side's value.
    pub red: T,
    /// Blue side's value.
    pub blue: T,
}

impl<T> PerSide<T> {
    /// Creates a pair from both values.
    pub fn new(red: T, blue: T) -> Self {
        Self { red, blue }
    }

    /// Returns a reference to the value for `side`.
    pub fn of(&self, side: Side) -> &T {
        match side {
            Side::Red => &self.red,
            Side::Blue => &self.blue,
        }
    }

    /// Returns a mutable reference to the value for `side`.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Red => &mut self.red,
            Side::Blue => &mut self.blue,
        }
    }
}

impl<T: Copy> PerSide<T> {
    /// Returns the value for `side`.
    pub fn get(&self, side: Side) -> T {
        *self.of(side)
    }
}
