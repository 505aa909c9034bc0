//! Session lifecycle and in-game phase types.

use super::{MoveClass, Side};
use serde::{Deserialize, Serialize};

/// Lifecycle of a session as a whole, independent of the in-game phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    /// Waiting for both players to be ready.
    Pending,
    /// Play is under way.
    Active,
    /// Ended with a winner or a draw.
    Completed,
    /// Refused before play began.
    Declined,
}

impl SessionStatus {
    /// Returns true once the session accepts no further transitions.
    pub fn is_retired(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Declined)
    }
}

/// Stake attached to a session. Opaque to the engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum GameType {
    /// Played for stakes.
    Staked,
    /// Played for fun.
    Friendly,
}

/// Phase a removal returns to once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResumePhase {
    /// Back to placing.
    Placing,
    /// Back to moving.
    Moving,
}

impl From<ResumePhase> for Phase {
    fn from(resume: ResumePhase) -> Self {
        match resume {
            ResumePhase::Placing => Phase::Placing,
            ResumePhase::Moving => Phase::Moving,
        }
    }
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// A side won.
    Winner(Side),
    /// Nobody won.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Winner(side) => Some(*side),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(side) => write!(f, "{} wins", side),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// In-game phase: which class of move is legal right now.
///
/// Phase-specific data lives on the variant, so a finished game always
/// carries its outcome and a pending capture always knows where to resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Pieces are being put on the board.
    Placing,
    /// Pieces slide along move edges.
    Moving,
    /// The side that formed a line owes removals.
    Removing {
        /// Phase to return to once all removals are made.
        resume: ResumePhase,
        /// Removals still owed (at least one).
        pending: u8,
    },
    /// Terminal.
    GameOver(Outcome),
}

impl Phase {
    /// Returns the class of move accepted in this phase.
    pub fn accepts(&self) -> Option<MoveClass> {
        match self {
            Phase::Placing => Some(MoveClass::Place),
            Phase::Moving => Some(MoveClass::Relocate),
            Phase::Removing { .. } => Some(MoveClass::Remove),
            Phase::GameOver(_) => None,
        }
    }

    /// Returns the outcome, if the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Phase::GameOver(outcome) => Some(*outcome),
            _ => None,
        }
    }

    /// Returns true for the terminal phase.
    pub fn is_game_over(&self) -> bool {
        matches!(self, Phase::GameOver(_))
    }

    /// Returns the bare phase name used in records.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Placing => "placing",
            Phase::Moving => "moving",
            Phase::Removing { .. } => "removing",
            Phase::GameOver(_) => "gameOver",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Removing { pending, .. } => write!(f, "removing ({} owed)", pending),
            Phase::GameOver(outcome) => write!(f, "gameOver ({})", outcome),
            other => f.write_str(other.name()),
        }
    }
}
