//! Rule set configuration.

use crate::games::morris::{GridKind, Side};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Tunable rules of a mill-forming game.
///
/// Every field has a default, so a TOML file only needs the values it
/// changes from nine men's morris.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct RuleSet {
    /// Grid topology.
    #[serde(default)]
    grid: GridKind,

    /// Pieces each side places before moving starts.
    #[serde(default = "default_pieces_per_side")]
    pieces_per_side: u8,

    /// A side left with fewer pieces (on board plus in hand) loses.
    #[serde(default = "default_min_pieces")]
    min_pieces: u8,

    /// Upper bound on removals granted by one move, however many lines it forms.
    #[serde(default = "default_removals_per_capturing_move")]
    removals_per_capturing_move: u8,

    /// Side that moves first once the session is active.
    #[serde(default = "default_first_side")]
    first_side: Side,

    /// When a side is down to exactly this many pieces it may fly.
    #[serde(default)]
    flying_threshold: Option<u8>,

    /// Consecutive relocations without a removal that end the game in a draw (0 disables).
    #[serde(default = "default_draw_after_quiet_moves")]
    draw_after_quiet_moves: u32,
}

fn default_pieces_per_side() -> u8 {
    9
}

fn default_min_pieces() -> u8 {
    3
}

fn default_removals_per_capturing_move() -> u8 {
    1
}

fn default_first_side() -> Side {
    Side::Red
}

fn default_draw_after_quiet_moves() -> u32 {
    50
}

impl RuleSet {
    /// Standard nine men's morris.
    #[instrument]
    pub fn nine_mens_morris() -> Self {
        Self {
            grid: GridKind::NineMensMorris,
            pieces_per_side: default_pieces_per_side(),
            min_pieces: default_min_pieces(),
            removals_per_capturing_move: default_removals_per_capturing_move(),
            first_side: default_first_side(),
            flying_threshold: None,
            draw_after_quiet_moves: default_draw_after_quiet_moves(),
        }
    }

    /// Three men's morris on a 3x3 grid with diagonals.
    ///
    /// Each side has three pieces, so the first removal decides the game.
    #[instrument]
    pub fn three_mens_morris() -> Self {
        Self {
            grid: GridKind::ThreeMensMorris,
            pieces_per_side: 3,
            ..Self::nine_mens_morris()
        }
    }

    /// Sets the removal policy for moves that form several lines at once.
    pub fn with_removals_per_capturing_move(mut self, removals: u8) -> Self {
        self.removals_per_capturing_move = removals;
        self
    }

    /// Enables flying at `threshold` pieces.
    pub fn with_flying_threshold(mut self, threshold: Option<u8>) -> Self {
        self.flying_threshold = threshold;
        self
    }

    /// Sets the quiet-move draw limit (0 disables).
    pub fn with_draw_after_quiet_moves(mut self, limit: u32) -> Self {
        self.draw_after_quiet_moves = limit;
        self
    }

    /// Sets the starting side.
    pub fn with_first_side(mut self, side: Side) -> Self {
        self.first_side = side;
        self
    }

    /// Sets the minimum viable piece count.
    pub fn with_min_pieces(mut self, min_pieces: u8) -> Self {
        self.min_pieces = min_pieces;
        self
    }

    /// Checks the values make a playable game.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vertices = self.grid.build().len();

        if self.pieces_per_side == 0 {
            return Err(ConfigError::new("pieces_per_side must be at least 1".to_string()));
        }
        if usize::from(self.pieces_per_side) * 2 > vertices {
            return Err(ConfigError::new(format!(
                "pieces_per_side {} does not fit on a {}-vertex {} grid",
                self.pieces_per_side, vertices, self.grid
            )));
        }
        if self.min_pieces > self.pieces_per_side {
            return Err(ConfigError::new(format!(
                "min_pieces {} exceeds pieces_per_side {}",
                self.min_pieces, self.pieces_per_side
            )));
        }
        if self.removals_per_capturing_move == 0 {
            return Err(ConfigError::new(
                "removals_per_capturing_move must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a rule set from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let rules: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse rules: {}", e)))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Loads a rule set from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading rules from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read rules file: {}", e)))?;

        let rules = Self::from_toml(&content)?;
        info!(grid = %rules.grid, pieces = rules.pieces_per_side, "Rules loaded successfully");
        Ok(rules)
    }

    /// Renders the rule set as TOML.
    #[instrument(skip(self))]
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render rules: {}", e)))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::nine_mens_morris()
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
