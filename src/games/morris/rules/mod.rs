//! Game rules for mill-forming games.
//!
//! Pure functions over boards and snapshots, kept apart from the board
//! storage and the session engine so they can be composed into contracts.

pub mod capture;
pub mod mobility;
pub mod terminal;

pub use capture::{check_removable, newly_formed_lines, removable_positions, removals_owed};
pub use mobility::{can_fly, has_legal_relocation, legal_relocations};
pub use terminal::{detect_outcome, pieces_remaining};
