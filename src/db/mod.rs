//! Persistence layer for session records.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use error::{DbError, DbErrorKind};
pub use models::{ParticipantRole, SessionRow};
pub use repository::GameRepository;
pub use store::{MemoryStore, SessionStore};
