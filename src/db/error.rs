//! Storage error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Which stage of a storage call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DbErrorKind {
    /// Opening the database.
    Connection,
    /// Applying schema migrations.
    Migration,
    /// Running a query or write.
    Query,
    /// Encoding or decoding a session document.
    Document,
    /// The store refused or could not perform the write.
    Unavailable,
}

/// Storage error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Storage {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failing stage.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates an [`DbErrorKind::Unavailable`] error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::of_kind(DbErrorKind::Unavailable, message)
    }

    /// Creates an error of the given kind with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn of_kind(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::of_kind(DbErrorKind::Query, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::of_kind(DbErrorKind::Connection, err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::of_kind(DbErrorKind::Document, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_callers() {
        let err = DbError::new("disk full");
        assert_eq!(err.kind, DbErrorKind::Unavailable);
        assert!(err.file.ends_with("error.rs"));
        assert!(err.to_string().starts_with("Storage unavailable error: disk full"));
    }

    #[test]
    fn test_document_errors_classified() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        assert_eq!(DbError::from(json_err).kind, DbErrorKind::Document);
    }
}
