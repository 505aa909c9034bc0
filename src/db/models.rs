//! Database models.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbError, DbErrorKind, schema};
use crate::games::morris::SessionRecord;

/// Which participant column a lookup goes through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ParticipantRole {
    /// The participant who created the session.
    Initiator,
    /// The invited participant.
    Opponent,
}

/// Stored session row.
///
/// Index columns are copied out of the document so that lookups by
/// participant and status never decode JSON.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable, Getters)]
#[diesel(table_name = schema::sessions)]
pub struct SessionRow {
    id: String,
    initiator_id: String,
    opponent_id: String,
    status: String,
    game_type: String,
    document: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl SessionRow {
    /// Builds a row from a session record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the record cannot be encoded.
    #[instrument(skip(record), fields(session_id = %record.id))]
    pub fn from_record(record: &SessionRecord) -> Result<Self, DbError> {
        Ok(Self {
            id: record.id.clone(),
            initiator_id: record.initiator_id.clone(),
            opponent_id: record.opponent_id.clone(),
            status: record.status.to_string(),
            game_type: record.game_type.to_string(),
            document: serde_json::to_string(record)?,
            created_at: record.created_at.naive_utc(),
            updated_at: record.updated_at.naive_utc(),
        })
    }

    /// Decodes the stored session record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the document is not a valid record.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn to_record(&self) -> Result<SessionRecord, DbError> {
        let record: SessionRecord = serde_json::from_str(&self.document)?;
        if record.id != self.id {
            return Err(DbError::of_kind(
                DbErrorKind::Document,
                format!(
                    "Row '{}' holds document for session '{}'",
                    self.id, record.id
                ),
            ));
        }
        Ok(record)
    }
}
