//! Storage boundary for session records.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument};

use crate::db::{DbError, ParticipantRole};
use crate::games::morris::{SessionRecord, SessionStatus};

/// Durable home of session records.
///
/// The engine never iterates all sessions; participant lookups go through
/// the store's index.
pub trait SessionStore: Send + Sync {
    /// Writes the record, replacing any previous version.
    fn save(&self, record: &SessionRecord) -> Result<(), DbError>;

    /// Reads a record by session id.
    fn load(&self, id: &str) -> Result<Option<SessionRecord>, DbError>;

    /// Lists records where `participant` holds `role` and the status matches.
    fn find_by_participant(
        &self,
        participant: &str,
        role: ParticipantRole,
        status: SessionStatus,
    ) -> Result<Vec<SessionRecord>, DbError>;
}

/// In-process store, for tests and single-node deployments without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    #[instrument(skip(self, record), fields(session_id = %record.id))]
    fn save(&self, record: &SessionRecord) -> Result<(), DbError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.insert(record.id.clone(), record.clone());
        debug!("Record stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load(&self, id: &str) -> Result<Option<SessionRecord>, DbError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(id).cloned())
    }

    #[instrument(skip(self))]
    fn find_by_participant(
        &self,
        participant: &str,
        role: ParticipantRole,
        status: SessionStatus,
    ) -> Result<Vec<SessionRecord>, DbError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<_> = records
            .values()
            .filter(|r| r.status == status)
            .filter(|r| match role {
                ParticipantRole::Initiator => r.initiator_id == participant,
                ParticipantRole::Opponent => r.opponent_id == participant,
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }
}
