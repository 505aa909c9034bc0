//! Session management: one writer per session, lock-free snapshot reads.
//!
//! Every transition is computed on the engine's immutable snapshots, saved
//! through the [`SessionStore`], and only then published. A failed save
//! leaves the previous snapshot in place.

use crate::config::{ConfigError, RuleSet};
use crate::db::{DbError, ParticipantRole, SessionStore};
use crate::games::morris::{
    GameType, MoveError, MovePayload, ParticipantId, RecordError, Session, SessionId,
    SessionRecord, SessionStatus, Side,
};
use derive_more::{Display, From};
use derive_new::new;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// Errors raised by [`SessionManager`].
#[derive(Debug, Display, From)]
pub enum SessionError {
    /// No session with this id, in memory or in the store.
    #[display("Session '{}' not found", _0)]
    NotFound(SessionId),

    /// A session with this id already exists.
    #[display("Session '{}' already exists", _0)]
    AlreadyExists(SessionId),

    /// The participant plays neither side of the session.
    #[display("Participant '{}' is not part of session '{}'", participant, session_id)]
    UnknownParticipant {
        /// Session addressed.
        session_id: SessionId,
        /// Participant that is not in it.
        participant: ParticipantId,
    },

    /// Initiator and opponent are the same participant.
    #[display("Participant '{}' cannot open a session against themselves", _0)]
    SelfPlay(ParticipantId),

    /// The rule set is unusable.
    #[display("{}", _0)]
    #[from]
    InvalidRules(ConfigError),

    /// The engine rejected the transition.
    #[display("{}", _0)]
    #[from]
    Move(MoveError),

    /// A stored record could not be restored.
    #[display("{}", _0)]
    #[from]
    Record(RecordError),

    /// The store failed; the previous snapshot is still published.
    #[display("{}", _0)]
    #[from]
    Persistence(DbError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::InvalidRules(e) => Some(e),
            SessionError::Move(e) => Some(e),
            SessionError::Record(e) => Some(e),
            SessionError::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

/// Live state of one session.
#[derive(Debug, new)]
struct Slot {
    #[new(default)]
    writer: Mutex<()>,
    published: RwLock<Arc<Session>>,
}

impl Slot {
    fn current(&self) -> Arc<Session> {
        Arc::clone(&self.published.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, next: Arc<Session>) {
        *self.published.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// Owns live sessions and serializes their transitions.
///
/// Transitions on one session run one at a time; different sessions never
/// contend beyond the brief map lookup. Readers get an `Arc<Session>` that
/// is either the state before a move or after it, never in between.
#[derive(Debug)]
pub struct SessionManager<S: SessionStore> {
    store: Arc<S>,
    slots: RwLock<HashMap<SessionId, Arc<Slot>>>,
}

impl<S: SessionStore> SessionManager<S> {
    /// Creates a manager backed by `store`.
    #[instrument(skip(store))]
    pub fn new(store: Arc<S>) -> Self {
        info!("Creating session manager");
        Self {
            store,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates and persists a pending session.
    ///
    /// The initiator plays red and the opponent blue.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyExists`] if the id is taken,
    /// [`SessionError::SelfPlay`] if both participants are the same,
    /// [`SessionError::InvalidRules`] for an unusable rule set, and
    /// [`SessionError::Persistence`] if the initial save fails.
    #[instrument(skip(self, rules))]
    pub fn create_session(
        &self,
        id: SessionId,
        initiator: ParticipantId,
        opponent: ParticipantId,
        game_type: GameType,
        rules: Arc<RuleSet>,
    ) -> Result<Arc<Session>, SessionError> {
        if initiator == opponent {
            warn!(participant = %initiator, "Rejecting self-play session");
            return Err(SessionError::SelfPlay(initiator));
        }
        rules.validate()?;

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if slots.contains_key(&id) || self.store.load(&id)?.is_some() {
            warn!(session_id = %id, "Session already exists");
            return Err(SessionError::AlreadyExists(id));
        }

        let session = Session::new(id.clone(), initiator, opponent, game_type, rules);
        self.store.save(&session.to_record())?;

        let session = Arc::new(session);
        slots.insert(id.clone(), Arc::new(Slot::new(RwLock::new(Arc::clone(&session)))));
        info!(session_id = %id, "Created new session");
        Ok(session)
    }

    /// Returns the published snapshot, loading it from the store if needed.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] if the session exists nowhere, or the
    /// store and record errors from [`SessionManager::load`].
    #[instrument(skip(self))]
    pub fn snapshot(&self, id: &str) -> Result<Arc<Session>, SessionError> {
        Ok(self.slot(id)?.current())
    }

    /// Submits a move for the participant's side.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownParticipant`] if the participant is not
    /// seated, [`SessionError::Move`] if the engine rejects the move, and
    /// [`SessionError::Persistence`] if the save fails.
    #[instrument(skip(self, payload), fields(payload = %payload))]
    pub fn submit_move(
        &self,
        id: &str,
        participant: &str,
        payload: MovePayload,
    ) -> Result<Arc<Session>, SessionError> {
        self.transition(id, |session| {
            let side = seat(session, participant)?;
            Ok(session.submit_move(side, payload)?)
        })
    }

    /// Marks the participant ready.
    ///
    /// # Errors
    ///
    /// As for [`SessionManager::submit_move`].
    #[instrument(skip(self))]
    pub fn mark_ready(&self, id: &str, participant: &str) -> Result<Arc<Session>, SessionError> {
        self.transition(id, |session| {
            let side = seat(session, participant)?;
            Ok(session.mark_ready(side)?)
        })
    }

    /// Concedes the game on behalf of the participant.
    ///
    /// # Errors
    ///
    /// As for [`SessionManager::submit_move`].
    #[instrument(skip(self))]
    pub fn resign(&self, id: &str, participant: &str) -> Result<Arc<Session>, SessionError> {
        self.transition(id, |session| {
            let side = seat(session, participant)?;
            Ok(session.resign(side)?)
        })
    }

    /// Declines a pending session. Either participant may decline.
    ///
    /// # Errors
    ///
    /// As for [`SessionManager::submit_move`].
    #[instrument(skip(self))]
    pub fn decline(&self, id: &str, participant: &str) -> Result<Arc<Session>, SessionError> {
        self.transition(id, |session| {
            seat(session, participant)?;
            Ok(session.decline()?)
        })
    }

    /// Restores a session from the store and makes it live.
    ///
    /// A session already live is returned as published.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] if the store has no such record,
    /// [`SessionError::Record`] if the record does not replay, and
    /// [`SessionError::Persistence`] if the store fails.
    #[instrument(skip(self))]
    pub fn load(&self, id: &str) -> Result<Arc<Session>, SessionError> {
        self.slot(id).map(|slot| slot.current())
    }

    /// Drops a retired session from memory. The stored record stays.
    ///
    /// Returns `false`, keeping the session live, if it is still pending or
    /// active.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] if the session is not live.
    #[instrument(skip(self))]
    pub fn retire(&self, id: &str) -> Result<bool, SessionError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        let status = slot.current().status();
        if !status.is_retired() {
            debug!(%status, "Session still live, not retiring");
            return Ok(false);
        }
        slots.remove(id);
        info!(%status, "Session retired");
        Ok(true)
    }

    /// Lists stored sessions for a participant by role and status.
    ///
    /// # Errors
    ///
    /// [`SessionError::Persistence`] if the store fails.
    #[instrument(skip(self))]
    pub fn sessions_for(
        &self,
        participant: &str,
        role: ParticipantRole,
        status: SessionStatus,
    ) -> Result<Vec<SessionRecord>, SessionError> {
        Ok(self.store.find_by_participant(participant, role, status)?)
    }

    /// Number of sessions held in memory.
    pub fn live_count(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn slot(&self, id: &str) -> Result<Arc<Slot>, SessionError> {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            return Ok(Arc::clone(slot));
        }

        let record = self
            .store
            .load(id)?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        let session = Session::from_record(&record)?;
        debug!(session_id = id, "Session loaded from store");

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Slot::new(RwLock::new(Arc::new(session)))));
        Ok(Arc::clone(slot))
    }

    fn transition<F>(&self, id: &str, step: F) -> Result<Arc<Session>, SessionError>
    where
        F: FnOnce(&Session) -> Result<Session, SessionError>,
    {
        let slot = self.slot(id)?;
        let _writer = slot.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let current = slot.current();
        let next = step(&current)?;

        if let Err(e) = self.store.save(&next.to_record()) {
            warn!(session_id = id, error = %e, "Save failed, keeping previous snapshot");
            return Err(SessionError::Persistence(e));
        }

        let next = Arc::new(next);
        slot.publish(Arc::clone(&next));
        debug!(session_id = id, phase = %next.phase(), "Snapshot published");
        Ok(next)
    }
}

fn seat(session: &Session, participant: &str) -> Result<Side, SessionError> {
    session.side_of(participant).ok_or_else(|| {
        warn!(session_id = session.id(), participant, "Unknown participant");
        SessionError::UnknownParticipant {
            session_id: session.id().to_string(),
            participant: participant.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::games::morris::{Phase, Position};

    fn manager() -> SessionManager<MemoryStore> {
        SessionManager::new(Arc::new(MemoryStore::new()))
    }

    fn started(manager: &SessionManager<MemoryStore>) {
        manager
            .create_session(
                "s1".into(),
                "alice".into(),
                "bob".into(),
                GameType::Friendly,
                Arc::new(RuleSet::default()),
            )
            .unwrap();
        manager.mark_ready("s1", "alice").unwrap();
        manager.mark_ready("s1", "bob").unwrap();
    }

    #[test]
    fn test_create_persists_pending_session() {
        let manager = manager();
        started(&manager);
        let record = manager.store().load("s1").unwrap().unwrap();
        assert_eq!(record.status, SessionStatus::Active);
        assert_eq!(record.players.red, "alice");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let manager = manager();
        started(&manager);
        let err = manager
            .create_session(
                "s1".into(),
                "carol".into(),
                "dave".into(),
                GameType::Staked,
                Arc::new(RuleSet::default()),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::AlreadyExists(_)));
    }

    #[test]
    fn test_self_play_rejected() {
        let err = manager()
            .create_session(
                "s".into(),
                "alice".into(),
                "alice".into(),
                GameType::Friendly,
                Arc::new(RuleSet::default()),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::SelfPlay(_)));
    }

    #[test]
    fn test_unknown_participant_rejected() {
        let manager = manager();
        started(&manager);
        let err = manager
            .submit_move("s1", "mallory", MovePayload::Place { to: Position::new(0, 0) })
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownParticipant { .. }));
    }

    #[test]
    fn test_held_snapshot_survives_move() {
        let manager = manager();
        started(&manager);
        let before = manager.snapshot("s1").unwrap();
        let after = manager
            .submit_move("s1", "alice", MovePayload::Place { to: Position::new(0, 0) })
            .unwrap();

        assert!(before.board().is_empty_at(Position::new(0, 0)));
        assert!(!after.board().is_empty_at(Position::new(0, 0)));
        assert_eq!(manager.snapshot("s1").unwrap(), after);
    }

    #[test]
    fn test_retire_only_finished_sessions() {
        let manager = manager();
        started(&manager);
        assert!(!manager.retire("s1").unwrap());

        let done = manager.resign("s1", "bob").unwrap();
        assert!(matches!(done.phase(), Phase::GameOver(_)));
        assert!(manager.retire("s1").unwrap());
        assert_eq!(manager.live_count(), 0);

        // Still loadable from the store.
        let restored = manager.load("s1").unwrap();
        assert_eq!(restored.winner(), Some(Side::Red));
    }
}
