//! SQLite repository for session records.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, DbErrorKind, ParticipantRole, SessionRow, SessionStore, schema};
use crate::games::morris::{SessionRecord, SessionStatus};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for session records.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.is_empty() {
            return Err(DbError::of_kind(DbErrorKind::Connection, "Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Opens the database and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or a migration fails.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        repo.migrate()?;
        Ok(repo)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| {
                DbError::of_kind(
                    DbErrorKind::Connection,
                    format!("Failed to connect to '{}': {}", self.db_path, e),
                )
            })
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::of_kind(DbErrorKind::Migration, e.to_string()))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Inserts or replaces the row for a session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if encoding or the write fails.
    #[instrument(skip(self, record), fields(session_id = %record.id, status = %record.status))]
    pub fn save_session(&self, record: &SessionRecord) -> Result<(), DbError> {
        let row = SessionRow::from_record(record)?;
        let mut conn = self.connection()?;

        diesel::replace_into(schema::sessions::table)
            .values(&row)
            .execute(&mut conn)?;

        debug!(moves = record.moves.len(), "Session saved");
        Ok(())
    }

    /// Loads a session record by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database or decoding error occurs.
    #[instrument(skip(self))]
    pub fn load_session(&self, id: &str) -> Result<Option<SessionRecord>, DbError> {
        let mut conn = self.connection()?;

        let row = schema::sessions::table
            .filter(schema::sessions::id.eq(id))
            .first::<SessionRow>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.to_record()?)),
            None => {
                debug!("Session not found");
                Ok(None)
            }
        }
    }

    /// Lists sessions where `participant` holds `role` and the status matches,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database or decoding error occurs.
    #[instrument(skip(self))]
    pub fn find_sessions(
        &self,
        participant: &str,
        role: ParticipantRole,
        status: SessionStatus,
    ) -> Result<Vec<SessionRecord>, DbError> {
        use schema::sessions::dsl;

        let mut conn = self.connection()?;
        let status = status.to_string();

        let rows = match role {
            ParticipantRole::Initiator => dsl::sessions
                .filter(dsl::initiator_id.eq(participant))
                .filter(dsl::status.eq(&status))
                .order(dsl::created_at.asc())
                .load::<SessionRow>(&mut conn)?,
            ParticipantRole::Opponent => dsl::sessions
                .filter(dsl::opponent_id.eq(participant))
                .filter(dsl::status.eq(&status))
                .order(dsl::created_at.asc())
                .load::<SessionRow>(&mut conn)?,
        };

        info!(count = rows.len(), "Sessions loaded");
        rows.iter().map(SessionRow::to_record).collect()
    }
}

impl SessionStore for GameRepository {
    fn save(&self, record: &SessionRecord) -> Result<(), DbError> {
        self.save_session(record)
    }

    fn load(&self, id: &str) -> Result<Option<SessionRecord>, DbError> {
        self.load_session(id)
    }

    fn find_by_participant(
        &self,
        participant: &str,
        role: ParticipantRole,
        status: SessionStatus,
    ) -> Result<Vec<SessionRecord>, DbError> {
        self.find_sessions(participant, role, status)
    }
}
