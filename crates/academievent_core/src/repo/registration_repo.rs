//! Registration store contracts and SQLite implementation.
//!
//! # Invariants
//! - `(event_id, user_id)` is unique; a second insert fails with
//!   `RegistrationStoreError::Duplicate` and leaves the first row untouched.
//! - Attendee listing is ordered by `created_at ASC, id ASC`.

use crate::db::DbError;
use crate::model::event::new_record_id;
use crate::model::registration::{Registration, RegistrationStatus};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RegistrationResult<T> = Result<T, RegistrationStoreError>;

/// Registration store failure.
#[derive(Debug)]
pub enum RegistrationStoreError {
    /// The user already holds a registration for this event.
    Duplicate { event_id: String, user_id: String },
    NotFound(String),
    Db(DbError),
    InvalidData(String),
}

impl Display for RegistrationStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate { event_id, user_id } => {
                write!(f, "user {user_id} is already registered for event {event_id}")
            }
            Self::NotFound(id) => write!(f, "registration not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted registration data: {message}")
            }
        }
    }
}

impl Error for RegistrationStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for RegistrationStoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for marketplace registrations.
pub trait RegistrationStore {
    /// Records a registration in `Registered` state.
    fn insert(&self, event_id: &str, user_id: &str) -> RegistrationResult<Registration>;
    fn get(&self, registration_id: &str) -> RegistrationResult<Registration>;
    /// Lists registrations for one event (attendee view).
    fn list_by_event(&self, event_id: &str) -> RegistrationResult<Vec<Registration>>;
    /// Moves one registration to a new attendance status.
    fn update_status(
        &self,
        registration_id: &str,
        status: RegistrationStatus,
    ) -> RegistrationResult<Registration>;
}

/// SQLite-backed registration store.
pub struct SqliteRegistrationStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistrationStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RegistrationStore for SqliteRegistrationStore<'_> {
    fn insert(&self, event_id: &str, user_id: &str) -> RegistrationResult<Registration> {
        let id = new_record_id();
        let inserted = self.conn.execute(
            "INSERT INTO registrations (id, event_id, user_id, status)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.as_str(),
                event_id,
                user_id,
                RegistrationStatus::Registered.as_str()
            ],
        );

        match inserted {
            Ok(_) => self.get(&id),
            Err(err) if is_unique_violation(&err) => Err(RegistrationStoreError::Duplicate {
                event_id: event_id.to_string(),
                user_id: user_id.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn get(&self, registration_id: &str) -> RegistrationResult<Registration> {
        let mut stmt = self.conn.prepare(
            "SELECT id, event_id, user_id, status, created_at
             FROM registrations
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([registration_id])?;
        match rows.next()? {
            Some(row) => parse_registration_row(row),
            None => Err(RegistrationStoreError::NotFound(registration_id.to_string())),
        }
    }

    fn list_by_event(&self, event_id: &str) -> RegistrationResult<Vec<Registration>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, event_id, user_id, status, created_at
             FROM registrations
             WHERE event_id = ?1
             ORDER BY created_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([event_id])?;
        let mut registrations = Vec::new();
        while let Some(row) = rows.next()? {
            registrations.push(parse_registration_row(row)?);
        }
        Ok(registrations)
    }

    fn update_status(
        &self,
        registration_id: &str,
        status: RegistrationStatus,
    ) -> RegistrationResult<Registration> {
        let changed = self.conn.execute(
            "UPDATE registrations SET status = ?1 WHERE id = ?2;",
            params![status.as_str(), registration_id],
        )?;
        if changed == 0 {
            return Err(RegistrationStoreError::NotFound(
                registration_id.to_string(),
            ));
        }
        self.get(registration_id)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == ErrorCode::ConstraintViolation
                && inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_registration_row(row: &Row<'_>) -> RegistrationResult<Registration> {
    let status_text: String = row.get("status")?;
    let status = RegistrationStatus::parse(&status_text).ok_or_else(|| {
        RegistrationStoreError::InvalidData(format!(
            "invalid status `{status_text}` in registrations.status"
        ))
    })?;

    Ok(Registration {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        user_id: row.get("user_id")?,
        status,
        created_at: row.get("created_at")?,
    })
}
