//! Event store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create-or-update, read and delete APIs over per-user schedules.
//! - Persist task and budget sub-records alongside their event.
//! - Serve marketplace listings published by organizers.
//!
//! # Invariants
//! - Records are keyed by `(owner_id, id)`; the same marketplace id may exist
//!   once per user schedule.
//! - Write paths recompute budget totals and call `Event::validate()` before
//!   SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Task and budget lists are replaced wholesale on every upsert.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::event::{
    format_date, format_time, parse_date, parse_time, BudgetItem, Event, EventCategory,
    EventValidationError, Priority, Task, TaskStatus,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EVENT_SELECT_SQL: &str = "SELECT
    e.owner_id,
    e.id,
    e.title,
    e.description,
    e.event_date,
    e.event_time,
    e.location,
    e.category,
    e.priority,
    e.organizer_name,
    e.total_budget,
    e.total_spent
FROM events e";

pub type StoreResult<T> = Result<T, StoreError>;

/// Event store failure.
#[derive(Debug)]
pub enum StoreError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound { owner_id: String, event_id: String },
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { owner_id, event_id } => {
                write!(f, "event not found: {event_id} (owner {owner_id})")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "event store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<EventValidationError> for StoreError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter options for marketplace browsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketplaceQuery {
    /// Case-insensitive substring matched against title or organizer name.
    pub search: Option<String>,
    /// Only listings on or after this date.
    pub from_date: Option<NaiveDate>,
}

/// Persistence contract for per-user schedules.
pub trait EventStore {
    /// Lists one user's events ordered by `(date, time, id)`.
    fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Event>>;
    /// Creates or replaces one event under `event.owner_id`.
    ///
    /// Returns the record as persisted (totals recomputed).
    fn upsert(&self, event: &Event) -> StoreResult<Event>;
    /// Upserts a batch atomically; on any failure nothing is written.
    fn upsert_many(&self, events: &[Event]) -> StoreResult<Vec<Event>>;
    fn get(&self, user_id: &str, event_id: &str) -> StoreResult<Option<Event>>;
    fn delete(&self, user_id: &str, event_id: &str) -> StoreResult<()>;
    /// Upserts an organizer event and makes it visible in the marketplace.
    fn publish(&self, event: &Event) -> StoreResult<Event>;
    /// Lists published marketplace events ordered by `(date, time, id)`.
    fn list_marketplace(&self, query: &MarketplaceQuery) -> StoreResult<Vec<Event>>;
    /// Returns the published listing with `event_id` as stored by its owner.
    fn get_listing(&self, event_id: &str) -> StoreResult<Option<Event>>;
}

/// SQLite-backed event store.
pub struct SqliteEventStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventStore<'conn> {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn query_events(&self, sql: &str, bind_values: Vec<Value>) -> StoreResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        for event in &mut events {
            load_children(self.conn, event)?;
        }
        Ok(events)
    }
}

impl EventStore for SqliteEventStore<'_> {
    fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Event>> {
        self.query_events(
            &format!(
                "{EVENT_SELECT_SQL}
                 WHERE e.owner_id = ?
                 ORDER BY e.event_date ASC, e.event_time ASC, e.id ASC;"
            ),
            vec![Value::Text(user_id.to_string())],
        )
    }

    fn upsert(&self, event: &Event) -> StoreResult<Event> {
        let tx = self.conn.unchecked_transaction()?;
        let stored = write_event(&tx, event)?;
        tx.commit()?;
        Ok(stored)
    }

    fn upsert_many(&self, events: &[Event]) -> StoreResult<Vec<Event>> {
        let tx = self.conn.unchecked_transaction()?;
        let stored = events
            .iter()
            .map(|event| write_event(&tx, event))
            .collect::<StoreResult<Vec<_>>>()?;
        tx.commit()?;
        Ok(stored)
    }

    fn get(&self, user_id: &str, event_id: &str) -> StoreResult<Option<Event>> {
        let mut events = self.query_events(
            &format!("{EVENT_SELECT_SQL} WHERE e.owner_id = ? AND e.id = ?;"),
            vec![
                Value::Text(user_id.to_string()),
                Value::Text(event_id.to_string()),
            ],
        )?;
        Ok(events.pop())
    }

    fn delete(&self, user_id: &str, event_id: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM events WHERE owner_id = ?1 AND id = ?2;",
            params![user_id, event_id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                owner_id: user_id.to_string(),
                event_id: event_id.to_string(),
            });
        }
        Ok(())
    }

    fn publish(&self, event: &Event) -> StoreResult<Event> {
        if !event.is_marketplace() {
            return Err(StoreError::InvalidData(format!(
                "only Organizer events can be published, got {}",
                event.category
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        let listed_owner: Option<String> = tx
            .query_row(
                "SELECT owner_id FROM marketplace_listings WHERE event_id = ?1;",
                [event.id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if listed_owner.is_some_and(|owner| owner != event.owner_id) {
            return Err(StoreError::InvalidData(format!(
                "marketplace listing `{}` belongs to another organizer",
                event.id
            )));
        }

        let stored = write_event(&tx, event)?;
        tx.execute(
            "INSERT INTO marketplace_listings (event_id, owner_id)
             VALUES (?1, ?2)
             ON CONFLICT (event_id) DO NOTHING;",
            params![stored.id.as_str(), stored.owner_id.as_str()],
        )?;
        tx.commit()?;
        Ok(stored)
    }

    fn list_marketplace(&self, query: &MarketplaceQuery) -> StoreResult<Vec<Event>> {
        let mut sql = format!(
            "{EVENT_SELECT_SQL}
             JOIN marketplace_listings l
               ON l.event_id = e.id AND l.owner_id = e.owner_id
             WHERE 1 = 1"
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            sql.push_str(
                " AND (instr(lower(e.title), lower(?)) > 0
                   OR instr(lower(coalesce(e.organizer_name, '')), lower(?)) > 0)",
            );
            bind_values.push(Value::Text(search.to_string()));
            bind_values.push(Value::Text(search.to_string()));
        }

        if let Some(from_date) = query.from_date {
            sql.push_str(" AND e.event_date >= ?");
            bind_values.push(Value::Text(format_date(from_date)));
        }

        sql.push_str(" ORDER BY e.event_date ASC, e.event_time ASC, e.id ASC;");
        self.query_events(&sql, bind_values)
    }

    fn get_listing(&self, event_id: &str) -> StoreResult<Option<Event>> {
        let mut events = self.query_events(
            &format!(
                "{EVENT_SELECT_SQL}
                 JOIN marketplace_listings l
                   ON l.event_id = e.id AND l.owner_id = e.owner_id
                 WHERE e.id = ?;"
            ),
            vec![Value::Text(event_id.to_string())],
        )?;
        Ok(events.pop())
    }
}

// Callers own the transaction; children are replaced wholesale.
fn write_event(conn: &Connection, event: &Event) -> StoreResult<Event> {
    let mut event = event.clone();
    event.recompute_totals();
    event.validate()?;

    conn.execute(
        "INSERT INTO events (
            owner_id,
            id,
            title,
            description,
            event_date,
            event_time,
            location,
            category,
            priority,
            organizer_name,
            total_budget,
            total_spent
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT (owner_id, id) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            event_date = excluded.event_date,
            event_time = excluded.event_time,
            location = excluded.location,
            category = excluded.category,
            priority = excluded.priority,
            organizer_name = excluded.organizer_name,
            total_budget = excluded.total_budget,
            total_spent = excluded.total_spent,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![
            event.owner_id.as_str(),
            event.id.as_str(),
            event.title.as_str(),
            event.description.as_str(),
            format_date(event.date),
            format_time(event.time),
            event.location.as_str(),
            event.category.as_str(),
            event.priority.as_str(),
            event.organizer_name.as_deref(),
            event.total_budget,
            event.total_spent,
        ],
    )?;

    conn.execute(
        "DELETE FROM event_tasks WHERE owner_id = ?1 AND event_id = ?2;",
        params![event.owner_id.as_str(), event.id.as_str()],
    )?;
    conn.execute(
        "DELETE FROM event_budget_items WHERE owner_id = ?1 AND event_id = ?2;",
        params![event.owner_id.as_str(), event.id.as_str()],
    )?;

    for (position, task) in event.tasks.iter().enumerate() {
        conn.execute(
            "INSERT INTO event_tasks (owner_id, event_id, position, id, title, status, deadline)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                event.owner_id.as_str(),
                event.id.as_str(),
                position as i64,
                task.id.as_str(),
                task.title.as_str(),
                task.status.as_str(),
                task.deadline.map(format_date),
            ],
        )?;
    }

    for (position, item) in event.budget_items.iter().enumerate() {
        conn.execute(
            "INSERT INTO event_budget_items (
                owner_id, event_id, position, id, description, estimated_cost, actual_cost, paid
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                event.owner_id.as_str(),
                event.id.as_str(),
                position as i64,
                item.id.as_str(),
                item.description.as_str(),
                item.estimated_cost,
                item.actual_cost,
                item.paid.map(bool_to_int),
            ],
        )?;
    }

    Ok(event)
}

fn parse_event_row(row: &Row<'_>) -> StoreResult<Event> {
    let date_text: String = row.get("event_date")?;
    let date = parse_date(&date_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid date `{date_text}` in events.event_date"))
    })?;

    let time_text: String = row.get("event_time")?;
    let time = parse_time(&time_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid time `{time_text}` in events.event_time"))
    })?;

    let category_text: String = row.get("category")?;
    let category = EventCategory::parse(&category_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid category `{category_text}` in events.category"
        ))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid priority `{priority_text}` in events.priority"
        ))
    })?;

    Ok(Event {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        date,
        time,
        category,
        priority,
        title: row.get("title")?,
        location: row.get("location")?,
        description: row.get("description")?,
        organizer_name: row.get("organizer_name")?,
        tasks: Vec::new(),
        budget_items: Vec::new(),
        total_budget: row.get("total_budget")?,
        total_spent: row.get("total_spent")?,
    })
}

fn load_children(conn: &Connection, event: &mut Event) -> StoreResult<()> {
    let mut task_stmt = conn.prepare(
        "SELECT id, title, status, deadline
         FROM event_tasks
         WHERE owner_id = ?1 AND event_id = ?2
         ORDER BY position ASC;",
    )?;
    let mut rows = task_stmt.query(params![event.owner_id.as_str(), event.id.as_str()])?;
    while let Some(row) = rows.next()? {
        let status_text: String = row.get("status")?;
        let status = TaskStatus::parse(&status_text).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "invalid task status `{status_text}` in event_tasks.status"
            ))
        })?;
        let deadline = match row.get::<_, Option<String>>("deadline")? {
            Some(value) => Some(parse_date(&value).ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "invalid deadline `{value}` in event_tasks.deadline"
                ))
            })?),
            None => None,
        };
        event.tasks.push(Task {
            id: row.get("id")?,
            title: row.get("title")?,
            status,
            deadline,
        });
    }

    let mut budget_stmt = conn.prepare(
        "SELECT id, description, estimated_cost, actual_cost, paid
         FROM event_budget_items
         WHERE owner_id = ?1 AND event_id = ?2
         ORDER BY position ASC;",
    )?;
    let mut rows = budget_stmt.query(params![event.owner_id.as_str(), event.id.as_str()])?;
    while let Some(row) = rows.next()? {
        let paid = match row.get::<_, Option<i64>>("paid")? {
            None => None,
            Some(0) => Some(false),
            Some(1) => Some(true),
            Some(other) => {
                return Err(StoreError::InvalidData(format!(
                    "invalid paid value `{other}` in event_budget_items.paid"
                )));
            }
        };
        event.budget_items.push(BudgetItem {
            id: row.get("id")?,
            description: row.get("description")?,
            estimated_cost: row.get("estimated_cost")?,
            actual_cost: row.get("actual_cost")?,
            paid,
        });
    }

    Ok(())
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
