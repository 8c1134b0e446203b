//! Event repository contracts with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Provide CRUD APIs over the event collection.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `TimelineEvent::validate()` before mutating anything.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `list_events` returns a fresh collection in insertion order.

use crate::db::DbError;
use crate::model::event::{EventId, EventLink, EventValidationError, Sentiment, TimelineEvent};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    start_ms,
    end_ms,
    lane,
    sentiment,
    tags_json,
    links_json
FROM events";

const EVENT_INSERT_SQL: &str = "INSERT INTO events (
    id,
    title,
    description,
    start_ms,
    end_ms,
    lane,
    sentiment,
    tags_json,
    links_json
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    Duplicate(EventId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::Duplicate(id) => write!(f, "event id already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Duplicate(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the event collection.
pub trait EventRepository {
    fn create_event(&mut self, event: &TimelineEvent) -> RepoResult<EventId>;
    fn update_event(&mut self, event: &TimelineEvent) -> RepoResult<()>;
    fn delete_event(&mut self, id: &str) -> RepoResult<()>;
    fn get_event(&self, id: &str) -> RepoResult<Option<TimelineEvent>>;
    fn list_events(&self) -> RepoResult<Vec<TimelineEvent>>;
    /// Replaces the whole collection atomically.
    fn replace_all(&mut self, events: &[TimelineEvent]) -> RepoResult<()>;
    fn clear(&mut self) -> RepoResult<()>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let ready: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'events');",
            [],
            |row| row.get(0),
        )?;
        if !ready {
            return Err(RepoError::InvalidData(
                "events table is missing; open the connection through db::open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&mut self, event: &TimelineEvent) -> RepoResult<EventId> {
        event.validate()?;
        insert_event(self.conn, event)?;
        Ok(event.id.clone())
    }

    fn update_event(&mut self, event: &TimelineEvent) -> RepoResult<()> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                title = ?2,
                description = ?3,
                start_ms = ?4,
                end_ms = ?5,
                lane = ?6,
                sentiment = ?7,
                tags_json = ?8,
                links_json = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                event.id.as_str(),
                event.title.as_str(),
                event.description.as_deref(),
                to_epoch_ms(event.start),
                to_epoch_ms(event.end),
                event.lane.as_str(),
                sentiment_to_db(event.sentiment),
                encode_json(&event.tags)?,
                encode_json(&event.links)?,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id.clone()));
        }
        Ok(())
    }

    fn delete_event(&mut self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM events WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_event(&self, id: &str) -> RepoResult<Option<TimelineEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn list_events(&self) -> RepoResult<Vec<TimelineEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn replace_all(&mut self, events: &[TimelineEvent]) -> RepoResult<()> {
        validate_collection(events)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM events;", [])?;
        for event in events {
            insert_event(&tx, event)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM events;", [])?;
        Ok(())
    }
}

/// Vec-backed repository for tests and callers without storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    events: Vec<TimelineEvent>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-filled with a validated collection.
    pub fn with_events(events: Vec<TimelineEvent>) -> RepoResult<Self> {
        validate_collection(&events)?;
        Ok(Self { events })
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.events.iter().position(|event| event.id == id)
    }
}

impl EventRepository for InMemoryEventRepository {
    fn create_event(&mut self, event: &TimelineEvent) -> RepoResult<EventId> {
        event.validate()?;
        if self.position(&event.id).is_some() {
            return Err(RepoError::Duplicate(event.id.clone()));
        }
        self.events.push(event.clone());
        Ok(event.id.clone())
    }

    fn update_event(&mut self, event: &TimelineEvent) -> RepoResult<()> {
        event.validate()?;
        let index = self
            .position(&event.id)
            .ok_or_else(|| RepoError::NotFound(event.id.clone()))?;
        self.events[index] = event.clone();
        Ok(())
    }

    fn delete_event(&mut self, id: &str) -> RepoResult<()> {
        let index = self
            .position(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
        self.events.remove(index);
        Ok(())
    }

    fn get_event(&self, id: &str) -> RepoResult<Option<TimelineEvent>> {
        Ok(self.position(id).map(|index| self.events[index].clone()))
    }

    fn list_events(&self) -> RepoResult<Vec<TimelineEvent>> {
        Ok(self.events.clone())
    }

    fn replace_all(&mut self, events: &[TimelineEvent]) -> RepoResult<()> {
        validate_collection(events)?;
        self.events = events.to_vec();
        Ok(())
    }

    fn clear(&mut self) -> RepoResult<()> {
        self.events.clear();
        Ok(())
    }
}

/// Validates every event and rejects duplicate ids.
fn validate_collection(events: &[TimelineEvent]) -> RepoResult<()> {
    let mut seen = HashSet::with_capacity(events.len());
    for event in events {
        event.validate()?;
        if !seen.insert(event.id.as_str()) {
            return Err(RepoError::Duplicate(event.id.clone()));
        }
    }
    Ok(())
}

fn insert_event(conn: &Connection, event: &TimelineEvent) -> RepoResult<()> {
    let result = conn.execute(
        EVENT_INSERT_SQL,
        params![
            event.id.as_str(),
            event.title.as_str(),
            event.description.as_deref(),
            to_epoch_ms(event.start),
            to_epoch_ms(event.end),
            event.lane.as_str(),
            sentiment_to_db(event.sentiment),
            encode_json(&event.tags)?,
            encode_json(&event.links)?,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(failure, _))
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Err(RepoError::Duplicate(event.id.clone()))
        }
        Err(err) => Err(err.into()),
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<TimelineEvent> {
    let id: String = row.get("id")?;

    let sentiment_text: String = row.get("sentiment")?;
    let sentiment = parse_sentiment(&sentiment_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid sentiment `{sentiment_text}` in events.sentiment"
        ))
    })?;

    let tags_text: String = row.get("tags_json")?;
    let tags: Vec<String> = serde_json::from_str(&tags_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid tags for event `{id}`: {err}"))
    })?;

    let links_text: String = row.get("links_json")?;
    let links: Vec<EventLink> = serde_json::from_str(&links_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid links for event `{id}`: {err}"))
    })?;

    let event = TimelineEvent {
        start: from_epoch_ms(row.get("start_ms")?)?,
        end: from_epoch_ms(row.get("end_ms")?)?,
        title: row.get("title")?,
        description: row.get("description")?,
        lane: row.get("lane")?,
        sentiment,
        tags,
        links,
        id,
    };
    event.validate()?;
    Ok(event)
}

/// Wall-clock instants are stored as if they were UTC.
fn to_epoch_ms(instant: NaiveDateTime) -> i64 {
    instant.and_utc().timestamp_millis()
}

fn from_epoch_ms(value: i64) -> RepoResult<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp_millis(value)
        .map(|instant| instant.naive_utc())
        .ok_or_else(|| RepoError::InvalidData(format!("timestamp {value} is out of range")))
}

fn encode_json<T: serde::Serialize>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value).map_err(|err| RepoError::InvalidData(err.to_string()))
}

fn sentiment_to_db(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "positive",
        Sentiment::Neutral => "neutral",
        Sentiment::Negative => "negative",
    }
}

fn parse_sentiment(value: &str) -> Option<Sentiment> {
    match value {
        "positive" => Some(Sentiment::Positive),
        "neutral" => Some(Sentiment::Neutral),
        "negative" => Some(Sentiment::Negative),
        _ => None,
    }
}
