//! Timeline event domain model.
//!
//! # Responsibility
//! - Define the canonical record rendered by timeline, calendar and list views.
//! - Validate interval and identity invariants at construction/decoding time.
//!
//! # Invariants
//! - `id` is non-blank and unique within one event collection.
//! - `lane` is non-blank; it is the only grouping key used by layout.
//! - `start <= end`. Zero-duration events (`start == end`) are legal.
//! - Decoding assigns a generated id to records without one, then validates.
//!
//! # See also
//! - crate::timeline::layout

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque event identifier.
///
/// Imported collections may carry arbitrary strings, so this is not a `Uuid`.
pub type EventId = String;

/// Display tone attached to an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// External reference attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLink {
    pub url: String,
    /// Serialized as `type` to match the stored collection format.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Validation errors for event invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyId,
    EmptyLane,
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "event id must not be blank"),
            Self::EmptyLane => write!(f, "event lane must not be blank"),
            Self::InvalidInterval { start, end } => {
                write!(f, "endDate ({end}) must be >= startDate ({start})")
            }
        }
    }
}

impl Error for EventValidationError {}

/// Canonical event record.
///
/// Payload fields (`title`, `description`, `sentiment`, `tags`, `links`) are
/// opaque to window and layout computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTimelineEvent")]
pub struct TimelineEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "startDate")]
    pub start: NaiveDateTime,
    #[serde(rename = "endDate")]
    pub end: NaiveDateTime,
    pub lane: String,
    pub sentiment: Sentiment,
    pub tags: Vec<String>,
    pub links: Vec<EventLink>,
}

impl TimelineEvent {
    /// Creates an event with a generated id and empty payload.
    ///
    /// Does not validate; callers persisting the event go through
    /// repository writes, which do.
    pub fn new(
        title: impl Into<String>,
        lane: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, lane, start, end)
    }

    /// Creates an event with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: impl Into<EventId>,
        title: impl Into<String>,
        lane: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            start,
            end,
            lane: lane.into(),
            sentiment: Sentiment::default(),
            tags: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Checks identity, lane and interval invariants.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.id.trim().is_empty() {
            return Err(EventValidationError::EmptyId);
        }
        if self.lane.trim().is_empty() {
            return Err(EventValidationError::EmptyLane);
        }
        if self.end < self.start {
            return Err(EventValidationError::InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Returns whether the event has zero duration.
    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimelineEvent {
    #[serde(default)]
    id: EventId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(deserialize_with = "deserialize_instant")]
    start_date: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_instant")]
    end_date: NaiveDateTime,
    lane: String,
    #[serde(default)]
    sentiment: Sentiment,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    links: Vec<EventLink>,
}

/// Accepts naive timestamps and RFC 3339 ones; offsets are folded into UTC.
fn deserialize_instant<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    if let Ok(naive) = text.parse::<NaiveDateTime>() {
        return Ok(naive);
    }
    DateTime::parse_from_rfc3339(&text)
        .map(|instant| instant.naive_utc())
        .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{text}`: {err}")))
}

impl TryFrom<RawTimelineEvent> for TimelineEvent {
    type Error = EventValidationError;

    fn try_from(raw: RawTimelineEvent) -> Result<Self, Self::Error> {
        let id = if raw.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            raw.id
        };
        let event = Self {
            id,
            title: raw.title,
            description: raw.description,
            start: raw.start_date,
            end: raw.end_date,
            lane: raw.lane,
            sentiment: raw.sentiment,
            tags: raw.tags,
            links: raw.links,
        };
        event.validate()?;
        Ok(event)
    }
}
