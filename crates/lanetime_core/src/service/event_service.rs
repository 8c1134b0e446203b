//! Event store use-case service.
//!
//! # Responsibility
//! - Provide add/update/remove/clone/import/clear entry points over an
//!   injected `EventRepository`.
//! - Serialize the collection to and from its JSON storage format.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Read APIs return fresh collections; callers never see repository state.
//! - Cloned and imported events never reuse an existing id.

use crate::config::ViewConfig;
use crate::filter::EventFilter;
use crate::model::event::{EventId, EventLink, Sentiment, TimelineEvent};
use crate::repo::event_repo::{EventRepository, RepoError};
use crate::service::view_model::{build_view_model, TimelineViewModel};
use crate::timeline::window::{default_focus, RangeSelector};
use chrono::NaiveDateTime;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const CLONE_TITLE_SUFFIX: &str = " (Copy)";

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    EventNotFound(EventId),
    Repo(RepoError),
    Serialization(serde_json::Error),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "event collection serialization failed: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EventNotFound(_) => None,
            Self::Repo(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EventNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Partial update merged into an existing event.
///
/// `None` keeps the current value. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub lane: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub tags: Option<Vec<String>>,
    pub links: Option<Vec<EventLink>>,
}

impl EventPatch {
    pub fn apply_to(&self, event: &mut TimelineEvent) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
        if let Some(lane) = &self.lane {
            event.lane = lane.clone();
        }
        if let Some(sentiment) = self.sentiment {
            event.sentiment = sentiment;
        }
        if let Some(tags) = &self.tags {
            event.tags = tags.clone();
        }
        if let Some(links) = &self.links {
            event.links = links.clone();
        }
    }
}

/// Event store facade over repository implementations.
pub struct EventService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> EventService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends one event; the id must be new.
    pub fn add_event(&mut self, event: TimelineEvent) -> ServiceResult<TimelineEvent> {
        self.repo.create_event(&event)?;
        debug!("event=event_add module=service status=ok");
        Ok(event)
    }

    /// Merges `patch` into the event with `id` and persists the result.
    ///
    /// The merged event is validated as a whole, so a patch that moves
    /// `start` past the existing `end` is rejected.
    pub fn update_event(&mut self, id: &str, patch: &EventPatch) -> ServiceResult<TimelineEvent> {
        let mut event = self
            .repo
            .get_event(id)?
            .ok_or_else(|| ServiceError::EventNotFound(id.to_string()))?;
        patch.apply_to(&mut event);
        self.repo.update_event(&event)?;
        debug!("event=event_update module=service status=ok");
        Ok(event)
    }

    /// Removes one event. Returns `false` when no event had `id`.
    pub fn remove_event(&mut self, id: &str) -> ServiceResult<bool> {
        match self.repo.delete_event(id) {
            Ok(()) => Ok(true),
            Err(RepoError::NotFound(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Duplicates an event under a fresh id with a `(Copy)` title suffix.
    ///
    /// Returns `None` when no event had `id`.
    pub fn clone_event(&mut self, id: &str) -> ServiceResult<Option<TimelineEvent>> {
        let Some(source) = self.repo.get_event(id)? else {
            return Ok(None);
        };

        let mut copy = source;
        copy.id = Uuid::new_v4().to_string();
        copy.title.push_str(CLONE_TITLE_SUFFIX);
        self.repo.create_event(&copy)?;
        debug!("event=event_clone module=service status=ok");
        Ok(Some(copy))
    }

    /// Replaces the whole collection; blank ids get generated ones.
    pub fn import_events(&mut self, events: Vec<TimelineEvent>) -> ServiceResult<Vec<TimelineEvent>> {
        let events: Vec<TimelineEvent> = events
            .into_iter()
            .map(|mut event| {
                if event.id.trim().is_empty() {
                    event.id = Uuid::new_v4().to_string();
                }
                event
            })
            .collect();

        self.repo.replace_all(&events)?;
        info!(
            "event=events_import module=service status=ok count={}",
            events.len()
        );
        Ok(events)
    }

    pub fn clear_events(&mut self) -> ServiceResult<()> {
        self.repo.clear()?;
        info!("event=events_clear module=service status=ok");
        Ok(())
    }

    pub fn get_event(&self, id: &str) -> ServiceResult<Option<TimelineEvent>> {
        Ok(self.repo.get_event(id)?)
    }

    /// Returns the current collection in insertion order.
    pub fn snapshot(&self) -> ServiceResult<Vec<TimelineEvent>> {
        Ok(self.repo.list_events()?)
    }

    /// Serializes the collection as a pretty JSON array.
    pub fn export_json(&self) -> ServiceResult<String> {
        let events = self.snapshot()?;
        Ok(serde_json::to_string_pretty(&events)?)
    }

    /// Replaces the collection with a JSON array of events.
    pub fn import_json(&mut self, json: &str) -> ServiceResult<Vec<TimelineEvent>> {
        let events: Vec<TimelineEvent> = serde_json::from_str(json)?;
        self.import_events(events)
    }

    /// Focus used when the caller has none: latest event end, else `fallback`.
    pub fn default_focus(&self, fallback: NaiveDateTime) -> ServiceResult<NaiveDateTime> {
        Ok(default_focus(&self.snapshot()?, fallback))
    }

    /// Builds a renderer-ready timeline for the filtered collection.
    pub fn timeline_view(
        &self,
        focus: NaiveDateTime,
        range: RangeSelector,
        filter: &EventFilter,
        config: &ViewConfig,
    ) -> ServiceResult<TimelineViewModel> {
        let events = filter.apply(&self.snapshot()?);
        Ok(build_view_model(&events, focus, range, config))
    }
}
