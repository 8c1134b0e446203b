//! Core domain logic for lanetime.
//! This crate is the single source of truth for window, axis and layout rules.

pub mod config;
pub mod db;
pub mod filter;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod timeline;

pub use config::{ConfigError, ViewConfig};
pub use filter::{all_tags, events_on_day, EventFilter};
pub use import::loadrunner::{
    convert_load_runner_tests, parse_load_runner_json, ImportError, LoadRunnerTest,
};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::event::{EventId, EventLink, EventValidationError, Sentiment, TimelineEvent};
pub use repo::event_repo::{
    EventRepository, InMemoryEventRepository, RepoError, RepoResult, SqliteEventRepository,
};
pub use service::event_service::{EventPatch, EventService, ServiceError, ServiceResult};
pub use service::view_model::{build_view_model, TimelineViewModel};
pub use timeline::labels::{generate_axis_labels, AxisLabel, LabelFormat};
pub use timeline::layout::{layout_events, layout_events_with, LaidOutEvent, LayoutStrategy};
pub use timeline::placement::{place_event, HorizontalPlacement};
pub use timeline::window::{
    navigate, resolve_time_window, resolve_time_window_with, NavigationDirection, RangeSelector,
    TimeWindow,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
