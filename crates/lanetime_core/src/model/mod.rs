//! Domain model for timeline events.
//!
//! # Responsibility
//! - Define the event record shared by timeline, calendar and list projections.
//!
//! # Invariants
//! - Every event is identified by a non-blank `EventId`.
//! - `start <= end` holds for every validated event.

pub mod event;
