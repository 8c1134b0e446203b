//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the injected event store contract used by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `TimelineEvent::validate()` first.
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to DB transport errors.

pub mod event_repo;
