//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Compose the timeline engine into renderer-ready projections.

pub mod event_service;
pub mod view_model;
