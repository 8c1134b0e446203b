//! Adapters turning third-party exports into timeline events.

pub mod loadrunner;
