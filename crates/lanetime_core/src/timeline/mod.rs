//! Timeline windowing and layout engine.
//!
//! # Responsibility
//! - Resolve view windows from a focus instant and a range selector.
//! - Generate axis tick labels for a window.
//! - Stack overlapping events inside each lane.
//!
//! # Invariants
//! - Functions here never fail and hold no shared state.
//! - Identical inputs always produce structurally identical outputs.

pub mod labels;
pub mod layout;
pub mod placement;
pub mod window;
