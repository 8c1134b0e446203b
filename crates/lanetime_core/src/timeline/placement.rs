//! Horizontal placement of events and ticks inside a window.

use super::window::TimeWindow;
use crate::model::event::TimelineEvent;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default minimum rendered width, in percent of the window.
pub const DEFAULT_MIN_EVENT_WIDTH_PERCENT: f64 = 0.5;

/// Percent-based horizontal geometry for one event bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPlacement {
    /// Clamped to `[0, 100]`.
    pub left_percent: f64,
    /// Clamped to `[min_width, 100]`.
    pub width_percent: f64,
    /// False when the event lies entirely outside the window.
    pub visible: bool,
}

/// Offset of `instant` from the window start, in percent.
///
/// Not clamped; values outside `[0, 100]` mean the instant is off-screen.
pub fn label_offset_percent(instant: NaiveDateTime, window: &TimeWindow) -> f64 {
    let window = window.labeling_window();
    let total_ms = window.span().num_milliseconds();
    if total_ms <= 0 {
        return 0.0;
    }
    let offset_ms = (instant - window.start).num_milliseconds();
    offset_ms as f64 / total_ms as f64 * 100.0
}

/// Places `event` inside `window`.
///
/// Zero-duration events still get `min_width_percent`.
pub fn place_event(
    event: &TimelineEvent,
    window: &TimeWindow,
    min_width_percent: f64,
) -> HorizontalPlacement {
    let left = label_offset_percent(event.start, window);
    let right = label_offset_percent(event.end, window);
    let width = right - left;
    let min_width = min_width_percent.max(0.0).min(100.0);

    HorizontalPlacement {
        left_percent: left.clamp(0.0, 100.0),
        width_percent: width.clamp(min_width, 100.0),
        visible: !(left > 100.0 || right < 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn places_event_proportionally() {
        let window = TimeWindow::new(at(14, 0), at(16, 0));
        let event = TimelineEvent::with_id("a", "a", "A", at(14, 12), at(15, 0));
        let placement = place_event(&event, &window, DEFAULT_MIN_EVENT_WIDTH_PERCENT);
        assert!((placement.left_percent - 25.0).abs() < 1e-9);
        assert!((placement.width_percent - 25.0).abs() < 1e-9);
        assert!(placement.visible);
    }

    #[test]
    fn zero_duration_event_gets_minimum_width() {
        let window = TimeWindow::new(at(14, 0), at(16, 0));
        let event = TimelineEvent::with_id("p", "p", "A", at(15, 0), at(15, 0));
        let placement = place_event(&event, &window, DEFAULT_MIN_EVENT_WIDTH_PERCENT);
        assert_eq!(placement.width_percent, DEFAULT_MIN_EVENT_WIDTH_PERCENT);
        assert!(placement.visible);
    }

    #[test]
    fn events_outside_window_are_hidden_and_clamped() {
        let window = TimeWindow::new(at(14, 0), at(16, 0));
        let before = TimelineEvent::with_id("b", "b", "A", at(10, 0), at(11, 0));
        let placement = place_event(&before, &window, DEFAULT_MIN_EVENT_WIDTH_PERCENT);
        assert!(!placement.visible);
        assert_eq!(placement.left_percent, 0.0);

        let straddling = TimelineEvent::with_id("s", "s", "A", at(13, 0), at(20, 0));
        let placement = place_event(&straddling, &window, DEFAULT_MIN_EVENT_WIDTH_PERCENT);
        assert!(placement.visible);
        assert_eq!(placement.width_percent, 100.0);
    }

    #[test]
    fn zero_width_window_uses_containing_day() {
        let window = TimeWindow::new(at(15, 12), at(15, 12));
        let offset = label_offset_percent(at(15, 12), &window);
        assert!(offset > 49.0 && offset < 51.0);
    }
}
