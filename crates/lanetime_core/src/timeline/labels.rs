//! Axis tick label generation.
//!
//! # Responsibility
//! - Choose tick density from the window span and emit ordered labels.
//!
//! # Invariants
//! - Labels are strictly ascending and all lie within `[start, end]`.
//! - Out-of-window candidates are dropped, never clamped.
//! - Only time-of-day labels at midnight carry the date caption.

use super::window::{start_of_day, TimeWindow};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

const SIX_HOUR_MARKS: &[u32] = &[0, 6, 12, 18];
const TWELVE_HOUR_MARKS: &[u32] = &[0, 12];

/// Display format of an axis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelFormat {
    #[serde(rename = "HH:mm")]
    HourMinute,
    #[serde(rename = "MMM d")]
    MonthDay,
}

impl LabelFormat {
    /// Renderer-facing pattern string.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::HourMinute => "HH:mm",
            Self::MonthDay => "MMM d",
        }
    }

    /// Formats `instant` the way the pattern describes.
    pub fn render(self, instant: NaiveDateTime) -> String {
        match self {
            Self::HourMinute => instant.format("%H:%M").to_string(),
            Self::MonthDay => instant.format("%b %-d").to_string(),
        }
    }
}

/// One axis tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLabel {
    pub instant: NaiveDateTime,
    #[serde(rename = "displayFormat")]
    pub format: LabelFormat,
    pub show_date_above_time: bool,
}

impl AxisLabel {
    pub fn text(&self) -> String {
        self.format.render(self.instant)
    }

    /// Date line shown above the time, e.g. `Mar 15, 2024`.
    pub fn date_caption(&self) -> Option<String> {
        self.show_date_above_time
            .then(|| self.instant.format("%b %-d, %Y").to_string())
    }
}

/// Generates axis labels for `window`.
///
/// Density by whole days `d` between the bounds:
/// - `d <= 1`: every hour boundary.
/// - `d <= 3`: 00, 06, 12 and 18 of each day.
/// - `d <= 7`: 00 and 12 of each day.
/// - otherwise one `MMM d` label per day start.
pub fn generate_axis_labels(window: &TimeWindow) -> Vec<AxisLabel> {
    let days = window.whole_days();
    if days <= 1 {
        hourly_labels(window)
    } else if days <= 3 {
        marked_hour_labels(window, SIX_HOUR_MARKS)
    } else if days <= 7 {
        marked_hour_labels(window, TWELVE_HOUR_MARKS)
    } else {
        daily_labels(window)
    }
}

fn time_label(instant: NaiveDateTime) -> AxisLabel {
    AxisLabel {
        instant,
        format: LabelFormat::HourMinute,
        show_date_above_time: instant.hour() == 0,
    }
}

fn hourly_labels(window: &TimeWindow) -> Vec<AxisLabel> {
    let mut labels = Vec::new();
    let mut cursor = ceil_to_hour(window.start);
    while cursor <= window.end {
        labels.push(time_label(cursor));
        match cursor.checked_add_signed(TimeDelta::hours(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    labels
}

fn marked_hour_labels(window: &TimeWindow, marks: &[u32]) -> Vec<AxisLabel> {
    days_in(window)
        .flat_map(|day| {
            marks
                .iter()
                .filter_map(move |hour| day.and_hms_opt(*hour, 0, 0))
        })
        .filter(|candidate| window.contains(*candidate))
        .map(time_label)
        .collect()
}

fn daily_labels(window: &TimeWindow) -> Vec<AxisLabel> {
    days_in(window)
        .map(start_of_day)
        .filter(|candidate| window.contains(*candidate))
        .map(|instant| AxisLabel {
            instant,
            format: LabelFormat::MonthDay,
            show_date_above_time: false,
        })
        .collect()
}

/// Calendar days touched by the window, ascending.
fn days_in(window: &TimeWindow) -> impl Iterator<Item = NaiveDate> {
    let last = window.end.date();
    window
        .start
        .date()
        .iter_days()
        .take_while(move |day| *day <= last)
}

fn ceil_to_hour(instant: NaiveDateTime) -> NaiveDateTime {
    let floored = instant
        .date()
        .and_hms_opt(instant.hour(), 0, 0)
        .unwrap_or(instant);
    if floored < instant {
        floored
            .checked_add_signed(TimeDelta::hours(1))
            .unwrap_or(floored)
    } else {
        floored
    }
}
