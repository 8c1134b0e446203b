//! Time window resolution for range-based views.
//!
//! # Responsibility
//! - Map a focus instant and a range selector to window boundaries.
//! - Provide window navigation used by previous/next controls.
//!
//! # Invariants
//! - Resolution is total: unknown selectors fall back to the 3-day rule.
//! - Every produced window satisfies `start <= end`.
//! - Week and month windows start at midnight and end at the last
//!   millisecond of their final day.

use crate::model::event::TimelineEvent;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Discrete range selection offered by view controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RangeSelector {
    OneDay,
    #[default]
    ThreeDays,
    OneWeek,
    TwoWeeks,
    OneMonth,
}

impl RangeSelector {
    pub const ALL: [RangeSelector; 5] = [
        Self::OneDay,
        Self::ThreeDays,
        Self::OneWeek,
        Self::TwoWeeks,
        Self::OneMonth,
    ];

    /// Parses a selector string; unrecognized input degrades to `ThreeDays`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "1day" => Self::OneDay,
            "3days" => Self::ThreeDays,
            "1week" => Self::OneWeek,
            "2weeks" => Self::TwoWeeks,
            "1month" => Self::OneMonth,
            _ => Self::ThreeDays,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1day",
            Self::ThreeDays => "3days",
            Self::OneWeek => "1week",
            Self::TwoWeeks => "2weeks",
            Self::OneMonth => "1month",
        }
    }
}

impl Display for RangeSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeSelector {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(value))
    }
}

impl From<String> for RangeSelector {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RangeSelector> for String {
    fn from(value: RangeSelector) -> Self {
        value.as_str().to_string()
    }
}

/// Inclusive `[start, end]` range currently in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Builds a window, swapping reversed bounds so `start <= end` holds.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whole days between bounds, truncated toward zero.
    pub fn whole_days(&self) -> i64 {
        self.span().num_days()
    }

    pub fn is_zero_width(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Returns the window axis labels and placement should be computed over.
    ///
    /// A zero-width window is widened to the calendar day containing it;
    /// any other window is returned unchanged.
    pub fn labeling_window(&self) -> Self {
        if self.is_zero_width() {
            let day = self.start.date();
            Self {
                start: start_of_day(day),
                end: end_of_day(day),
            }
        } else {
            *self
        }
    }
}

/// Direction for previous/next navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Previous,
    Next,
}

/// Resolves the window for `range` around `focus` with a Sunday week start.
pub fn resolve_time_window(focus: NaiveDateTime, range: RangeSelector) -> TimeWindow {
    resolve_time_window_with(focus, range, Weekday::Sun)
}

/// Resolves the window for `range` around `focus` with a custom week start.
pub fn resolve_time_window_with(
    focus: NaiveDateTime,
    range: RangeSelector,
    week_start: Weekday,
) -> TimeWindow {
    match range {
        RangeSelector::OneDay => TimeWindow {
            start: focus,
            end: focus,
        },
        RangeSelector::ThreeDays => TimeWindow {
            start: shift_days(focus, -1),
            end: shift_days(focus, 1),
        },
        RangeSelector::OneWeek => {
            let first = start_of_week(focus.date(), week_start);
            TimeWindow {
                start: start_of_day(first),
                end: end_of_day(shift_date(first, 6)),
            }
        }
        RangeSelector::TwoWeeks => {
            let first = start_of_day(start_of_week(focus.date(), week_start));
            TimeWindow {
                start: first,
                end: shift_days(first, 13),
            }
        }
        RangeSelector::OneMonth => {
            let (first, last) = month_bounds(focus.date());
            TimeWindow {
                start: start_of_day(first),
                end: end_of_day(last),
            }
        }
    }
}

/// Number of days a previous/next step moves the focus.
///
/// Rounds the labeling-window span up, so a zero-width window steps by one
/// day and a full week (ending at 23:59:59.999) steps by seven.
pub fn navigation_step(window: &TimeWindow) -> i64 {
    let span_ms = window.labeling_window().span().num_milliseconds();
    (span_ms + MILLIS_PER_DAY - 1).div_euclid(MILLIS_PER_DAY)
}

/// Moves `focus` by one window length in `direction`.
pub fn navigate(
    focus: NaiveDateTime,
    range: RangeSelector,
    week_start: Weekday,
    direction: NavigationDirection,
) -> NaiveDateTime {
    let step = navigation_step(&resolve_time_window_with(focus, range, week_start));
    match direction {
        NavigationDirection::Previous => shift_days(focus, -step),
        NavigationDirection::Next => shift_days(focus, step),
    }
}

/// Initial focus for a collection: the latest event end, else `fallback`.
pub fn default_focus(events: &[TimelineEvent], fallback: NaiveDateTime) -> NaiveDateTime {
    events
        .iter()
        .map(|event| event.end)
        .max()
        .unwrap_or(fallback)
}

pub(crate) fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

pub(crate) fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    let last_millisecond =
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    day.and_time(last_millisecond)
}

/// Adds whole days, saturating at the representable range.
pub(crate) fn shift_days(instant: NaiveDateTime, days: i64) -> NaiveDateTime {
    let delta = TimeDelta::try_days(days).unwrap_or(TimeDelta::zero());
    instant.checked_add_signed(delta).unwrap_or(instant)
}

fn shift_date(day: NaiveDate, days: i64) -> NaiveDate {
    let delta = TimeDelta::try_days(days).unwrap_or(TimeDelta::zero());
    day.checked_add_signed(delta).unwrap_or(day)
}

fn start_of_week(day: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (day.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    shift_date(day, -i64::from(offset))
}

fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parse_falls_back_to_three_days() {
        assert_eq!(RangeSelector::parse("2weeks"), RangeSelector::TwoWeeks);
        assert_eq!(RangeSelector::parse("fortnight"), RangeSelector::ThreeDays);
        assert_eq!(RangeSelector::parse(""), RangeSelector::ThreeDays);
        assert_eq!("1month".parse::<RangeSelector>(), Ok(RangeSelector::OneMonth));
    }

    #[test]
    fn as_str_matches_parse() {
        for range in RangeSelector::ALL {
            assert_eq!(RangeSelector::parse(range.as_str()), range);
        }
    }

    #[test]
    fn week_start_respects_configured_weekday() {
        // 2024-03-13 is a Wednesday.
        let window =
            resolve_time_window_with(at(2024, 3, 13, 9, 0), RangeSelector::OneWeek, Weekday::Mon);
        assert_eq!(window.start, at(2024, 3, 11, 0, 0));
        assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());
    }

    #[test]
    fn month_bounds_handle_leap_february() {
        let window = resolve_time_window(at(2024, 2, 10, 12, 0), RangeSelector::OneMonth);
        assert_eq!(window.start, at(2024, 2, 1, 0, 0));
        assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn month_bounds_handle_december() {
        let window = resolve_time_window(at(2023, 12, 31, 23, 0), RangeSelector::OneMonth);
        assert_eq!(window.start, at(2023, 12, 1, 0, 0));
        assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn labeling_window_widens_zero_width_to_day() {
        let window = resolve_time_window(at(2024, 3, 15, 10, 30), RangeSelector::OneDay);
        assert!(window.is_zero_width());

        let widened = window.labeling_window();
        assert_eq!(widened.start, at(2024, 3, 15, 0, 0));
        assert_eq!(widened.end, end_of_day(widened.start.date()));
    }

    #[test]
    fn navigation_step_rounds_up_spans() {
        let focus = at(2024, 3, 15, 10, 0);
        let step = |range| navigation_step(&resolve_time_window(focus, range));
        assert_eq!(step(RangeSelector::OneDay), 1);
        assert_eq!(step(RangeSelector::ThreeDays), 2);
        assert_eq!(step(RangeSelector::OneWeek), 7);
        assert_eq!(step(RangeSelector::TwoWeeks), 13);
        assert_eq!(step(RangeSelector::OneMonth), 31);
    }

    #[test]
    fn navigate_moves_focus_both_directions() {
        let focus = at(2024, 3, 15, 10, 0);
        let next = navigate(focus, RangeSelector::OneWeek, Weekday::Sun, NavigationDirection::Next);
        let prev = navigate(
            focus,
            RangeSelector::OneWeek,
            Weekday::Sun,
            NavigationDirection::Previous,
        );
        assert_eq!(next, at(2024, 3, 22, 10, 0));
        assert_eq!(prev, at(2024, 3, 8, 10, 0));
    }

    #[test]
    fn time_window_new_orders_bounds() {
        let window = TimeWindow::new(at(2024, 3, 16, 0, 0), at(2024, 3, 14, 0, 0));
        assert!(window.start <= window.end);
        assert_eq!(window.whole_days(), 2);
    }
}
