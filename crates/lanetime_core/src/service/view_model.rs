//! Renderer-ready timeline projection.
//!
//! Composes window resolution, axis labels, layout and placement into one
//! owned value a view can draw without further computation.

use crate::config::ViewConfig;
use crate::model::event::{EventId, Sentiment, TimelineEvent};
use crate::timeline::labels::{generate_axis_labels, AxisLabel};
use crate::timeline::layout::{lane_order, layout_events_with, max_stack_depth};
use crate::timeline::placement::{label_offset_percent, place_event, HorizontalPlacement};
use crate::timeline::window::{resolve_time_window_with, RangeSelector, TimeWindow};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Axis tick with its horizontal offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedLabel {
    #[serde(flatten)]
    pub label: AxisLabel,
    pub text: String,
    pub date_caption: Option<String>,
    pub offset_percent: f64,
}

/// One lane row and the stack depth it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneRow {
    pub lane: String,
    pub stack_depth: usize,
}

/// One event bar with full geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBar {
    pub id: EventId,
    pub title: String,
    pub lane: String,
    pub sentiment: Sentiment,
    pub vertical_slot: usize,
    pub cluster_size: usize,
    #[serde(flatten)]
    pub placement: HorizontalPlacement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineViewModel {
    pub focus: NaiveDateTime,
    pub range: RangeSelector,
    pub window: TimeWindow,
    pub labels: Vec<PositionedLabel>,
    pub lanes: Vec<LaneRow>,
    pub bars: Vec<EventBar>,
}

/// Builds the projection for `events` around `focus`.
///
/// Labels are generated over the labeling window so a 1-day view gets a full
/// day of hourly ticks.
pub fn build_view_model(
    events: &[TimelineEvent],
    focus: NaiveDateTime,
    range: RangeSelector,
    config: &ViewConfig,
) -> TimelineViewModel {
    let window = resolve_time_window_with(focus, range, config.week_start);
    let axis_window = window.labeling_window();

    let labels = generate_axis_labels(&axis_window)
        .into_iter()
        .map(|label| PositionedLabel {
            text: label.text(),
            date_caption: label.date_caption(),
            offset_percent: label_offset_percent(label.instant, &axis_window),
            label,
        })
        .collect();

    let laid_out = layout_events_with(events, &window, config.layout_strategy);
    let lanes = lane_order(events)
        .into_iter()
        .map(|lane| LaneRow {
            lane: lane.to_string(),
            stack_depth: max_stack_depth(&laid_out, lane),
        })
        .collect();

    let bars = laid_out
        .iter()
        .map(|item| EventBar {
            id: item.event.id.clone(),
            title: item.event.title.clone(),
            lane: item.event.lane.clone(),
            sentiment: item.event.sentiment,
            vertical_slot: item.vertical_slot,
            cluster_size: item.cluster_size,
            placement: place_event(item.event, &axis_window, config.min_event_width_percent),
        })
        .collect();

    TimelineViewModel {
        focus,
        range,
        window,
        labels,
        lanes,
        bars,
    }
}
