//! Overlap layout for lane-grouped events.
//!
//! # Responsibility
//! - Partition events by lane, then into greedy overlap clusters.
//! - Assign each event a vertical slot inside its cluster.
//!
//! # Invariants
//! - `vertical_slot < cluster_size` for every laid-out event.
//! - Output is a pure function of the input order and values.
//! - The window never filters events; clipping belongs to the renderer.
//!
//! A cluster is the maximal greedy-connected run under start order: an event
//! joins the open cluster when it overlaps any member, so members need not
//! overlap pairwise.

use super::window::TimeWindow;
use crate::model::event::TimelineEvent;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Slot assignment policy inside a cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    /// Slot is the event's index in the cluster's start order.
    #[default]
    ChainedClusters,
    /// Slot is the earliest row with no overlapping member, so rows are
    /// reused once earlier events end.
    PackedRows,
}

/// Event annotated with its stacking position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaidOutEvent<'a> {
    #[serde(flatten)]
    pub event: &'a TimelineEvent,
    pub vertical_slot: usize,
    pub cluster_size: usize,
}

/// Lays out `events` with the default chained-cluster policy.
pub fn layout_events<'a>(events: &'a [TimelineEvent], window: &TimeWindow) -> Vec<LaidOutEvent<'a>> {
    layout_events_with(events, window, LayoutStrategy::default())
}

/// Lays out `events` with an explicit slot policy.
///
/// Lanes are emitted in first-seen order, clusters in start order.
///
/// # Preconditions
/// - Every event satisfies `start <= end`; behavior is unspecified otherwise.
pub fn layout_events_with<'a>(
    events: &'a [TimelineEvent],
    window: &TimeWindow,
    strategy: LayoutStrategy,
) -> Vec<LaidOutEvent<'a>> {
    let mut laid_out = Vec::with_capacity(events.len());
    let mut cluster_count = 0usize;
    let lanes = partition_by_lane(events);
    let lane_count = lanes.len();

    for mut members in lanes {
        // stable: equal starts keep input order
        members.sort_by_key(|event| event.start);
        for cluster in sweep_clusters(&members) {
            cluster_count += 1;
            let cluster_size = cluster.len();
            let slots = match strategy {
                LayoutStrategy::ChainedClusters => (0..cluster_size).collect(),
                LayoutStrategy::PackedRows => packed_rows(&cluster),
            };
            laid_out.extend(cluster.into_iter().zip(slots).map(|(event, vertical_slot)| {
                LaidOutEvent {
                    event,
                    vertical_slot,
                    cluster_size,
                }
            }));
        }
    }

    trace!(
        "event=layout_events module=timeline status=ok strategy={:?} events={} lanes={} clusters={} window_days={}",
        strategy,
        laid_out.len(),
        lane_count,
        cluster_count,
        window.whole_days()
    );
    laid_out
}

/// Overlap test used by the cluster sweep.
///
/// Non-empty events are half-open `[start, end)`. A zero-duration event is
/// the single instant `start`: it overlaps any half-open interval containing
/// that instant, and another zero-duration event only at the same instant.
pub fn intervals_overlap(a: &TimelineEvent, b: &TimelineEvent) -> bool {
    match (a.is_instant(), b.is_instant()) {
        (false, false) => a.start < b.end && b.start < a.end,
        (true, false) => b.start <= a.start && a.start < b.end,
        (false, true) => a.start <= b.start && b.start < a.end,
        (true, true) => a.start == b.start,
    }
}

/// Distinct lanes in first-seen order.
pub fn lane_order(events: &[TimelineEvent]) -> Vec<&str> {
    let mut lanes: Vec<&str> = Vec::new();
    for event in events {
        if !lanes.contains(&event.lane.as_str()) {
            lanes.push(event.lane.as_str());
        }
    }
    lanes
}

/// Rows needed by `lane`: the largest `vertical_slot + 1` among its events.
///
/// Under `PackedRows` this can be below the largest cluster size.
pub fn max_stack_depth(laid_out: &[LaidOutEvent<'_>], lane: &str) -> usize {
    laid_out
        .iter()
        .filter(|item| item.event.lane == lane)
        .map(|item| item.vertical_slot + 1)
        .max()
        .unwrap_or(0)
}

fn partition_by_lane(events: &[TimelineEvent]) -> Vec<Vec<&TimelineEvent>> {
    let mut index_by_lane: HashMap<&str, usize> = HashMap::new();
    let mut lanes: Vec<Vec<&TimelineEvent>> = Vec::new();
    for event in events {
        let index = *index_by_lane.entry(event.lane.as_str()).or_insert_with(|| {
            lanes.push(Vec::new());
            lanes.len() - 1
        });
        lanes[index].push(event);
    }
    lanes
}

fn sweep_clusters<'a>(sorted: &[&'a TimelineEvent]) -> Vec<Vec<&'a TimelineEvent>> {
    let mut clusters = Vec::new();
    let mut current: Vec<&'a TimelineEvent> = Vec::new();

    for &event in sorted {
        if current.is_empty() || current.iter().any(|member| intervals_overlap(member, event)) {
            current.push(event);
        } else {
            clusters.push(std::mem::replace(&mut current, vec![event]));
        }
    }
    if !current.is_empty() {
        clusters.push(current);
    }
    clusters
}

fn packed_rows(cluster: &[&TimelineEvent]) -> Vec<usize> {
    let mut rows: Vec<Vec<&TimelineEvent>> = Vec::new();
    let mut slots = Vec::with_capacity(cluster.len());

    for &event in cluster {
        let free_row = rows
            .iter()
            .position(|row| row.iter().all(|member| !intervals_overlap(member, event)));
        let slot = match free_row {
            Some(row) => row,
            None => {
                rows.push(Vec::new());
                rows.len() - 1
            }
        };
        rows[slot].push(event);
        slots.push(slot);
    }
    slots
}
