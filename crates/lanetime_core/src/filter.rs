//! Tag and text filtering over event collections.
//!
//! # Invariants
//! - An empty filter matches every event.
//! - Tag matching is exact; text matching is case-insensitive substring.

use crate::model::event::TimelineEvent;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Events match when they carry any selected tag.
    pub selected_tags: Vec<String>,
    /// Matched against title and description.
    pub search_term: String,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Selects `tag`, or deselects it when already selected.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(index) = self.selected_tags.iter().position(|selected| selected == tag) {
            self.selected_tags.remove(index);
        } else {
            self.selected_tags.push(tag.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected_tags.is_empty() && self.search_term.is_empty()
    }

    pub fn matches(&self, event: &TimelineEvent) -> bool {
        self.matches_tags(event) && self.matches_search(event)
    }

    /// Returns matching events in input order.
    pub fn apply(&self, events: &[TimelineEvent]) -> Vec<TimelineEvent> {
        events
            .iter()
            .filter(|event| self.matches(event))
            .cloned()
            .collect()
    }

    fn matches_tags(&self, event: &TimelineEvent) -> bool {
        self.selected_tags.is_empty()
            || event
                .tags
                .iter()
                .any(|tag| self.selected_tags.contains(tag))
    }

    fn matches_search(&self, event: &TimelineEvent) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        event.title.to_lowercase().contains(&needle)
            || event
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }
}

/// Every tag used in `events`, sorted and deduplicated.
pub fn all_tags(events: &[TimelineEvent]) -> Vec<String> {
    events
        .iter()
        .flat_map(|event| event.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Events touching calendar `day`: starting on it, ending on it, or spanning it.
pub fn events_on_day(events: &[TimelineEvent], day: NaiveDate) -> Vec<&TimelineEvent> {
    events
        .iter()
        .filter(|event| event.start.date() <= day && day <= event.end.date())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample() -> Vec<TimelineEvent> {
        let mut deploy = TimelineEvent::with_id("1", "Deploy API", "Ops", at(14, 9), at(14, 10));
        deploy.tags = vec!["release".to_string(), "api".to_string()];
        let mut review = TimelineEvent::with_id("2", "Design review", "Team", at(15, 9), at(16, 10));
        review.description = Some("Walk through the API changes".to_string());
        review.tags = vec!["meeting".to_string()];
        vec![deploy, review]
    }

    #[test]
    fn empty_filter_matches_all() {
        let events = sample();
        assert_eq!(EventFilter::new().apply(&events).len(), 2);
    }

    #[test]
    fn tags_match_any_selected() {
        let events = sample();
        let mut filter = EventFilter::new();
        filter.toggle_tag("api");
        filter.toggle_tag("meeting");
        assert_eq!(filter.apply(&events).len(), 2);

        filter.toggle_tag("meeting");
        let matched = filter.apply(&events);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "1");
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let events = sample();
        let matched = EventFilter::new().with_search("api").apply(&events);
        assert_eq!(matched.len(), 2);

        let matched = EventFilter::new().with_search("REVIEW").apply(&events);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn all_tags_sorted_unique() {
        let events = sample();
        assert_eq!(all_tags(&events), vec!["api", "meeting", "release"]);
    }

    #[test]
    fn events_on_day_includes_spanning_events() {
        let events = sample();
        let on_day = |d| {
            events_on_day(&events, NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
                .iter()
                .map(|event| event.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(on_day(14), vec!["1"]);
        assert_eq!(on_day(16), vec!["2"]);
        assert!(on_day(17).is_empty());
    }
}
