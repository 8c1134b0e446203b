//! LoadRunner test-run export adapter.
//!
//! # Responsibility
//! - Decode LoadRunner run records and map them onto `TimelineEvent`s in the
//!   `Performance Test` lane.
//!
//! # Invariants
//! - Begin/end times are epoch-millisecond strings interpreted as UTC.
//! - Every produced event passes `TimelineEvent::validate`.

use crate::model::event::{Sentiment, TimelineEvent};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const LOAD_RUNNER_LANE: &str = "Performance Test";
const LOAD_RUNNER_TAG: &str = "loadrunner";

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug)]
pub enum ImportError {
    InvalidTimestamp {
        run_id: i64,
        field: &'static str,
        value: String,
    },
    Parse(serde_json::Error),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimestamp {
                run_id,
                field,
                value,
            } => write!(
                f,
                "run {run_id}: `{field}` is not an epoch-millisecond timestamp: {value:?}"
            ),
            Self::Parse(err) => write!(f, "invalid LoadRunner export: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTimestamp { .. } => None,
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// One run as exported by LoadRunner Enterprise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRunnerTest {
    pub run_id: i64,
    pub name: String,
    #[serde(default)]
    pub ui_status: String,
    #[serde(default)]
    pub trigger_start_time: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub test_run_user: String,
    #[serde(default)]
    pub create_by: String,
    pub loadtestbegintime: String,
    pub loadtestendtime: String,
    #[serde(default)]
    pub api_vusers_num: i64,
    #[serde(default)]
    pub total_count: String,
}

impl LoadRunnerTest {
    fn description(&self) -> String {
        format!(
            "Run by: {}\nCreated by: {}\nVirtual Users: {}\nTotal Count: {}",
            self.test_run_user, self.create_by, self.api_vusers_num, self.total_count
        )
    }

    fn to_event(&self) -> ImportResult<TimelineEvent> {
        let begin = parse_epoch_ms(self.run_id, "loadtestbegintime", &self.loadtestbegintime)?;
        let end = parse_epoch_ms(self.run_id, "loadtestendtime", &self.loadtestendtime)?;
        let (start, end) = if end < begin {
            warn!(
                "event=loadrunner_import module=import status=swapped run_id={}",
                self.run_id
            );
            (end, begin)
        } else {
            (begin, end)
        };

        let mut event =
            TimelineEvent::new(self.name.replace('_', " "), LOAD_RUNNER_LANE, start, end);
        event.description = Some(self.description());
        event.sentiment = Sentiment::Neutral;
        event.tags = vec![
            LOAD_RUNNER_TAG.to_string(),
            format!("vusers-{}", self.api_vusers_num),
        ];
        Ok(event)
    }
}

/// Converts runs in input order. Fails on the first bad timestamp.
pub fn convert_load_runner_tests(tests: &[LoadRunnerTest]) -> ImportResult<Vec<TimelineEvent>> {
    let events = tests
        .iter()
        .map(LoadRunnerTest::to_event)
        .collect::<ImportResult<Vec<_>>>()?;
    info!(
        "event=loadrunner_import module=import status=ok count={}",
        events.len()
    );
    Ok(events)
}

/// Decodes a JSON array of runs and converts it.
pub fn parse_load_runner_json(json: &str) -> ImportResult<Vec<TimelineEvent>> {
    let tests: Vec<LoadRunnerTest> = serde_json::from_str(json)?;
    convert_load_runner_tests(&tests)
}

fn parse_epoch_ms(run_id: i64, field: &'static str, value: &str) -> ImportResult<NaiveDateTime> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|instant| instant.naive_utc())
        .ok_or_else(|| ImportError::InvalidTimestamp {
            run_id,
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn run(begin: &str, end: &str) -> LoadRunnerTest {
        LoadRunnerTest {
            run_id: 42,
            name: "checkout_peak_load".to_string(),
            ui_status: "Finished".to_string(),
            trigger_start_time: String::new(),
            duration: "3600".to_string(),
            test_run_user: "alice".to_string(),
            create_by: "bob".to_string(),
            loadtestbegintime: begin.to_string(),
            loadtestendtime: end.to_string(),
            api_vusers_num: 250,
            total_count: "1200".to_string(),
        }
    }

    #[test]
    fn maps_run_fields_onto_event() {
        let events = convert_load_runner_tests(&[run("1710403200000", "1710406800000")]).unwrap();
        let event = &events[0];

        assert_eq!(event.title, "checkout peak load");
        assert_eq!(event.lane, LOAD_RUNNER_LANE);
        assert_eq!(event.sentiment, Sentiment::Neutral);
        assert_eq!(event.tags, vec!["loadrunner", "vusers-250"]);
        assert!(event.links.is_empty());
        assert_eq!(
            event.description.as_deref(),
            Some("Run by: alice\nCreated by: bob\nVirtual Users: 250\nTotal Count: 1200")
        );
        let expected_start = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(event.start, expected_start);
        assert_eq!(event.duration().num_hours(), 1);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn reversed_times_are_swapped() {
        let events = convert_load_runner_tests(&[run("1710406800000", "1710403200000")]).unwrap();
        assert!(events[0].start < events[0].end);
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        let err = convert_load_runner_tests(&[run("yesterday", "1710403200000")]).unwrap_err();
        match err {
            ImportError::InvalidTimestamp { run_id, field, .. } => {
                assert_eq!(run_id, 42);
                assert_eq!(field, "loadtestbegintime");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parses_json_export() {
        let json = r#"[{
            "run_id": 7,
            "name": "smoke_test",
            "ui_status": "Finished",
            "trigger_start_time": "",
            "duration": "60",
            "test_run_user": "ci",
            "create_by": "ci",
            "loadtestbegintime": "1710403200000",
            "loadtestendtime": "1710403260000",
            "api_vusers_num": 5,
            "total_count": "10"
        }]"#;
        let events = parse_load_runner_json(json).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "smoke test");
        assert_eq!(events[0].tags[1], "vusers-5");
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            parse_load_runner_json("{not json"),
            Err(ImportError::Parse(_))
        ));
    }
}
