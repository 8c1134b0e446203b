//! Command-line entry point over `lanetime_core`.
//!
//! # Responsibility
//! - Expose window resolution, axis labels, layout and LoadRunner import as
//!   subcommands printing JSON to stdout.
//! - Keep diagnostics on stderr so stdout stays machine-readable.

use chrono::{Local, NaiveDateTime, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use lanetime_core::config::DEFAULT_CONFIG_FILE;
use lanetime_core::db::open_db;
use lanetime_core::timeline::window::{default_focus, navigation_step};
use lanetime_core::{
    build_view_model, generate_axis_labels, init_stderr_logging, navigate, parse_load_runner_json,
    resolve_time_window_with, EventFilter, EventService, LayoutStrategy, NavigationDirection,
    RangeSelector, SqliteEventRepository, TimelineEvent, ViewConfig,
};
use log::{debug, info};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "lanetime")]
#[command(about = "Time-window resolution and lane layout for timeline events", version)]
struct Args {
    /// JSON view config; `lanetime.json` in the working directory when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Overrides the configured first day of the week
    #[arg(long, global = true)]
    week_start: Option<Weekday>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the visible window around a focus instant
    Window {
        #[command(flatten)]
        view: ViewArgs,
        /// Step the focus one window back or forward before resolving
        #[arg(long, value_enum)]
        step: Option<StepArg>,
    },
    /// Generate axis labels for the resolved window
    Labels {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Lay out events from a JSON file and print the full timeline view
    Layout {
        /// JSON array of events
        #[arg(long)]
        events: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Keep events carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Keep events whose title or description contains this text
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Convert a LoadRunner run export into events
    ImportLoadrunner {
        /// JSON array of LoadRunner runs
        file: PathBuf,
        /// Replace the event collection stored in this SQLite file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// Focus instant, e.g. 2024-03-15T14:30:00
    #[arg(long)]
    focus: Option<NaiveDateTime>,
    /// 1day, 3days, 1week, 2weeks or 1month
    #[arg(long)]
    range: Option<RangeSelector>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StepArg {
    Previous,
    Next,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Chained,
    Packed,
}

impl From<StrategyArg> for LayoutStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Chained => Self::ChainedClusters,
            StrategyArg::Packed => Self::PackedRows,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowOutput {
    focus: NaiveDateTime,
    range: RangeSelector,
    start: NaiveDateTime,
    end: NaiveDateTime,
    navigation_step_days: i64,
}

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> CliResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.log_level = Some(level);
    }
    if let Some(week_start) = args.week_start {
        config.week_start = week_start;
    }
    config.validate()?;
    init_stderr_logging(config.effective_log_level())?;
    debug!("event=cli_start module=cli status=ok");

    match args.command {
        Command::Window { view, step } => {
            let range = view.range.unwrap_or(config.default_range);
            let mut focus = view.focus.unwrap_or_else(now);
            if let Some(step) = step {
                let direction = match step {
                    StepArg::Previous => NavigationDirection::Previous,
                    StepArg::Next => NavigationDirection::Next,
                };
                focus = navigate(focus, range, config.week_start, direction);
            }
            let window = resolve_time_window_with(focus, range, config.week_start);
            print_json(&WindowOutput {
                focus,
                range,
                start: window.start,
                end: window.end,
                navigation_step_days: navigation_step(&window),
            })
        }
        Command::Labels { view } => {
            let range = view.range.unwrap_or(config.default_range);
            let focus = view.focus.unwrap_or_else(now);
            let window = resolve_time_window_with(focus, range, config.week_start);
            print_json(&generate_axis_labels(&window.labeling_window()))
        }
        Command::Layout {
            events,
            view,
            strategy,
            tags,
            search,
        } => {
            let events: Vec<TimelineEvent> =
                serde_json::from_str(&std::fs::read_to_string(&events)?)?;
            if let Some(strategy) = strategy {
                config.layout_strategy = strategy.into();
            }
            let filter = EventFilter {
                selected_tags: tags,
                search_term: search,
            };
            let events = filter.apply(&events);
            let range = view.range.unwrap_or(config.default_range);
            let focus = view
                .focus
                .unwrap_or_else(|| default_focus(&events, now()));
            print_json(&build_view_model(&events, focus, range, &config))
        }
        Command::ImportLoadrunner { file, db } => {
            let events = parse_load_runner_json(&std::fs::read_to_string(&file)?)?;
            if let Some(db) = db {
                let conn = open_db(&db)?;
                let mut service = EventService::new(SqliteEventRepository::try_new(&conn)?);
                service.import_events(events.clone())?;
                info!(
                    "event=cli_import module=cli status=ok count={}",
                    events.len()
                );
            }
            print_json(&events)
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<ViewConfig> {
    match path {
        Some(path) => Ok(ViewConfig::from_path(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            Ok(ViewConfig::from_path(DEFAULT_CONFIG_FILE)?)
        }
        None => Ok(ViewConfig::default()),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
