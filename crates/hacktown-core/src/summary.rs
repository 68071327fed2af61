//! Run summary model with rollback-on-total-failure semantics.
//!
//! The summary is the one artifact downstream consumers read to learn the
//! state of the data set. A run where every date failed must not erase the
//! evidence of the last successful run: all "last known good" fields carry
//! over verbatim and only the failure bookkeeping advances.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DateOutcome;

/// Persisted run-level summary, written after every run (successful or not)
/// and read back at the start of the next one.
///
/// All fields carry serde defaults so summaries written by older versions
/// still parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Completion time of the last *successful* run.
    #[serde(default)]
    pub scraping_completed: Option<DateTime<Utc>>,
    /// Event total of the last successful run.
    #[serde(default)]
    pub total_events: u64,
    /// Successful-date count of the last successful run.
    #[serde(default)]
    pub successful_dates: u32,
    /// Dates that failed in this run.
    #[serde(default)]
    pub failed_dates: Vec<String>,
    /// All dates this run attempted.
    #[serde(default)]
    pub dates_processed: Vec<String>,
    /// Artifact files produced by the last successful run.
    #[serde(default)]
    pub files_created: Vec<String>,
    /// Wall-clock duration of this run, in seconds.
    #[serde(default)]
    pub scraping_time_seconds: f64,
    /// Throughput of this run; absent for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_per_second: Option<f64>,
    /// Timestamp of the most recent fully-failed run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failed_attempt: Option<DateTime<Utc>>,
    /// Number of fully-failed runs since the last successful one.
    #[serde(default)]
    pub consecutive_failures: u32,
    /// Distinct venue strings classified during this run.
    #[serde(default)]
    pub location_cache_size: usize,
}

/// Builds the summary for a finished run.
///
/// With at least one successful date the summary is rebuilt from this run's
/// outcomes alone and the failure counter resets. With zero successful dates
/// the last-known-good fields (`scraping_completed`, `total_events`,
/// `successful_dates`, `files_created`, `location_cache_size`) are copied
/// verbatim from `prior`,
/// `last_failed_attempt` is stamped with `now`, and `consecutive_failures`
/// increments by exactly one.
#[must_use]
pub fn build_summary(
    outcomes: &[DateOutcome],
    prior: Option<&RunSummary>,
    files_created: Vec<String>,
    elapsed: Duration,
    location_cache_size: usize,
    now: DateTime<Utc>,
) -> RunSummary {
    let elapsed_secs = elapsed.as_secs_f64();
    let dates_processed: Vec<String> = outcomes.iter().map(|o| o.date.clone()).collect();
    let failed_dates: Vec<String> = outcomes
        .iter()
        .filter(|o| !o.succeeded)
        .map(|o| o.date.clone())
        .collect();
    let successful = outcomes.len() - failed_dates.len();

    if successful == 0 {
        return RunSummary {
            scraping_completed: prior.and_then(|p| p.scraping_completed),
            total_events: prior.map_or(0, |p| p.total_events),
            successful_dates: prior.map_or(0, |p| p.successful_dates),
            failed_dates,
            dates_processed,
            files_created: prior.map_or_else(Vec::new, |p| p.files_created.clone()),
            scraping_time_seconds: round2(elapsed_secs),
            events_per_second: None,
            last_failed_attempt: Some(now),
            consecutive_failures: prior.map_or(0, |p| p.consecutive_failures) + 1,
            location_cache_size: prior.map_or(0, |p| p.location_cache_size),
        };
    }

    let total_events: u64 = outcomes
        .iter()
        .filter(|o| o.succeeded)
        .map(|o| o.events.len() as u64)
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let events_per_second = if elapsed_secs > 0.0 {
        Some(round2(total_events as f64 / elapsed_secs))
    } else {
        None
    };

    RunSummary {
        scraping_completed: Some(now),
        total_events,
        successful_dates: u32::try_from(successful).unwrap_or(u32::MAX),
        failed_dates,
        dates_processed,
        files_created,
        scraping_time_seconds: round2(elapsed_secs),
        events_per_second,
        last_failed_attempt: None,
        consecutive_failures: 0,
        location_cache_size,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
