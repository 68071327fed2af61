//! On-disk JSON sinks: per-date event artifacts and the run summary.
//!
//! All writes go through a temp-file-and-rename so an interrupted run never
//! leaves a torn artifact; whatever was fully written before the
//! interruption stays valid.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::json;

use hacktown_core::{NormalizedEvent, RunSummary};

const SUMMARY_FILE: &str = "summary.json";

pub(crate) fn date_file_name(date: &str) -> String {
    format!("hacktown_events_{date}.json")
}

/// Writes one date's artifact and returns its file name.
pub(crate) fn write_date_file(
    dir: &Path,
    date: &str,
    events: &[NormalizedEvent],
    now: DateTime<Utc>,
) -> anyhow::Result<String> {
    fs::create_dir_all(dir)?;
    let name = date_file_name(date);
    let body = json!({
        "date": date,
        "total_events": events.len(),
        "scraped_at": now.to_rfc3339(),
        "events": events,
    });
    write_atomic(&dir.join(&name), &serde_json::to_vec_pretty(&body)?)?;
    tracing::info!(date, events = events.len(), file = %name, "wrote date artifact");
    Ok(name)
}

/// Reads the previous run's summary, if a parsable one exists.
pub(crate) fn load_summary(dir: &Path) -> Option<RunSummary> {
    let path = dir.join(SUMMARY_FILE);
    let raw = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(summary) => Some(summary),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "existing summary is unreadable — starting fresh"
            );
            None
        }
    }
}

pub(crate) fn write_summary(dir: &Path, summary: &RunSummary) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    write_atomic(
        &dir.join(SUMMARY_FILE),
        &serde_json::to_vec_pretty(summary)?,
    )?;
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
