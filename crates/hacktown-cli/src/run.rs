//! End-to-end collection workflow: select profile, orchestrate, persist,
//! summarize, and decide the process exit.

use std::time::Instant;

use chrono::Utc;

use hacktown_core::{
    build_summary, detect_constrained_environment, LocationClassifier, RunConfig,
};
use hacktown_scraper::run_dates;

use crate::persist;
use crate::Cli;

pub(crate) async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let constrained = if cli.constrained {
        true
    } else if cli.no_constrained {
        false
    } else {
        detect_constrained_environment()
    };
    let config = RunConfig::for_environment(constrained);
    tracing::info!(
        constrained,
        max_concurrent = config.max_concurrent_requests,
        max_retries = config.max_retries,
        timeout_secs = config.request_timeout_secs,
        "selected run profile"
    );

    let dates: Vec<String> = if cli.dates.is_empty() {
        crate::EVENT_DATES.iter().map(ToString::to_string).collect()
    } else {
        cli.dates.clone()
    };
    tracing::info!(dates = ?dates, output_dir = %cli.output_dir.display(), "starting collection");

    // The prior summary seeds the rollback path: a fully-failed run must not
    // erase the last successful totals.
    let prior = persist::load_summary(&cli.output_dir);
    match &prior {
        Some(s) => tracing::info!(
            total_events = s.total_events,
            consecutive_failures = s.consecutive_failures,
            "loaded summary from previous run"
        ),
        None => tracing::info!("no prior summary found — treating as first run"),
    }

    let classifier = LocationClassifier::new();
    let started = Instant::now();
    let outcomes = run_dates(&config, &classifier, &dates).await?;
    let elapsed = started.elapsed();

    let mut files_created = Vec::new();
    for outcome in &outcomes {
        if outcome.succeeded {
            let file =
                persist::write_date_file(&cli.output_dir, &outcome.date, &outcome.events, Utc::now())?;
            files_created.push(file);
        }
    }

    let successful_now = outcomes.iter().filter(|o| o.succeeded).count();
    let events_now: usize = outcomes
        .iter()
        .filter(|o| o.succeeded)
        .map(|o| o.events.len())
        .sum();

    let summary = build_summary(
        &outcomes,
        prior.as_ref(),
        files_created,
        elapsed,
        classifier.cache_len(),
        Utc::now(),
    );
    persist::write_summary(&cli.output_dir, &summary)?;

    tracing::info!(
        successful_dates = successful_now,
        total_dates = outcomes.len(),
        total_events = events_now,
        elapsed_secs = elapsed.as_secs_f64(),
        unique_locations = classifier.cache_len(),
        "collection run finished"
    );

    if successful_now == 0 {
        // Summary is already on disk with the prior totals preserved; the
        // non-zero exit is the operator-facing failure signal.
        anyhow::bail!(
            "all {} dates failed; prior summary data preserved",
            outcomes.len()
        );
    }
    Ok(())
}
