//! Run-level orchestration across all dates.
//!
//! One connection pool and one concurrency limiter are scoped to the run and
//! shared by every date coordinator. All dates run concurrently; a slow or
//! failed date never cancels the others, and outcomes come back in input
//! order.

use std::sync::Arc;

use futures::future;
use tokio::sync::Semaphore;

use hacktown_core::{DateOutcome, LocationClassifier, RunConfig};

use crate::client::ScheduleClient;
use crate::error::FetchError;
use crate::pagination::fetch_date;

/// Runs the full multi-date collection with a fresh client.
///
/// The client (and with it the connection pool) lives exactly as long as
/// this call, on every exit path.
///
/// # Errors
///
/// Returns [`FetchError::Http`] only if the HTTP client cannot be built;
/// fetch failures are absorbed into per-date outcomes.
pub async fn run_dates(
    config: &RunConfig,
    classifier: &LocationClassifier,
    dates: &[String],
) -> Result<Vec<DateOutcome>, FetchError> {
    let client = ScheduleClient::new(config.clone())?;
    Ok(run_dates_with_client(&client, classifier, dates).await)
}

/// Runs the full multi-date collection against an existing client.
///
/// The limiter is global: at most `max_concurrent_requests` page fetches are
/// in flight at any instant across all dates combined.
pub async fn run_dates_with_client(
    client: &ScheduleClient,
    classifier: &LocationClassifier,
    dates: &[String],
) -> Vec<DateOutcome> {
    let config = client.config();
    let limiter = Arc::new(Semaphore::new(config.max_concurrent_requests));
    tracing::info!(
        dates = dates.len(),
        max_concurrent = config.max_concurrent_requests,
        constrained = config.constrained,
        "starting collection run"
    );

    if config.constrained {
        client.warm_up().await;
    }

    let tasks = dates
        .iter()
        .map(|date| fetch_date(client, classifier, date, Arc::clone(&limiter)));
    let outcomes = future::join_all(tasks).await;

    for outcome in &outcomes {
        tracing::info!(
            date = %outcome.date,
            succeeded = outcome.succeeded,
            events = outcome.events.len(),
            "date outcome"
        );
    }
    outcomes
}
