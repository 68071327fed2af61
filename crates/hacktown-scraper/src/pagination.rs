//! Per-date pagination coordinator.
//!
//! Page 1 is fetched first because its metadata is the only source of the
//! total page count; guessing is not attempted. Remaining pages run
//! concurrently against the run-wide limiter, so the global in-flight cap
//! holds across dates, not just within one.

use std::sync::Arc;

use futures::future;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use hacktown_core::{DateOutcome, LocationClassifier};

use crate::client::ScheduleClient;

/// Fetches, normalizes, and reassembles all pages for one date.
///
/// Success means "page 1 succeeded": later pages that exhaust their retries
/// are logged as gaps and contribute zero records, but the date outcome is
/// still successful. A failed page 1 fails the date immediately and no
/// further pages are requested.
///
/// Records are returned in ascending page order regardless of the order in
/// which page fetches complete.
pub async fn fetch_date(
    client: &ScheduleClient,
    classifier: &LocationClassifier,
    date: &str,
    limiter: Arc<Semaphore>,
) -> DateOutcome {
    let first = {
        let _permit = acquire(&limiter).await;
        tracing::info!(date, "fetching page 1 to discover pagination");
        client.fetch_page(date, 1).await
    };

    let Some(first) = first else {
        tracing::error!(date, "first page failed after all retries — skipping date");
        return DateOutcome {
            date: date.to_owned(),
            succeeded: false,
            events: Vec::new(),
        };
    };

    let last_page = first.last_page();
    let mut events: Vec<_> = first
        .data
        .into_iter()
        .map(|e| classifier.normalize(e))
        .collect();
    tracing::info!(date, last_page, page_events = events.len(), "page 1 complete");

    if last_page > 1 {
        // Each task takes its page number as an owned argument; nothing is
        // captured from mutable loop state.
        let fetches = (2..=last_page).map(|page| {
            let limiter = Arc::clone(&limiter);
            async move {
                let _permit = acquire(&limiter).await;
                (page, client.fetch_page(date, page).await)
            }
        });

        // join_all preserves input order, which is ascending page order, so
        // reassembly is position-stable no matter when each page lands.
        let results = future::join_all(fetches).await;

        for (page, result) in results {
            match result {
                Some(page_data) => {
                    events.extend(page_data.data.into_iter().map(|e| classifier.normalize(e)));
                }
                None => {
                    tracing::warn!(date, page, "page missing after retries — gap in results");
                }
            }
        }
    }

    tracing::info!(date, total_events = events.len(), "date complete");
    DateOutcome {
        date: date.to_owned(),
        succeeded: true,
        events,
    }
}

/// Acquires one slot of the run-wide limiter. The permit is held across the
/// whole fetch and released on drop, so a failed fetch still frees its slot.
async fn acquire(limiter: &Arc<Semaphore>) -> OwnedSemaphorePermit {
    // The run-scoped semaphore is never closed; acquire can only fail after
    // an explicit close.
    Arc::clone(limiter)
        .acquire_owned()
        .await
        .unwrap_or_else(|_| panic!("concurrency limiter closed unexpectedly"))
}
