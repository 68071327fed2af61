//! Retry and pacing policy for the page fetcher.
//!
//! Every failed attempt flows through the same small state machine: classify
//! the failure, decide whether attempts remain, compute a delay from the
//! active profile. Keeping the policy here, away from the HTTP plumbing,
//! makes each schedule independently testable.
//!
//! The two profiles differ sharply. The constrained profile assumes the run
//! is under automated scrutiny: wide pre-request jitter, long flat-with-jitter
//! waits on 403 capped at 120 s, and retries even on ambiguous 4xx responses
//! because they are likely soft blocks. The unconstrained profile uses
//! exponential backoff clamped to 5..=30 s for 403 and treats other client
//! errors as request-shape bugs not worth retrying.

use std::time::Duration;

use hacktown_core::RunConfig;

use crate::error::FetchError;

/// Failure classes with distinct backoff treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP 403, the API's rate-limit response.
    RateLimited,
    /// Any other 4xx status.
    ClientError,
    /// 5xx and other unexpected statuses.
    ServerError,
    /// Request timed out.
    Timeout,
    /// Connection-level or body-parse failure.
    Transport,
}

/// What the fetcher should do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

pub fn classify(err: &FetchError) -> FailureClass {
    match err {
        FetchError::RateLimited { .. } => FailureClass::RateLimited,
        FetchError::UnexpectedStatus { status, .. } if (400..500).contains(status) => {
            FailureClass::ClientError
        }
        FetchError::UnexpectedStatus { .. } => FailureClass::ServerError,
        FetchError::Http(e) if e.is_timeout() => FailureClass::Timeout,
        FetchError::Http(_) | FetchError::Deserialize { .. } => FailureClass::Transport,
    }
}

/// Decides the next step after a failed attempt.
///
/// `attempt` is zero-based: the first failed attempt passes 0. The attempt
/// index feeds the rate-limit schedules, which grow with each retry.
#[must_use]
pub fn decide(
    config: &RunConfig,
    class: FailureClass,
    attempt: u32,
    attempts_remaining: bool,
) -> RetryDecision {
    if !attempts_remaining {
        return RetryDecision::GiveUp;
    }
    match class {
        FailureClass::RateLimited => RetryDecision::RetryAfter(rate_limit_delay(config, attempt)),
        // Under scrutiny an unknown 4xx is more likely a soft block than a
        // request-shape bug; wait it out.
        FailureClass::ClientError if config.constrained => {
            RetryDecision::RetryAfter(uniform(15.0, 30.0))
        }
        FailureClass::ClientError | FailureClass::ServerError => RetryDecision::GiveUp,
        FailureClass::Timeout | FailureClass::Transport => {
            let factor = if config.constrained { 2 } else { 1 };
            RetryDecision::RetryAfter(Duration::from_secs(config.retry_delay_secs * factor))
        }
    }
}

/// Backoff after a 403.
///
/// Constrained: `30 + 30·attempt + U(0,30)` seconds, capped at 120.
/// Unconstrained: `retry_delay · 2^attempt + U(0,5)`, clamped to 5..=30.
fn rate_limit_delay(config: &RunConfig, attempt: u32) -> Duration {
    let secs = if config.constrained {
        let base = 30.0 + 30.0 * f64::from(attempt) + rand::random::<f64>() * 30.0;
        base.min(120.0)
    } else {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
        let exponential = config.retry_delay_secs as f64 * 2f64.powi(attempt.min(30) as i32);
        (exponential + rand::random::<f64>() * 5.0).clamp(5.0, 30.0)
    };
    Duration::from_secs_f64(secs)
}

/// Randomized pause before every request, to avoid correlated bursts across
/// concurrent fetchers and to mimic human pacing.
///
/// Constrained: `U(5,12)` seconds, plus `U(10,20)` more on retries.
/// Unconstrained: `U(0.5,1.5)` seconds.
#[must_use]
pub fn pre_request_jitter(config: &RunConfig, attempt: u32) -> Duration {
    let secs = if config.constrained {
        let mut base = uniform_secs(5.0, 12.0);
        if attempt > 0 {
            base += uniform_secs(10.0, 20.0);
        }
        base
    } else {
        uniform_secs(0.5, 1.5)
    };
    Duration::from_secs_f64(secs)
}

/// A duration drawn uniformly from `lo..hi` seconds.
pub(crate) fn uniform(lo: f64, hi: f64) -> Duration {
    Duration::from_secs_f64(uniform_secs(lo, hi))
}

fn uniform_secs(lo: f64, hi: f64) -> f64 {
    lo + rand::random::<f64>() * (hi - lo)
}
