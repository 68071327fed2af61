//! Environment-adaptive run profile.
//!
//! The collector runs with two very different postures: a conservative one for
//! CI/automated environments where aggressive traffic triggers anti-bot
//! defenses, and a faster one for local development. The profile is selected
//! exactly once at startup and is immutable for the lifetime of the run.

/// Fixed configuration bundle for one collection run.
///
/// Selected via [`RunConfig::for_environment`] and never mutated afterwards.
/// The connection-pool fields shape the HTTP client; everything else drives
/// the fetcher's retry/backoff machinery and the global concurrency limiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Global cap on in-flight page fetches across the whole run.
    pub max_concurrent_requests: usize,
    /// Base delay in seconds for retry backoff schedules.
    pub retry_delay_secs: u64,
    /// Total attempts per page before the page is reported as unavailable.
    pub max_retries: u32,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Total connection-pool size.
    pub pool_limit: usize,
    /// Connections kept per remote host.
    pub pool_limit_per_host: usize,
    /// Whether the constrained (CI/automated) profile is active.
    pub constrained: bool,
}

impl RunConfig {
    /// Returns the configuration bundle for the given environment.
    ///
    /// The constrained profile trades throughput for stealth: one request at
    /// a time, long pauses, fewer retries, a single connection per host.
    #[must_use]
    pub fn for_environment(constrained: bool) -> Self {
        if constrained {
            Self {
                max_concurrent_requests: 1,
                retry_delay_secs: 20,
                max_retries: 3,
                request_timeout_secs: 60,
                pool_limit: 3,
                pool_limit_per_host: 1,
                constrained: true,
            }
        } else {
            Self {
                max_concurrent_requests: 2,
                retry_delay_secs: 5,
                max_retries: 5,
                request_timeout_secs: 30,
                pool_limit: 20,
                pool_limit_per_host: 10,
                constrained: false,
            }
        }
    }
}

/// Returns `true` when the process appears to run in a CI/automated
/// environment (`CI` or `GITHUB_ACTIONS` set to `"true"`, case-insensitive).
#[must_use]
pub fn detect_constrained_environment() -> bool {
    is_constrained(|key| std::env::var(key))
}

/// Core detection logic, decoupled from the process environment so it can be
/// tested with a plain map lookup.
fn is_constrained<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    ["CI", "GITHUB_ACTIONS"]
        .into_iter()
        .any(|var| lookup(var).is_ok_and(|v| v.eq_ignore_ascii_case("true")))
}
