//! Randomized browser-shaped request headers.
//!
//! The schedule API fronts an anti-automation layer that blocks requests with
//! a bare client fingerprint. Every attempt gets a freshly sampled header set
//! so repeated blocks against one page do not all share a single fingerprint.

use reqwest::header::{self, HeaderMap, HeaderValue};

/// Origin of the public event portal; sent as `Origin`/`Referer` so API
/// requests look like they came from the web app.
pub(crate) const PORTAL_ORIGIN: &str = "https://hacktown2025.yazo.app.br";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/121.0",
];

/// Pool of simulated client fingerprints, owned by the page fetcher and
/// sampled once per attempt.
pub struct HeaderPool {
    user_agents: &'static [&'static str],
}

impl HeaderPool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_agents: USER_AGENTS,
        }
    }

    /// Builds one full header set with a randomly chosen user agent.
    #[must_use]
    pub fn sample(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,pt;q=0.8"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::ORIGIN, HeaderValue::from_static(PORTAL_ORIGIN));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert("product-identifier", HeaderValue::from_static("1"));
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://hacktown2025.yazo.app.br/"),
        );
        headers.insert(
            "sec-ch-ua",
            HeaderValue::from_static(
                "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\"",
            ),
        );
        headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
        headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Linux\""));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("cross-site"));
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(pick(self.user_agents)),
        );
        headers.insert(
            "x-requested-with",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers
    }
}

impl Default for HeaderPool {
    fn default() -> Self {
        Self::new()
    }
}

fn pick(items: &'static [&'static str]) -> &'static str {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let idx = (rand::random::<f64>() * items.len() as f64) as usize;
    items[idx.min(items.len() - 1)]
}
