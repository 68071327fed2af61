//! Schedule API response shapes.
//!
//! The endpoint returns `{ "data": [...], "meta": { "last_page": N, ... } }`.
//! Both keys are optional in practice; a missing `meta` or `last_page` means
//! a single page.

use serde::Deserialize;

use hacktown_core::RawEvent;

/// One page of the paginated `/public/schedules` response.
#[derive(Debug, Deserialize)]
pub struct SchedulePage {
    #[serde(default)]
    pub data: Vec<RawEvent>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl SchedulePage {
    /// Total page count advertised by this page's metadata, defaulting to 1.
    ///
    /// Only meaningful on page 1; later pages repeat it but are never
    /// consulted for it.
    #[must_use]
    pub fn last_page(&self) -> u32 {
        self.meta
            .as_ref()
            .and_then(|m| m.last_page)
            .unwrap_or(1)
            .max(1)
    }
}

/// Pagination metadata object.
#[derive(Debug, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub last_page: Option<u32>,
}
