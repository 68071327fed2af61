//! Event record types flowing from the schedule API to the JSON artifacts.
//!
//! The API payload is treated as opaque apart from the `place` field: every
//! other field is carried through verbatim via `#[serde(flatten)]` so the
//! downstream web application sees exactly what the API produced, plus the
//! two derived location fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw event record as returned by the schedule API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Venue string. May be absent or empty; location derivation is total
    /// over both cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,

    /// All remaining fields, preserved untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A [`RawEvent`] enriched with the two derived location fields.
///
/// Field names are camelCase on the wire because that is what the consuming
/// web application expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEvent {
    #[serde(flatten)]
    pub event: RawEvent,

    /// Standardized venue name used for precise filtering.
    #[serde(rename = "filterLocation")]
    pub filter_location: String,

    /// Coarse proximity zone used for "what else is nearby" grouping.
    #[serde(rename = "nearLocation")]
    pub near_location: String,
}

/// Aggregated result for one calendar date's full pagination run.
///
/// An empty `events` list is not a failure signal on its own; callers must
/// consult `succeeded` to tell "zero events happened" apart from "could not
/// fetch".
#[derive(Debug, Clone)]
pub struct DateOutcome {
    pub date: String,
    pub succeeded: bool,
    pub events: Vec<NormalizedEvent>,
}
