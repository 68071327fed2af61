pub mod events;
pub mod locations;
pub mod profile;
pub mod summary;

pub use events::{DateOutcome, NormalizedEvent, RawEvent};
pub use locations::LocationClassifier;
pub use profile::{detect_constrained_environment, RunConfig};
pub use summary::{build_summary, RunSummary};
