pub mod backoff;
pub mod client;
pub mod error;
pub mod headers;
pub mod orchestrator;
pub mod pagination;
pub mod types;

pub use client::ScheduleClient;
pub use error::FetchError;
pub use orchestrator::{run_dates, run_dates_with_client};
pub use pagination::fetch_date;
pub use types::{PageMeta, SchedulePage};
