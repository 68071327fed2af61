use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited (403) for {date} page {page}")]
    RateLimited { date: String, page: u32 },

    #[error("unexpected HTTP status {status} for {date} page {page}")]
    UnexpectedStatus { status: u16, date: String, page: u32 },
}
