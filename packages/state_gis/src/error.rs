use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateGisError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("non-2xx response from {url}: status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse ArcGIS response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
