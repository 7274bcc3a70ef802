use thiserror::Error;

/// Errors from the internet-provider lookup. These never reach the
/// caller directly — [`crate::InternetClient::lookup`] logs them and
/// degrades to `None`, mirroring the rest of the engine's suspension
/// points. Deliberately does not carry the connection string: it may
/// embed credentials and ends up in logs via `{e}`.
#[derive(Debug, Error)]
pub enum InternetError {
    #[error("failed to build connection pool: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}
