use thiserror::Error;

/// Errors from loading and indexing the canonical provider table.
///
/// Normalization itself (`normalize`, `normalize_multi`, `providers_match`)
/// never fails — it degrades to a passthrough match. This error type only
/// covers the one-time load of the canonical provider table at startup.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed canonical provider table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("alias {alias:?} appears under both {first:?} and {second:?}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },
}
