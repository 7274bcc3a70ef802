use thiserror::Error;

/// Errors from loading the resolution engine at startup.
///
/// Per-request failures (geocode miss, no provider found) are not errors:
/// they degrade to `None` fields on [`utility_lookup_models::LookupResult`].
/// This type only covers the one-time construction of shared state.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("database error: {0}")]
    Database(#[from] utility_lookup_database::DbError),

    #[error("canonical provider table error: {0}")]
    Normalize(#[from] utility_lookup_normalizer::NormalizeError),

    #[error("spatial index error: {0}")]
    Spatial(String),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
