use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("malformed embedded table: {0}")]
    Json(#[from] serde_json::Error),
}
