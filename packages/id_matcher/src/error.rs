use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdMatcherError {
    #[error("malformed provider catalog row: {0}")]
    Csv(#[from] csv::Error),
}
