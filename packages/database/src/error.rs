use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognized table name: {0}")]
    InvalidTable(String),
}
