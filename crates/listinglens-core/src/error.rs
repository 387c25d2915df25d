use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse failed: {0}")]
    Parse(String),

    #[error("Index operation failed: {0}")]
    Index(String),

    #[error("Invalid query: {0}")]
    Query(String),

    #[error("Listing {0} not found")]
    NotFound(u64),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
