use thiserror::Error;

/// Errors reported by the record store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store rejected the write: {0}")]
    Rejected(String),

    #[error("Malformed row: {0}")]
    Malformed(String),
}
