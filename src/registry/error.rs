use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// The location store failed; the previous snapshot is still served.
    #[error("Driver refresh failed: {0}")]
    Store(#[from] StoreError),

    #[error("Registry is shutting down")]
    ShuttingDown,

    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}
