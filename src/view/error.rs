use crate::order_actor::OrderError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViewError {
    /// Opening an order view failed (unknown order, order actor gone).
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("View communication error: {0}")]
    ActorCommunication(String),
}
