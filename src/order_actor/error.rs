//! Error types for the Order actor.

use crate::model::{OrderId, OrderStatus};
use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order is not tracked.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The transition is not in the lifecycle table for this order type.
    #[error("Order {order_id}: cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// A driver cannot be assigned to this order in its current state.
    #[error("Order {order_id}: {reason}")]
    InvalidAssignment { order_id: OrderId, reason: String },

    /// The order data provided is invalid.
    #[error("Order validation error: {0}")]
    Validation(String),

    /// The record store refused or failed the write; the order is unchanged.
    #[error("Order {order_id}: store write failed: {source}")]
    Store {
        order_id: OrderId,
        #[source]
        source: StoreError,
    },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunication(msg)
    }
}
