//! The order lifecycle table.
//!
//! ```text
//! delivery:      pending -> preparing -> ready -> out-for-delivery -> completed
//! dine-in / pos: pending -> preparing -> ready -> completed
//! any type:      pending | preparing -> cancelled
//! ```

use super::OrderError;
use crate::model::{Order, OrderStatus, OrderType};
use OrderStatus::*;

/// Statuses reachable in one step from `from`.
pub fn next_statuses(order_type: OrderType, from: OrderStatus) -> &'static [OrderStatus] {
    match (from, order_type.is_delivery()) {
        (Pending, _) => &[Preparing, Cancelled],
        (Preparing, _) => &[Ready, Cancelled],
        (Ready, true) => &[OutForDelivery],
        (Ready, false) => &[Completed],
        (OutForDelivery, true) => &[Completed],
        (OutForDelivery, false) | (Completed, _) | (Cancelled, _) => &[],
    }
}

pub fn can_transition(order_type: OrderType, from: OrderStatus, to: OrderStatus) -> bool {
    next_statuses(order_type, from).contains(&to)
}

/// Validates a transition without touching the order.
pub fn check(order: &Order, to: OrderStatus) -> Result<(), OrderError> {
    if can_transition(order.order_type, order.status, to) {
        Ok(())
    } else {
        Err(OrderError::InvalidTransition {
            order_id: order.id.clone(),
            from: order.status,
            to,
        })
    }
}
