//! Read-only rules derived from an order's state: which routes matter, which operator
//! buttons apply, whether a map makes sense, and the alert text.

use crate::model::{Order, OrderStatus, OrderType};
use serde::Serialize;

/// Which driver routes are relevant for an order right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoutePolicy {
    /// Driver to restaurant: ready or out for delivery, with a driver assigned.
    pub to_restaurant: bool,
    /// Driver to customer: out for delivery.
    pub to_customer: bool,
}

impl RoutePolicy {
    pub fn for_order(order: &Order) -> Self {
        let delivery = order.order_type.is_delivery();
        Self {
            to_restaurant: delivery
                && matches!(order.status, OrderStatus::Ready | OrderStatus::OutForDelivery)
                && order.driver.is_some(),
            to_customer: delivery && order.status == OrderStatus::OutForDelivery,
        }
    }

    /// The restaurant marker of the order is hidden while heading to the customer.
    pub fn shows_restaurant(&self) -> bool {
        !self.to_customer
    }

    pub fn any(&self) -> bool {
        self.to_restaurant || self.to_customer
    }
}

/// Buttons an operator may press for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorAction {
    StartPreparing,
    MarkReady,
    Finalize,
    Cancel,
}

impl OperatorAction {
    pub fn target(self) -> OrderStatus {
        match self {
            OperatorAction::StartPreparing => OrderStatus::Preparing,
            OperatorAction::MarkReady => OrderStatus::Ready,
            OperatorAction::Finalize => OrderStatus::Completed,
            OperatorAction::Cancel => OrderStatus::Cancelled,
        }
    }
}

/// A ready delivery order has no button: it waits for a driver to pick it up.
pub fn available_actions(order: &Order) -> Vec<OperatorAction> {
    match (order.status, order.order_type.is_delivery()) {
        (OrderStatus::Pending, _) => vec![OperatorAction::StartPreparing, OperatorAction::Cancel],
        (OrderStatus::Preparing, _) => vec![OperatorAction::MarkReady, OperatorAction::Cancel],
        (OrderStatus::Ready, false) | (OrderStatus::OutForDelivery, true) => vec![OperatorAction::Finalize],
        _ => Vec::new(),
    }
}

pub fn can_show_map(order: &Order) -> bool {
    order.restaurant.is_some() && RoutePolicy::for_order(order).to_restaurant
}

/// New-order alert text.
pub fn summary(order: &Order) -> String {
    let mut text = format!("A new order (#{}) has been placed.", order.id);
    match order.order_type {
        OrderType::DineIn => {
            let table = order.table_number.as_deref().unwrap_or("?");
            text.push_str(&format!(" For table {table}."));
        }
        OrderType::Delivery => text.push_str(" For delivery."),
        OrderType::Pos => text.push_str(" From POS terminal."),
    }
    text.push_str(&format!(" Total: {:.2}.", order.total));
    text
}
