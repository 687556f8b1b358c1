//! Order lifecycle: the tracked-order actor, its transition table and derived policies.

pub mod entity;
pub mod error;
pub mod machine;
pub mod policy;

pub use error::*;
pub use policy::{available_actions, can_show_map, summary, OperatorAction, RoutePolicy};

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::{DriverRef, Order, OrderStatus};
use crate::store::OrderStore;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug)]
pub enum OrderAction {
    Transition(OrderStatus),
    AssignDriver(DriverRef),
}

/// Published after every accepted mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Tracked(Order),
    StatusChanged { order: Order, from: OrderStatus },
    DriverAssigned(Order),
}

impl OrderEvent {
    pub fn order(&self) -> &Order {
        match self {
            OrderEvent::Tracked(order)
            | OrderEvent::StatusChanged { order, .. }
            | OrderEvent::DriverAssigned(order) => order,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            OrderEvent::Tracked(order)
            | OrderEvent::StatusChanged { order, .. }
            | OrderEvent::DriverAssigned(order) => order,
        }
    }
}

/// Dependencies injected into the Order actor at `run()`.
#[derive(Clone)]
pub struct OrderContext {
    pub store: Arc<dyn OrderStore>,
    pub events: broadcast::Sender<OrderEvent>,
}

impl OrderContext {
    /// Having no subscribers is fine.
    pub fn publish(&self, event: OrderEvent) {
        let _ = self.events.send(event);
    }
}

/// Creates a new Order actor and its client.
///
/// # Arguments
/// * `buffer_size` - Inbox capacity of the actor
/// * `event_capacity` - How many events a slow subscriber may fall behind before it lags
///
/// The returned context still has to be passed to `actor.run()`.
pub fn new(
    store: Arc<dyn OrderStore>,
    buffer_size: usize,
    event_capacity: usize,
) -> (ResourceActor<Order>, OrderClient, OrderContext) {
    let (events, _) = broadcast::channel(event_capacity.max(1));
    let (actor, generic_client) = ResourceActor::new(buffer_size.max(1));
    let client = OrderClient::new(generic_client, events.clone());
    (actor, client, OrderContext { store, events })
}
