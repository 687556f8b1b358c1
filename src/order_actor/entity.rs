//! Entity trait implementation for the Order domain type.
//!
//! Every accepted mutation bumps [`Order::revision`] and is broadcast as an
//! [`OrderEvent`]. Rejected actions leave the order untouched.

use super::{machine, OrderAction, OrderContext, OrderError, OrderEvent};
use crate::framework::ActorEntity;
use crate::model::{DriverRef, Order, OrderId, OrderStatus};
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = OrderContext;
    type Error = OrderError;

    fn id(&self) -> OrderId {
        self.id.clone()
    }

    async fn on_track(&mut self, ctx: &OrderContext) -> Result<(), OrderError> {
        if !self.order_type.is_delivery() && self.delivery.is_some() {
            return Err(OrderError::Validation(format!(
                "order {} is not a delivery order but carries a delivery coordinate",
                self.id
            )));
        }
        ctx.publish(OrderEvent::Tracked(self.clone()));
        Ok(())
    }

    async fn handle_action(&mut self, action: OrderAction, ctx: &OrderContext) -> Result<Order, OrderError> {
        match action {
            OrderAction::Transition(to) => self.transition(to, ctx).await,
            OrderAction::AssignDriver(driver) => self.assign(driver, ctx),
        }
    }
}

impl Order {
    async fn transition(&mut self, to: OrderStatus, ctx: &OrderContext) -> Result<Order, OrderError> {
        machine::check(self, to)?;

        // Commit locally only after the store accepted the write.
        ctx.store
            .update_order_status(&self.id, to)
            .await
            .map_err(|source| OrderError::Store {
                order_id: self.id.clone(),
                source,
            })?;

        let from = self.status;
        self.status = to;
        self.revision += 1;
        info!(order_id = %self.id, %from, %to, "Status changed");
        ctx.publish(OrderEvent::StatusChanged {
            order: self.clone(),
            from,
        });
        Ok(self.clone())
    }

    fn assign(&mut self, driver: DriverRef, ctx: &OrderContext) -> Result<Order, OrderError> {
        if !self.order_type.is_delivery() {
            return Err(OrderError::InvalidAssignment {
                order_id: self.id.clone(),
                reason: "only delivery orders take a driver".into(),
            });
        }
        if !matches!(
            self.status,
            OrderStatus::Pending | OrderStatus::Preparing | OrderStatus::Ready
        ) {
            return Err(OrderError::InvalidAssignment {
                order_id: self.id.clone(),
                reason: format!("cannot assign a driver while {}", self.status),
            });
        }

        debug!(order_id = %self.id, driver_id = %driver.id, "Assigning driver");
        self.driver = Some(driver);
        self.revision += 1;
        ctx.publish(OrderEvent::DriverAssigned(self.clone()));
        Ok(self.clone())
    }
}
