use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{DriverRef, Order, OrderId, OrderStatus};
use crate::order_actor::{OrderAction, OrderError, OrderEvent};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
///
/// Validation and the store write happen inside the actor; this wrapper only
/// shapes requests and turns framework failures back into [`OrderError`].
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    events: broadcast::Sender<OrderEvent>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, events: broadcast::Sender<OrderEvent>) -> Self {
        Self { inner, events }
    }

    /// Starts tracking an order created elsewhere.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn track_order(&self, order: Order) -> Result<Order, OrderError> {
        debug!(?order, "track_order called");
        self.inner.track(order).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn transition(&self, order_id: &OrderId, to: OrderStatus) -> Result<Order, OrderError> {
        info!("Sending transition to actor");
        self.inner
            .perform_action(order_id.clone(), OrderAction::Transition(to))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, driver), fields(driver_id = %driver.id))]
    pub async fn assign_driver(&self, order_id: &OrderId, driver: DriverRef) -> Result<Order, OrderError> {
        info!("Sending driver assignment to actor");
        self.inner
            .perform_action(order_id.clone(), OrderAction::AssignDriver(driver))
            .await
            .map_err(Self::map_error)
    }

    /// Orders that are neither completed nor cancelled, oldest first.
    #[instrument(skip(self))]
    pub async fn active_orders(&self) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self
            .list()
            .await?
            .into_iter()
            .filter(|order| !order.status.is_terminal())
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    /// Every accepted change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(source) => match source.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::ActorCommunication(other.to_string()),
            },
            other => OrderError::ActorCommunication(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;
    use crate::model::{Contact, OrderType};
    use chrono::{Duration, Utc};

    fn order(id: &str, status: OrderStatus, age_minutes: i64) -> Order {
        let mut order = Order::new(id, OrderType::Pos, Contact::default(), 1.0).with_status(status);
        order.created_at = Utc::now() - Duration::minutes(age_minutes);
        order
    }

    #[tokio::test]
    async fn active_orders_drop_terminal_and_sort_by_age() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_list().return_ok(vec![
            order("new", OrderStatus::Pending, 1),
            order("done", OrderStatus::Completed, 30),
            order("old", OrderStatus::Preparing, 20),
            order("gone", OrderStatus::Cancelled, 10),
        ]);
        let (events, _) = broadcast::channel(4);
        let client = OrderClient::new(mock.client(), events);

        let ids: Vec<String> = client
            .active_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id.0)
            .collect();
        assert_eq!(ids, vec!["old", "new"]);
        mock.verify();
    }

    #[tokio::test]
    async fn entity_errors_come_back_typed() {
        let mut mock = MockClient::<Order>::new();
        let id = OrderId::from("o1");
        let rejected = OrderError::InvalidTransition {
            order_id: id.clone(),
            from: OrderStatus::Pending,
            to: OrderStatus::Ready,
        };
        mock.expect_action(id.clone())
            .return_err(FrameworkError::EntityError(Box::new(rejected.clone())));
        mock.expect_action(id.clone())
            .return_err(FrameworkError::NotFound(id.to_string()));
        let (events, _) = broadcast::channel(4);
        let client = OrderClient::new(mock.client(), events);

        assert_eq!(client.transition(&id, OrderStatus::Ready).await.unwrap_err(), rejected);
        assert_eq!(
            client.transition(&id, OrderStatus::Ready).await.unwrap_err(),
            OrderError::NotFound("o1".into())
        );
        mock.verify();
    }
}
