/// Represents a customer order as seen by the dispatch core.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
///
/// Orders are created by the record store on submission; the core only starts
/// *tracking* them and then mutates them through lifecycle transitions
/// (see [`crate::order_actor`]). Completion and cancellation are terminal states,
/// never removals.
use crate::model::{Coordinate, DriverId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type-safe identifier for Restaurants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantId(pub String);

impl From<&str> for RestaurantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for RestaurantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an order. Wire names follow the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    #[serde(alias = "out_for_delivery")]
    OutForDelivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out-for-delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    Delivery,
    #[serde(alias = "dine_in")]
    DineIn,
    Pos,
}

impl OrderType {
    pub fn is_delivery(self) -> bool {
        matches!(self, OrderType::Delivery)
    }
}

/// Name and phone of a person shown on the map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// The driver assigned to an order. The position lives in the location registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRef {
    pub id: DriverId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl DriverRef {
    pub fn new(id: impl Into<DriverId>) -> Self {
        Self {
            id: id.into(),
            full_name: None,
            phone: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Driver")
    }
}

/// The restaurant preparing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRef {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

/// One item line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub order_type: OrderType,
    #[serde(default)]
    pub customer: Contact,
    #[serde(default)]
    pub delivery_address: Option<String>,
    /// Customer position; only ever set on delivery orders.
    #[serde(default)]
    pub delivery: Option<Coordinate>,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub driver: Option<DriverRef>,
    #[serde(default)]
    pub restaurant: Option<RestaurantRef>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    /// Bumped on every accepted mutation so subscribers can drop out-of-order events.
    #[serde(default)]
    pub revision: u64,
}

impl Order {
    /// Creates a freshly submitted (`pending`) order.
    ///
    /// # Arguments
    /// * `id` - Identifier assigned by the record store
    /// * `order_type` - Delivery, dine-in or point-of-sale
    /// * `customer` - Customer contact shown on the map and in alerts
    /// * `total` - Order total
    pub fn new(id: impl Into<OrderId>, order_type: OrderType, customer: Contact, total: f64) -> Self {
        Self {
            id: id.into(),
            status: OrderStatus::Pending,
            order_type,
            customer,
            delivery_address: None,
            delivery: None,
            table_number: None,
            driver: None,
            restaurant: None,
            items: Vec::new(),
            total,
            created_at: Utc::now(),
            revision: 0,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_delivery(mut self, address: impl Into<String>, coordinate: Coordinate) -> Self {
        self.delivery_address = Some(address.into());
        self.delivery = Some(coordinate);
        self
    }

    pub fn with_restaurant(mut self, restaurant: RestaurantRef) -> Self {
        self.restaurant = Some(restaurant);
        self
    }

    pub fn with_driver(mut self, driver: DriverRef) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table_number = Some(table.into());
        self
    }

    pub fn with_items(mut self, items: Vec<OrderLine>) -> Self {
        self.items = items;
        self
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
