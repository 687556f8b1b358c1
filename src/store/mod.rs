//! Boundaries to the external record store.
//!
//! The dispatch core never owns persistence. Orders are written through
//! [`OrderStore`] before a transition is accepted, and driver positions are read
//! through [`LocationStore`] whenever the registry refreshes.

pub mod error;
pub mod memory;

pub use error::StoreError;
pub use memory::{MemoryLocationStore, MemoryOrderStore};

use crate::model::{DriverLocation, OrderId, OrderStatus};
use async_trait::async_trait;

#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn update_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<(), StoreError>;
}

#[async_trait]
pub trait LocationStore: Send + Sync + 'static {
    /// Every driver location row joined with the driver profile. Inactive rows may be included.
    async fn active_drivers(&self) -> Result<Vec<DriverLocation>, StoreError>;
}
