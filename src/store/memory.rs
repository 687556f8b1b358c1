//! In-memory stores for the demo binary and tests.

use super::{LocationStore, OrderStore, StoreError};
use crate::model::{DriverLocation, OrderId, OrderStatus};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records every status write. Failures can be scripted with [`fail_next`](Self::fail_next).
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    writes: Mutex<Vec<(OrderId, OrderStatus)>>,
    failures: Mutex<VecDeque<StoreError>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: StoreError) {
        lock(&self.failures).push_back(error);
    }

    pub fn writes(&self) -> Vec<(OrderId, OrderStatus)> {
        lock(&self.writes).clone()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn update_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<(), StoreError> {
        if let Some(error) = lock(&self.failures).pop_front() {
            return Err(error);
        }
        debug!(%order_id, %status, "Status written");
        lock(&self.writes).push((order_id.clone(), status));
        Ok(())
    }
}

/// Serves whatever rows were last set. Failures can be scripted with [`fail_next`](Self::fail_next).
#[derive(Debug, Default)]
pub struct MemoryLocationStore {
    rows: Mutex<Vec<DriverLocation>>,
    failures: Mutex<VecDeque<StoreError>>,
    fetches: AtomicUsize,
}

impl MemoryLocationStore {
    pub fn new(rows: Vec<DriverLocation>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn set_drivers(&self, rows: Vec<DriverLocation>) {
        *lock(&self.rows) = rows;
    }

    /// Inserts or replaces the row for one driver.
    pub fn upsert(&self, row: DriverLocation) {
        let mut rows = lock(&self.rows);
        match rows.iter_mut().find(|existing| existing.driver_id == row.driver_id) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
    }

    pub fn fail_next(&self, error: StoreError) {
        lock(&self.failures).push_back(error);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn active_drivers(&self) -> Result<Vec<DriverLocation>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.failures).pop_front() {
            return Err(error);
        }
        Ok(lock(&self.rows).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    #[tokio::test]
    async fn scripted_failures_are_consumed_once() {
        let store = MemoryOrderStore::new();
        store.fail_next(StoreError::Unavailable("offline".into()));

        let id = OrderId::from("o1");
        assert!(store.update_order_status(&id, OrderStatus::Preparing).await.is_err());
        assert!(store.update_order_status(&id, OrderStatus::Preparing).await.is_ok());
        assert_eq!(store.writes(), vec![(id, OrderStatus::Preparing)]);
    }

    #[tokio::test]
    async fn upsert_replaces_rows_per_driver() {
        let store = MemoryLocationStore::new(vec![DriverLocation::new("d1", Coordinate::new(1.0, 1.0))]);
        store.upsert(DriverLocation::new("d1", Coordinate::new(2.0, 2.0)));
        store.upsert(DriverLocation::new("d2", Coordinate::new(3.0, 3.0)));

        let rows = store.active_drivers().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].coordinate, Some(Coordinate::new(2.0, 2.0)));
        assert_eq!(store.fetch_count(), 1);
    }
}
