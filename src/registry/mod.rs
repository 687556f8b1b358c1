//! # Live Location Registry
//!
//! Holds the last-known position of every active driver and republishes it as an
//! immutable [`DriverSnapshot`] after each successful refresh.
//!
//! Refreshes are triggered three ways:
//! - once when the actor starts,
//! - explicitly through [`RegistryClient::refresh`],
//! - by a [`ChangeEvent`] on the `driver_locations` topic pushed through [`PushNotifier`].
//!
//! Push payloads are never trusted: any event for the topic causes a full re-fetch,
//! and a burst of queued events collapses into one fetch. A failed fetch keeps the
//! previous snapshot.

pub mod actor;
pub mod client;
pub mod error;

pub use actor::LiveLocationRegistry;
pub use client::{PushNotifier, RegistryClient};
pub use error::RegistryError;

use crate::model::{Coordinate, DriverId, DriverLocation};
use crate::store::LocationStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

pub const DRIVER_LOCATIONS_TOPIC: &str = "driver_locations";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One notification from the push subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    #[serde(rename = "eventType")]
    pub kind: ChangeKind,
    #[serde(default, rename = "new")]
    pub payload: Option<serde_json::Value>,
}

impl ChangeEvent {
    pub fn driver_locations(kind: ChangeKind) -> Self {
        Self {
            table: DRIVER_LOCATIONS_TOPIC.to_string(),
            kind,
            payload: None,
        }
    }

    pub fn is_driver_locations(&self) -> bool {
        self.table == DRIVER_LOCATIONS_TOPIC
    }
}

/// Immutable view of the active drivers, sorted by driver id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverSnapshot {
    pub drivers: Vec<DriverLocation>,
    /// Incremented on every successful refresh; `0` means never refreshed.
    pub version: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl DriverSnapshot {
    pub fn get(&self, driver_id: &DriverId) -> Option<&DriverLocation> {
        self.drivers.iter().find(|driver| &driver.driver_id == driver_id)
    }

    pub fn position(&self, driver_id: &DriverId) -> Option<Coordinate> {
        self.get(driver_id).and_then(DriverLocation::position)
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

/// Invoked on the registry task after every successful refresh. Keep it short.
pub type ChangeHandler = Arc<dyn Fn(&DriverSnapshot) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub refreshes: u64,
    pub failures: u64,
    pub notifications: u64,
    pub coalesced: u64,
    pub ignored: u64,
}

pub(crate) enum RegistryRequest {
    Refresh {
        respond_to: oneshot::Sender<Result<Arc<DriverSnapshot>, RegistryError>>,
    },
    OnChange {
        handler: ChangeHandler,
        respond_to: oneshot::Sender<()>,
    },
    Stats {
        respond_to: oneshot::Sender<RegistryStats>,
    },
}

/// Creates the registry actor, its client and the push entry point.
///
/// The actor must be started with `actor.run(shutdown_listener)`.
pub fn new(
    store: Arc<dyn LocationStore>,
    buffer_size: usize,
) -> (LiveLocationRegistry, RegistryClient, PushNotifier) {
    let (sender, receiver) = mpsc::channel(buffer_size.max(1));
    let (push_sender, notifications) = mpsc::channel(buffer_size.max(1));
    let (snapshots, snapshot_rx) = watch::channel(Arc::new(DriverSnapshot::default()));

    let actor = LiveLocationRegistry::new(store, receiver, notifications, snapshots);
    (
        actor,
        RegistryClient::new(sender, snapshot_rx),
        PushNotifier::new(push_sender),
    )
}
