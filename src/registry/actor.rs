use super::{ChangeEvent, ChangeHandler, DriverSnapshot, RegistryError, RegistryRequest, RegistryStats};
use crate::framework::ShutdownListener;
use crate::model::{DriverId, DriverLocation};
use crate::store::LocationStore;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// The registry actor. Owns the store handle, the handlers and the published snapshot.
pub struct LiveLocationRegistry {
    store: Arc<dyn LocationStore>,
    receiver: mpsc::Receiver<RegistryRequest>,
    notifications: mpsc::Receiver<ChangeEvent>,
    snapshots: watch::Sender<Arc<DriverSnapshot>>,
    handlers: Vec<ChangeHandler>,
    stats: RegistryStats,
}

impl LiveLocationRegistry {
    pub(crate) fn new(
        store: Arc<dyn LocationStore>,
        receiver: mpsc::Receiver<RegistryRequest>,
        notifications: mpsc::Receiver<ChangeEvent>,
        snapshots: watch::Sender<Arc<DriverSnapshot>>,
    ) -> Self {
        Self {
            store,
            receiver,
            notifications,
            snapshots,
            handlers: Vec::new(),
            stats: RegistryStats::default(),
        }
    }

    /// Runs until shutdown is signalled or every client is dropped.
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        info!("Registry started");
        let _ = self.refresh(&mut shutdown).await;

        let mut push_open = true;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle(request, &mut shutdown).await,
                    None => break,
                },
                event = self.notifications.recv(), if push_open => match event {
                    Some(event) => self.on_notification(event, &mut shutdown).await,
                    None => {
                        debug!("Push subscription closed");
                        push_open = false;
                    }
                },
            }
        }

        info!(
            refreshes = self.stats.refreshes,
            failures = self.stats.failures,
            "Registry shutdown"
        );
    }

    async fn handle(&mut self, request: RegistryRequest, shutdown: &mut ShutdownListener) {
        match request {
            RegistryRequest::Refresh { respond_to } => {
                let result = self.refresh(shutdown).await;
                let _ = respond_to.send(result);
            }
            RegistryRequest::OnChange { handler, respond_to } => {
                self.handlers.push(handler);
                debug!(handlers = self.handlers.len(), "Change handler registered");
                let _ = respond_to.send(());
            }
            RegistryRequest::Stats { respond_to } => {
                let _ = respond_to.send(self.stats);
            }
        }
    }

    async fn on_notification(&mut self, event: ChangeEvent, shutdown: &mut ShutdownListener) {
        self.stats.notifications += 1;
        if !event.is_driver_locations() {
            self.stats.ignored += 1;
            debug!(table = %event.table, "Ignoring change on unrelated table");
            return;
        }

        // One fetch answers every notification already queued behind this one.
        while let Ok(queued) = self.notifications.try_recv() {
            self.stats.notifications += 1;
            if queued.is_driver_locations() {
                self.stats.coalesced += 1;
            } else {
                self.stats.ignored += 1;
            }
        }

        debug!(kind = ?event.kind, "Driver locations changed");
        let _ = self.refresh(shutdown).await;
    }

    async fn refresh(&mut self, shutdown: &mut ShutdownListener) -> Result<Arc<DriverSnapshot>, RegistryError> {
        let store = self.store.clone();
        // A fetch still running at teardown is dropped and never applied.
        let fetched = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(RegistryError::ShuttingDown),
            fetched = store.active_drivers() => fetched,
        };

        match fetched {
            Ok(rows) => {
                let version = self.snapshots.borrow().version + 1;
                let snapshot = Arc::new(DriverSnapshot {
                    drivers: active_latest(rows),
                    version,
                    refreshed_at: Some(Utc::now()),
                });
                self.snapshots.send_replace(snapshot.clone());
                self.stats.refreshes += 1;
                info!(drivers = snapshot.len(), version, "Drivers refreshed");

                for handler in &self.handlers {
                    handler(&snapshot);
                }
                Ok(snapshot)
            }
            Err(e) => {
                self.stats.failures += 1;
                warn!(error = %e, failures = self.stats.failures, "Driver refresh failed, keeping previous snapshot");
                Err(RegistryError::Store(e))
            }
        }
    }
}

/// Active rows only, one per driver (latest update wins), sorted by driver id.
fn active_latest(rows: Vec<DriverLocation>) -> Vec<DriverLocation> {
    let mut latest: BTreeMap<DriverId, DriverLocation> = BTreeMap::new();
    for row in rows.into_iter().filter(|row| row.is_active) {
        match latest.get(&row.driver_id) {
            Some(existing) if existing.updated_at > row.updated_at => {}
            _ => {
                latest.insert(row.driver_id.clone(), row);
            }
        }
    }
    latest.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;
    use chrono::Duration;

    #[test]
    fn keeps_the_latest_active_row_per_driver() {
        let now = Utc::now();
        let rows = vec![
            DriverLocation::new("d2", Coordinate::new(2.0, 2.0)).at(now),
            DriverLocation::new("d1", Coordinate::new(1.0, 1.0)).at(now - Duration::seconds(30)),
            DriverLocation::new("d1", Coordinate::new(1.5, 1.5)).at(now),
            DriverLocation::new("d3", Coordinate::new(3.0, 3.0)).inactive(),
        ];

        let drivers = active_latest(rows);
        let ids: Vec<&str> = drivers.iter().map(|d| d.driver_id.0.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2"]);
        assert_eq!(drivers[0].coordinate, Some(Coordinate::new(1.5, 1.5)));
    }
}
