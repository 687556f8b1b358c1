use super::{ChangeEvent, ChangeHandler, DriverSnapshot, RegistryError, RegistryRequest, RegistryStats};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument};

/// Cloneable handle to the registry actor.
#[derive(Clone)]
pub struct RegistryClient {
    sender: mpsc::Sender<RegistryRequest>,
    snapshots: watch::Receiver<Arc<DriverSnapshot>>,
}

impl RegistryClient {
    pub(crate) fn new(sender: mpsc::Sender<RegistryRequest>, snapshots: watch::Receiver<Arc<DriverSnapshot>>) -> Self {
        Self { sender, snapshots }
    }

    /// Re-fetches now and returns the new snapshot, or the failure (the old snapshot stays).
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<DriverSnapshot>, RegistryError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(RegistryRequest::Refresh { respond_to }).await?;
        response.await.map_err(|_| dropped())?
    }

    /// Registers a handler called after every successful refresh, push-triggered ones included.
    #[instrument(skip(self, handler))]
    pub async fn on_change<F>(&self, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&DriverSnapshot) + Send + Sync + 'static,
    {
        let handler: ChangeHandler = Arc::new(handler);
        let (respond_to, response) = oneshot::channel();
        self.send(RegistryRequest::OnChange { handler, respond_to }).await?;
        response.await.map_err(|_| dropped())
    }

    pub async fn stats(&self) -> Result<RegistryStats, RegistryError> {
        let (respond_to, response) = oneshot::channel();
        self.send(RegistryRequest::Stats { respond_to }).await?;
        response.await.map_err(|_| dropped())
    }

    /// The latest published snapshot. Never blocks.
    pub fn snapshot(&self) -> Arc<DriverSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<DriverSnapshot>> {
        self.snapshots.clone()
    }

    async fn send(&self, request: RegistryRequest) -> Result<(), RegistryError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| RegistryError::ActorCommunication("registry closed".into()))
    }
}

fn dropped() -> RegistryError {
    RegistryError::ActorCommunication("registry dropped response channel".into())
}

/// Entry point for the push subscription.
#[derive(Clone)]
pub struct PushNotifier {
    sender: mpsc::Sender<ChangeEvent>,
}

impl PushNotifier {
    pub(crate) fn new(sender: mpsc::Sender<ChangeEvent>) -> Self {
        Self { sender }
    }

    pub async fn notify(&self, event: ChangeEvent) -> Result<(), RegistryError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| RegistryError::ActorCommunication("registry closed".into()))
    }

    /// Non-blocking variant for callbacks that cannot await. A full queue already
    /// guarantees a pending re-fetch, so dropping the event then is harmless.
    pub fn try_notify(&self, event: ChangeEvent) -> Result<(), RegistryError> {
        match self.sender.try_send(event) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(RegistryError::ActorCommunication("registry closed".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::framework::ShutdownSignal;
    use crate::model::{Coordinate, DriverLocation};
    use crate::registry::{self, ChangeEvent, ChangeKind, RegistryError};
    use crate::store::{MemoryLocationStore, StoreError};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn row(id: &str, lon: f64) -> DriverLocation {
        DriverLocation::new(id, Coordinate::new(lon, 31.6))
    }

    #[tokio::test]
    async fn initial_refresh_then_push_refetches() {
        let store = Arc::new(MemoryLocationStore::new(vec![row("d1", -7.9)]));
        let (actor, client, push) = registry::new(store.clone(), 8);
        let signal = ShutdownSignal::new();
        let handle = tokio::spawn(actor.run(signal.listener()));

        let mut snapshots = client.watch();
        tokio::time::timeout(Duration::from_secs(1), snapshots.wait_for(|s| s.version == 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(client.snapshot().len(), 1);

        let seen = Arc::new(AtomicU64::new(0));
        let observed = seen.clone();
        client
            .on_change(move |snapshot| observed.store(snapshot.version, Ordering::SeqCst))
            .await
            .unwrap();

        store.upsert(row("d2", -7.8));
        push.notify(ChangeEvent::driver_locations(ChangeKind::Insert)).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), snapshots.wait_for(|s| s.len() == 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), client.snapshot().version);

        signal.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn unrelated_tables_are_ignored() {
        let store = Arc::new(MemoryLocationStore::new(vec![row("d1", -7.9)]));
        let (actor, client, push) = registry::new(store.clone(), 8);
        let signal = ShutdownSignal::new();
        let handle = tokio::spawn(actor.run(signal.listener()));

        client.refresh().await.unwrap();
        let before = store.fetch_count();
        push.notify(ChangeEvent {
            table: "orders".into(),
            kind: ChangeKind::Update,
            payload: None,
        })
        .await
        .unwrap();

        // Let the actor drain the notification before asking for stats.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let stats = client.stats().await.unwrap();
        assert_eq!(stats.ignored, 1);
        assert_eq!(store.fetch_count(), before);

        signal.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn failed_refreshes_keep_the_last_snapshot() {
        let store = Arc::new(MemoryLocationStore::new(vec![row("d1", -7.9), row("d2", -7.8)]));
        let (actor, client, _push) = registry::new(store.clone(), 8);
        let signal = ShutdownSignal::new();
        let handle = tokio::spawn(actor.run(signal.listener()));

        let good = client.refresh().await.unwrap();
        store.fail_next(StoreError::Unavailable("down".into()));
        store.fail_next(StoreError::Unavailable("still down".into()));

        assert!(client.refresh().await.is_err());
        assert!(client.refresh().await.is_err());
        assert_eq!(client.snapshot(), good);
        assert_eq!(client.stats().await.unwrap().failures, 2);

        signal.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn try_notify_drops_events_when_a_refetch_is_already_queued() {
        let store = Arc::new(MemoryLocationStore::new(vec![row("d1", -7.9)]));
        let (actor, _client, push) = registry::new(store, 1);

        // Nobody drains the queue yet, so the second event finds it full.
        push.try_notify(ChangeEvent::driver_locations(ChangeKind::Update)).unwrap();
        push.try_notify(ChangeEvent::driver_locations(ChangeKind::Update)).unwrap();

        drop(actor);
        let err = push
            .try_notify(ChangeEvent::driver_locations(ChangeKind::Delete))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ActorCommunication(_)));
    }
}
