//! # Route Cache
//!
//! Memoizes route queries for one view and owns the network calls behind them.
//!
//! - A miss spawns exactly one fetch per key; asking again while it runs is a
//!   *deduplicated* hit that reports [`RouteStatus::Pending`].
//! - Results come back as [`RouteCompletion`] messages on the channel given to
//!   [`RouteCache::new`], and are applied with [`RouteCache::complete`].
//! - [`RouteCache::retain`] drops every entry and aborts every fetch that is no
//!   longer wanted. A completion whose ticket does not match the live fetch for its
//!   key is stale and discarded.
//! - Failures are cached like paths. There is no TTL and no automatic retry.
//!
//! The cache is plain data owned by its view actor, so it needs no locking.

use super::{RouteError, RouteProvider};
use crate::model::{Polyline, RouteQuery};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RouteStatus {
    Ready(Polyline),
    Failed,
    Pending,
}

/// The outcome of one spawned fetch.
#[derive(Debug, Clone)]
pub struct RouteCompletion {
    pub query: RouteQuery,
    pub ticket: u64,
    pub result: Result<Polyline, RouteError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteStats {
    pub requests: u64,
    pub hits: u64,
    pub deduplicated: u64,
    pub stale: u64,
    pub failures: u64,
    pub cancelled: u64,
}

enum Entry {
    Path(Polyline),
    Failed,
}

struct InFlight {
    ticket: u64,
    handle: JoinHandle<()>,
}

pub struct RouteCache {
    provider: Arc<dyn RouteProvider>,
    completions: mpsc::UnboundedSender<RouteCompletion>,
    entries: HashMap<RouteQuery, Entry>,
    in_flight: HashMap<RouteQuery, InFlight>,
    next_ticket: u64,
    stats: RouteStats,
}

impl RouteCache {
    pub fn new(provider: Arc<dyn RouteProvider>, completions: mpsc::UnboundedSender<RouteCompletion>) -> Self {
        Self {
            provider,
            completions,
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            next_ticket: 1,
            stats: RouteStats::default(),
        }
    }

    /// Cached result, or `Pending` after making sure exactly one fetch is running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn get_route(&mut self, query: RouteQuery) -> RouteStatus {
        if let Some(status) = self.peek(&query) {
            match status {
                RouteStatus::Pending => self.stats.deduplicated += 1,
                _ => self.stats.hits += 1,
            }
            return status;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.stats.requests += 1;

        let provider = self.provider.clone();
        let completions = self.completions.clone();
        let handle = tokio::spawn(async move {
            let result = provider.route(&query).await;
            // The receiver is gone only when the view is torn down.
            let _ = completions.send(RouteCompletion { query, ticket, result });
        });
        debug!(%query, ticket, "Route requested");
        self.in_flight.insert(query, InFlight { ticket, handle });
        RouteStatus::Pending
    }

    /// Looks without fetching or counting.
    pub fn peek(&self, query: &RouteQuery) -> Option<RouteStatus> {
        match self.entries.get(query) {
            Some(Entry::Path(path)) => Some(RouteStatus::Ready(path.clone())),
            Some(Entry::Failed) => Some(RouteStatus::Failed),
            None if self.in_flight.contains_key(query) => Some(RouteStatus::Pending),
            None => None,
        }
    }

    /// Invalidates entries and aborts fetches whose key is not in `desired`.
    pub fn retain(&mut self, desired: &[RouteQuery]) {
        self.entries.retain(|query, _| desired.contains(query));
        let stats = &mut self.stats;
        self.in_flight.retain(|query, fetch| {
            if desired.contains(query) {
                return true;
            }
            fetch.handle.abort();
            stats.cancelled += 1;
            debug!(%query, ticket = fetch.ticket, "Route fetch aborted");
            false
        });
    }

    /// Applies a completion. `None` means it was stale and must not be rendered.
    pub fn complete(&mut self, completion: RouteCompletion) -> Option<RouteStatus> {
        let RouteCompletion { query, ticket, result } = completion;
        match self.in_flight.get(&query) {
            Some(fetch) if fetch.ticket == ticket => {}
            _ => {
                self.stats.stale += 1;
                debug!(%query, ticket, "Discarding stale route");
                return None;
            }
        }
        self.in_flight.remove(&query);

        match result {
            Ok(path) => {
                debug!(%query, points = path.len(), "Route ready");
                self.entries.insert(query, Entry::Path(path.clone()));
                Some(RouteStatus::Ready(path))
            }
            Err(e) => {
                self.stats.failures += 1;
                warn!(%query, error = %e, "Route fetch failed; not retrying");
                self.entries.insert(query, Entry::Failed);
                Some(RouteStatus::Failed)
            }
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, fetch) in self.in_flight.drain() {
            fetch.handle.abort();
            self.stats.cancelled += 1;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> RouteStats {
        self.stats
    }
}

impl Drop for RouteCache {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinate, RouteProfile};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Counts calls and holds each one until a permit is released.
    struct GatedProvider {
        calls: AtomicUsize,
        gate: Semaphore,
        fail: bool,
    }

    impl GatedProvider {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Semaphore::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl RouteProvider for GatedProvider {
        async fn route(&self, query: &RouteQuery) -> Result<Polyline, RouteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.map_err(|e| RouteError::Http(e.to_string()))?;
            if self.fail {
                Err(RouteError::Status(503))
            } else {
                Ok(Polyline(vec![query.origin, query.destination]))
            }
        }
    }

    fn query(lon: f64) -> RouteQuery {
        RouteQuery::new(Coordinate::new(lon, 31.63), Coordinate::new(-7.60, 33.57), RouteProfile::DrivingCar).unwrap()
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<RouteCompletion>) -> RouteCompletion {
        tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn identical_queries_share_one_fetch() {
        let provider = GatedProvider::new(false);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut cache = RouteCache::new(provider.clone(), tx);

        assert_eq!(cache.get_route(query(-7.98)), RouteStatus::Pending);
        assert_eq!(cache.get_route(query(-7.98)), RouteStatus::Pending);

        provider.gate.add_permits(1);
        let completion = next(&mut rx).await;
        assert!(matches!(cache.complete(completion), Some(RouteStatus::Ready(_))));
        assert!(matches!(cache.get_route(query(-7.98)), RouteStatus::Ready(path) if path.len() == 2));

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!((stats.requests, stats.deduplicated, stats.hits), (1, 1, 1));
    }

    #[tokio::test]
    async fn superseded_fetches_are_aborted_and_never_applied() {
        let provider = GatedProvider::new(false);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut cache = RouteCache::new(provider.clone(), tx);

        cache.get_route(query(-7.98));
        tokio::task::yield_now().await;
        cache.retain(&[query(-7.50)]);
        assert_eq!(cache.in_flight(), 0);

        provider.gate.add_permits(1);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());

        // A late result for the same key from an older request is still discarded.
        let late = RouteCompletion {
            query: query(-7.98),
            ticket: 1,
            result: Ok(Polyline::default()),
        };
        assert_eq!(cache.complete(late), None);
        assert_eq!(cache.peek(&query(-7.98)), None);
        assert_eq!(cache.stats().stale, 1);
        assert_eq!(cache.stats().cancelled, 1);
    }

    #[tokio::test]
    async fn failures_are_cached_without_retry() {
        let provider = GatedProvider::new(true);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut cache = RouteCache::new(provider.clone(), tx);

        cache.get_route(query(-7.98));
        provider.gate.add_permits(1);
        let completion = next(&mut rx).await;
        assert_eq!(cache.complete(completion), Some(RouteStatus::Failed));

        assert_eq!(cache.get_route(query(-7.98)), RouteStatus::Failed);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().failures, 1);

        // Dropping it from the desired set forgets the failure.
        cache.retain(&[]);
        assert_eq!(cache.peek(&query(-7.98)), None);
    }
}
