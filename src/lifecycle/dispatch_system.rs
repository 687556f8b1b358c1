use crate::clients::{ActorClient, OrderClient};
use crate::config::DispatchConfig;
use crate::framework::ShutdownSignal;
use crate::map::MapSurface;
use crate::order_actor::OrderError;
use crate::registry::{PushNotifier, RegistryClient};
use crate::routing::{OpenRouteService, RouteError, RouteProvider};
use crate::store::{LocationStore, OrderStore};
use crate::view::{self, ViewClient, ViewContext, ViewError, ViewScope};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Routing setup failed: {0}")]
    Routing(#[from] RouteError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("Task failed: {0}")]
    Task(String),
}

/// The runtime orchestrator for the dispatch core.
///
/// `DispatchSystem` is responsible for:
/// - **Lifecycle Management**: starting the order actor and the location registry,
///   and one view actor per [`open_view`](DispatchSystem::open_view) call
/// - **Dependency Wiring**: handing each view the order client, the driver snapshot
///   feed and the route provider
/// - **Teardown**: signalling every long-running loop and awaiting its task
///
/// # Example
///
/// ```ignore
/// let mut system = DispatchSystem::new(config, order_store, location_store)?;
/// system.order_client.track_order(order).await?;
/// let view = system.open_view(ViewScope::Order(order_id), surface).await?;
///
/// system.shutdown().await?;
/// ```
pub struct DispatchSystem {
    /// Client for the Order actor
    pub order_client: OrderClient,

    /// Client for the location registry
    pub registry_client: RegistryClient,

    notifier: PushNotifier,
    provider: Option<Arc<dyn RouteProvider>>,
    config: DispatchConfig,
    shutdown: ShutdownSignal,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl DispatchSystem {
    /// Starts the order actor and the registry. Routing uses OpenRouteService when
    /// `config.routing` carries an API key, and is disabled otherwise.
    pub fn new(
        config: DispatchConfig,
        order_store: Arc<dyn OrderStore>,
        location_store: Arc<dyn LocationStore>,
    ) -> Result<Self, DispatchError> {
        let provider = OpenRouteService::from_config(&config.routing)?
            .map(|service| Arc::new(service) as Arc<dyn RouteProvider>);
        Ok(Self::with_route_provider(config, order_store, location_store, provider))
    }

    /// Same as [`new`](DispatchSystem::new) with an explicit route provider.
    pub fn with_route_provider(
        config: DispatchConfig,
        order_store: Arc<dyn OrderStore>,
        location_store: Arc<dyn LocationStore>,
        provider: Option<Arc<dyn RouteProvider>>,
    ) -> Self {
        let shutdown = ShutdownSignal::new();
        let actors = &config.actors;

        // 1. Create actors
        let (order_actor, order_client, order_ctx) =
            crate::order_actor::new(order_store, actors.inbox_size, actors.event_capacity);
        let (registry, registry_client, notifier) = crate::registry::new(location_store, actors.inbox_size);

        // 2. Start them with their context
        let order_handle = tokio::spawn(order_actor.run(order_ctx));
        let registry_handle = tokio::spawn(registry.run(shutdown.listener()));

        info!(routing = provider.is_some(), "Dispatch system started");
        Self {
            order_client,
            registry_client,
            notifier,
            provider,
            config,
            shutdown,
            handles: vec![order_handle, registry_handle],
        }
    }

    /// Entry point for the push subscription feeding the registry.
    pub fn notifier(&self) -> PushNotifier {
        self.notifier.clone()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Spawns a view over `surface`. For an order scope the order must be tracked.
    #[instrument(skip(self, surface))]
    pub async fn open_view<S: MapSurface>(&mut self, scope: ViewScope, surface: S) -> Result<ViewClient, DispatchError> {
        // Subscribe before reading so no change falls between the two.
        let (order, order_events) = match scope.order_id() {
            Some(order_id) => {
                let events = self.order_client.subscribe();
                let order = self
                    .order_client
                    .get(order_id.clone())
                    .await
                    .map_err(ViewError::from)?
                    .ok_or_else(|| ViewError::from(OrderError::NotFound(order_id.to_string())))?;
                (Some(order), Some(events))
            }
            None => (None, None),
        };

        let ctx = ViewContext {
            order_client: self.order_client.clone(),
            order,
            order_events,
            drivers: self.registry_client.watch(),
            provider: self.provider.clone(),
            profile: self.config.routing.profile,
        };
        let (view, client) = view::new(scope, surface, ctx, &self.config.view, self.config.actors.inbox_size);
        self.handles.push(tokio::spawn(view.run(self.shutdown.listener())));
        Ok(client)
    }

    /// Gracefully shuts down the entire system.
    ///
    /// Views and the registry stop on the shutdown signal; the order actor stops
    /// once every client is dropped. In-flight store fetches and route requests are
    /// abandoned and never applied.
    pub async fn shutdown(self) -> Result<(), DispatchError> {
        info!("Shutting down system...");

        // =====================================================================
        // Step 1: Signal long-running loops, then close channels
        // =====================================================================

        self.shutdown.trigger();
        drop(self.order_client);
        drop(self.registry_client);
        drop(self.notifier);

        // =====================================================================
        // Step 2: Wait for all actor tasks to complete
        // =====================================================================

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(DispatchError::Task(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
