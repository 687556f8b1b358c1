use super::plan::{desired_features, desired_routes, PlanInput, ViewOptions};
use super::{ViewCommand, ViewContext, ViewEvent, ViewRequest, ViewScope, ViewSnapshot};
use crate::clients::{ActorClient, OrderClient};
use crate::config::ViewConfig;
use crate::framework::ShutdownListener;
use crate::map::{
    FeatureSynchronizer, FramingPolicy, InteractionController, InteractionMode, MapSurface, PointerEvent,
    PointerOutcome, PointerSink, RenderedRoute, SurfaceGuard, ViewDirective,
};
use crate::model::{Coordinate, Order, RestaurantRef, RouteKind, RouteProfile, RouteQuery};
use crate::order_actor::{OrderEvent, RoutePolicy};
use crate::registry::DriverSnapshot;
use crate::routing::{RouteCache, RouteCompletion, RouteStatus};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

/// The view actor. Generic over the surface it drives.
pub struct DispatchView<S: MapSurface> {
    scope: ViewScope,
    surface: SurfaceGuard<S>,
    sync: FeatureSynchronizer,
    interaction: InteractionController,
    framing: FramingPolicy,
    routes: Option<RouteCache>,
    profile: RouteProfile,

    order_client: OrderClient,
    order: Option<Order>,
    order_events: Option<broadcast::Receiver<OrderEvent>>,
    drivers: watch::Receiver<Arc<DriverSnapshot>>,
    drivers_open: bool,

    receiver: mpsc::Receiver<ViewRequest>,
    pointer_rx: mpsc::Receiver<PointerEvent>,
    completions: mpsc::UnboundedReceiver<RouteCompletion>,
    events: broadcast::Sender<ViewEvent>,

    options: ViewOptions,
    restaurants: Vec<RestaurantRef>,
    picker: Option<Coordinate>,
    wanted_routes: Vec<(RouteKind, RouteQuery)>,
    overlay: Vec<RenderedRoute>,
    cycles: u64,
}

impl<S: MapSurface> DispatchView<S> {
    pub(crate) fn new(
        scope: ViewScope,
        surface: S,
        ctx: ViewContext,
        config: &ViewConfig,
        receiver: mpsc::Receiver<ViewRequest>,
        events: broadcast::Sender<ViewEvent>,
        buffer_size: usize,
    ) -> Self {
        let (pointer_tx, pointer_rx) = mpsc::channel(buffer_size);
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let ViewContext {
            order_client,
            order,
            order_events,
            drivers,
            provider,
            profile,
        } = ctx;

        Self {
            options: scope.default_options(),
            scope,
            surface: SurfaceGuard::new(surface, PointerSink::new(pointer_tx)),
            sync: FeatureSynchronizer::new(),
            interaction: InteractionController::new(
                InteractionMode::default(),
                config.hit_radius_px,
                config.popup_autopan_ms,
            ),
            framing: FramingPolicy::from_config(config),
            routes: provider.map(|provider| RouteCache::new(provider, completion_tx)),
            profile,
            order_client,
            order,
            order_events,
            drivers,
            drivers_open: true,
            receiver,
            pointer_rx,
            completions,
            events,
            restaurants: Vec::new(),
            picker: None,
            wanted_routes: Vec::new(),
            overlay: Vec::new(),
            cycles: 0,
        }
    }

    /// Runs until shutdown is signalled or every client is dropped. The surface is
    /// detached and in-flight route fetches are aborted on the way out.
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        info!(scope = %self.scope, "View opened");
        self.refresh("open");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle(request),
                    None => break,
                },
                event = next_order_event(&mut self.order_events) => self.on_order_event(event).await,
                changed = self.drivers.changed(), if self.drivers_open => match changed {
                    Ok(()) => self.refresh("drivers"),
                    Err(_) => {
                        debug!("Registry gone, driver positions frozen");
                        self.drivers_open = false;
                    }
                },
                Some(event) = self.pointer_rx.recv() => self.on_pointer(event),
                Some(completion) = self.completions.recv() => self.on_route(completion),
            }
        }

        if let Some(cache) = self.routes.as_mut() {
            cache.cancel_all();
        }
        info!(scope = %self.scope, cycles = self.cycles, "View closed");
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    fn handle(&mut self, request: ViewRequest) {
        let ViewRequest { command, respond_to } = request;
        debug!(?command, "View command");
        match command {
            ViewCommand::SetMode(mode) => {
                if self.interaction.set_mode(mode).is_some() {
                    self.close_popup();
                }
                self.refresh("mode");
            }
            ViewCommand::SetPicker(picker) => {
                self.picker = picker.and_then(Coordinate::validated);
                self.refresh("picker");
            }
            ViewCommand::SetRestaurants(restaurants) => {
                self.restaurants = restaurants;
                self.refresh("restaurants");
            }
            ViewCommand::SetOptions(options) => {
                self.options = options;
                self.refresh("options");
            }
            ViewCommand::ClosePopup => {
                if self.interaction.clear().is_some() {
                    self.close_popup();
                }
            }
            ViewCommand::Snapshot => {}
        }
        let _ = respond_to.send(self.snapshot());
    }

    async fn on_order_event(&mut self, event: Result<OrderEvent, RecvError>) {
        let Some(order_id) = self.scope.order_id().cloned() else {
            return;
        };
        match event {
            Ok(event) if event.order().id == order_id => {
                let current = self.order.as_ref().map_or(0, |order| order.revision);
                if event.order().revision <= current && self.order.is_some() {
                    debug!(revision = event.order().revision, current, "Ignoring out-of-date order event");
                    return;
                }
                self.order = Some(event.into_order());
                self.refresh("order");
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Order events lagged, re-reading order");
                match self.order_client.get(order_id).await {
                    Ok(Some(order)) => {
                        self.order = Some(order);
                        self.refresh("order");
                    }
                    Ok(None) => warn!("Viewed order is no longer tracked"),
                    Err(e) => warn!(error = %e, "Could not re-read order"),
                }
            }
            Err(RecvError::Closed) => {
                debug!("Order events closed");
                self.order_events = None;
            }
        }
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        let viewport = self.surface.viewport();
        match self.interaction.handle_pointer(event.pixel, &viewport, self.sync.rendered()) {
            PointerOutcome::Picked(coord) => {
                debug!(lon = coord.lon, lat = coord.lat, "Location picked");
                self.picker = Some(coord);
                self.emit(ViewEvent::Picked(coord));
                self.refresh("picker");
            }
            PointerOutcome::Selected(popup) => {
                debug!(feature = %popup.feature.key(), "Feature selected");
                self.surface.show_popup(Some(&popup));
                self.emit(ViewEvent::Selected(popup));
            }
            PointerOutcome::Cleared => self.close_popup(),
            PointerOutcome::Ignored => {}
        }
    }

    fn on_route(&mut self, completion: RouteCompletion) {
        let Some(cache) = self.routes.as_mut() else {
            return;
        };
        if cache.complete(completion).is_none() {
            return;
        }
        let overlay = self
            .wanted_routes
            .iter()
            .filter_map(|(kind, query)| match cache.peek(query) {
                Some(RouteStatus::Ready(path)) => Some(RenderedRoute::new(*kind, path)),
                _ => None,
            })
            .collect();
        self.set_overlay(overlay);
    }

    // ========================================================================
    // Refresh cycle
    // ========================================================================

    /// Features, then framing, then routes.
    fn refresh(&mut self, trigger: &'static str) {
        self.cycles += 1;
        let drivers = self.drivers.borrow_and_update().clone();

        let desired = desired_features(&PlanInput {
            order: self.order.as_ref(),
            drivers: &drivers,
            restaurants: &self.restaurants,
            picker: self.picker,
            mode: self.interaction.mode(),
            options: self.options,
        });
        let batch = self.sync.sync(desired);

        if !batch.is_empty() {
            self.surface.apply_features(&batch);
            if self.interaction.reconcile(self.sync.rendered()) {
                self.close_popup();
            }
            if let Some(directive) = self.framing_directive() {
                self.surface.apply_view(&directive);
            }
        }

        self.evaluate_routes(&drivers);
        debug!(
            trigger,
            cycle = self.cycles,
            added = batch.added.len(),
            removed = batch.removed.len(),
            routes = self.overlay.len(),
            "View refreshed"
        );
    }

    fn framing_directive(&self) -> Option<ViewDirective> {
        match self.interaction.mode() {
            InteractionMode::Picker => self.framing.center_on(self.picker?),
            InteractionMode::Inspector => {
                let coords: Vec<Coordinate> = self.sync.rendered().iter().map(|f| f.coordinate).collect();
                self.framing.fit(&coords, &self.surface.viewport())
            }
        }
    }

    fn evaluate_routes(&mut self, drivers: &DriverSnapshot) {
        let Some(cache) = self.routes.as_mut() else {
            return;
        };
        let wanted = match &self.order {
            Some(order) => desired_routes(order, drivers, self.profile),
            None => Vec::new(),
        };
        let queries: Vec<RouteQuery> = wanted.iter().map(|(_, query)| *query).collect();
        cache.retain(&queries);

        let overlay = wanted
            .iter()
            .filter_map(|(kind, query)| match cache.get_route(*query) {
                RouteStatus::Ready(path) => Some(RenderedRoute::new(*kind, path)),
                RouteStatus::Failed | RouteStatus::Pending => None,
            })
            .collect();
        self.wanted_routes = wanted;
        self.set_overlay(overlay);
    }

    /// The overlay is always replaced as a whole.
    fn set_overlay(&mut self, overlay: Vec<RenderedRoute>) {
        if overlay != self.overlay {
            self.surface.set_routes(&overlay);
            self.overlay = overlay;
        }
    }

    fn close_popup(&mut self) {
        self.surface.show_popup(None);
        self.emit(ViewEvent::SelectionCleared);
    }

    fn emit(&self, event: ViewEvent) {
        let _ = self.events.send(event);
    }

    fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            scope: self.scope.clone(),
            mode: self.interaction.mode(),
            order: self.order.clone(),
            features: self.sync.rendered().to_vec(),
            routes: self.overlay.clone(),
            popup: self.interaction.selection().cloned(),
            picker: self.picker,
            route_policy: self.order.as_ref().map(RoutePolicy::for_order).unwrap_or_default(),
            route_stats: self.routes.as_ref().map(RouteCache::stats),
            drivers_version: self.drivers.borrow().version,
            cycles: self.cycles,
        }
    }
}

async fn next_order_event(events: &mut Option<broadcast::Receiver<OrderEvent>>) -> Result<OrderEvent, RecvError> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}
