//! # Dispatch View
//!
//! One live map for one operator screen. A [`DispatchView`] actor owns a surface, a
//! feature synchronizer, an interaction controller and a route cache, and reruns a
//! refresh cycle whenever one of its inputs changes:
//!
//! - an [`OrderEvent`](crate::order_actor::OrderEvent) for the viewed order,
//! - a new driver snapshot from the registry,
//! - a pointer event from the surface,
//! - a command from a [`ViewClient`] (mode, picker, restaurants, options).
//!
//! A cycle recomputes the desired features, applies the diff as one batch, clears a
//! selection whose feature is gone, frames the camera when something changed, and
//! only then evaluates routes. Route completions arrive later on the same inbox.

pub mod actor;
pub mod client;
pub mod error;
pub mod plan;

pub use actor::DispatchView;
pub use client::ViewClient;
pub use error::ViewError;
pub use plan::{desired_features, desired_routes, PlanInput, ViewOptions};

use crate::clients::OrderClient;
use crate::config::ViewConfig;
use crate::map::{InteractionMode, MapSurface, Popup, RenderedRoute};
use crate::model::{Coordinate, MapFeature, Order, OrderId, RestaurantRef, RouteProfile};
use crate::order_actor::{OrderEvent, RoutePolicy};
use crate::registry::DriverSnapshot;
use crate::routing::{RouteProvider, RouteStats};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// What a view is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "order_id", rename_all = "lowercase")]
pub enum ViewScope {
    /// A single order: its restaurant, customer, driver and route, plus the rest of the fleet.
    Order(OrderId),
    /// Every active driver.
    Fleet,
    /// A bare map, used for picking locations and showing restaurants.
    Map,
}

impl ViewScope {
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            ViewScope::Order(id) => Some(id),
            _ => None,
        }
    }

    /// Order and fleet maps show every active driver; the bare map shows none.
    pub fn default_options(&self) -> ViewOptions {
        ViewOptions {
            show_customer: false,
            show_fleet: !matches!(self, ViewScope::Map),
        }
    }
}

impl Display for ViewScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewScope::Order(id) => write!(f, "order:{id}"),
            ViewScope::Fleet => f.write_str("fleet"),
            ViewScope::Map => f.write_str("map"),
        }
    }
}

/// Published to [`ViewClient::subscribe`] subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Picked(Coordinate),
    Selected(Popup),
    SelectionCleared,
}

/// Point-in-time copy of a view's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub scope: ViewScope,
    pub mode: InteractionMode,
    pub order: Option<Order>,
    pub features: Vec<MapFeature>,
    pub routes: Vec<RenderedRoute>,
    pub popup: Option<Popup>,
    pub picker: Option<Coordinate>,
    pub route_policy: RoutePolicy,
    #[serde(skip)]
    pub route_stats: Option<RouteStats>,
    pub drivers_version: u64,
    pub cycles: u64,
}

#[derive(Debug)]
pub(crate) enum ViewCommand {
    SetMode(InteractionMode),
    SetPicker(Option<Coordinate>),
    SetRestaurants(Vec<RestaurantRef>),
    SetOptions(ViewOptions),
    ClosePopup,
    Snapshot,
}

pub(crate) struct ViewRequest {
    pub command: ViewCommand,
    pub respond_to: oneshot::Sender<ViewSnapshot>,
}

/// Everything a view reads from the rest of the system.
pub struct ViewContext {
    pub order_client: OrderClient,
    /// The viewed order, fetched after `order_events` was subscribed.
    pub order: Option<Order>,
    pub order_events: Option<broadcast::Receiver<OrderEvent>>,
    pub drivers: watch::Receiver<Arc<DriverSnapshot>>,
    /// `None` disables routing entirely.
    pub provider: Option<Arc<dyn RouteProvider>>,
    pub profile: RouteProfile,
}

/// Creates a view actor around `surface`, plus its client.
///
/// The surface is attached immediately; the actor must be started with
/// `view.run(shutdown_listener)`.
pub fn new<S: MapSurface>(
    scope: ViewScope,
    surface: S,
    ctx: ViewContext,
    config: &ViewConfig,
    buffer_size: usize,
) -> (DispatchView<S>, ViewClient) {
    let buffer_size = buffer_size.max(1);
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (events, _) = broadcast::channel(buffer_size);
    let view = DispatchView::new(scope, surface, ctx, config, receiver, events.clone(), buffer_size);
    (view, ViewClient::new(sender, events))
}
