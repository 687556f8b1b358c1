//! # Map Surface
//!
//! The rendering seam. A view actor never touches a real map widget; it talks to a
//! [`MapSurface`] through a [`SurfaceGuard`], which attaches the pointer sink when
//! created and detaches it when dropped, whatever the exit path.
//!
//! [`HeadlessSurface`] records everything it is told and lets tests click on it.

use super::framing::ViewDirective;
use super::interaction::Popup;
use super::projection::{Pixel, Viewport};
use crate::model::{Coordinate, FeatureKey, MapFeature, Polyline, RouteKind};
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

/// One atomic update of the feature layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureBatch {
    pub added: Vec<MapFeature>,
    pub removed: Vec<FeatureKey>,
}

impl FeatureBatch {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRoute {
    pub kind: RouteKind,
    pub path: Polyline,
    pub color: &'static str,
    pub width: f32,
}

impl RenderedRoute {
    pub fn new(kind: RouteKind, path: Polyline) -> Self {
        Self {
            kind,
            path,
            color: kind.color(),
            width: kind.width(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pixel: Pixel,
}

/// Where a surface delivers clicks. Never blocks the surface.
#[derive(Debug, Clone)]
pub struct PointerSink {
    sender: mpsc::Sender<PointerEvent>,
}

impl PointerSink {
    pub fn new(sender: mpsc::Sender<PointerEvent>) -> Self {
        Self { sender }
    }

    /// False when the event was dropped (view busy or gone).
    pub fn send(&self, pixel: Pixel) -> bool {
        self.sender.try_send(PointerEvent { pixel }).is_ok()
    }
}

pub trait MapSurface: Send + 'static {
    fn attach(&mut self, sink: PointerSink);
    fn detach(&mut self);
    fn apply_features(&mut self, batch: &FeatureBatch);
    /// Replaces the whole route overlay.
    fn set_routes(&mut self, routes: &[RenderedRoute]);
    fn apply_view(&mut self, directive: &ViewDirective);
    fn show_popup(&mut self, popup: Option<&Popup>);
    fn viewport(&self) -> Viewport;
}

/// Owns a surface for the lifetime of one view.
pub struct SurfaceGuard<S: MapSurface> {
    surface: S,
}

impl<S: MapSurface> SurfaceGuard<S> {
    pub fn new(mut surface: S, sink: PointerSink) -> Self {
        surface.attach(sink);
        Self { surface }
    }
}

impl<S: MapSurface> Deref for SurfaceGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.surface
    }
}

impl<S: MapSurface> DerefMut for SurfaceGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: MapSurface> Drop for SurfaceGuard<S> {
    fn drop(&mut self) {
        self.surface.show_popup(None);
        self.surface.detach();
        debug!("Surface detached");
    }
}

// ============================================================================
// Headless surface
// ============================================================================

#[derive(Debug, Default)]
struct HeadlessState {
    features: Vec<MapFeature>,
    routes: Vec<RenderedRoute>,
    popup: Option<Popup>,
    viewport: Option<Viewport>,
    sink: Option<PointerSink>,
    directives: Vec<ViewDirective>,
    batches: usize,
}

/// In-memory surface. Clones share state, so a test can keep one and hand the other
/// to the view.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    state: Arc<Mutex<HeadlessState>>,
    initial: Viewport,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState::default())),
            initial: viewport,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulates a click. False when no view is attached or its inbox is full.
    pub fn click(&self, pixel: Pixel) -> bool {
        match &self.lock().sink {
            Some(sink) => sink.send(pixel),
            None => false,
        }
    }

    /// Clicks wherever `coord` is currently drawn.
    pub fn click_at(&self, coord: Coordinate) -> bool {
        let pixel = self.viewport().to_pixel(coord);
        self.click(pixel)
    }

    /// Rendered features, bottom to top.
    pub fn features(&self) -> Vec<MapFeature> {
        self.lock().features.clone()
    }

    pub fn routes(&self) -> Vec<RenderedRoute> {
        self.lock().routes.clone()
    }

    pub fn popup(&self) -> Option<Popup> {
        self.lock().popup.clone()
    }

    pub fn directives(&self) -> Vec<ViewDirective> {
        self.lock().directives.clone()
    }

    /// Number of non-empty feature batches applied so far.
    pub fn batches(&self) -> usize {
        self.lock().batches
    }

    pub fn is_attached(&self) -> bool {
        self.lock().sink.is_some()
    }
}

impl MapSurface for HeadlessSurface {
    fn attach(&mut self, sink: PointerSink) {
        self.lock().sink = Some(sink);
    }

    fn detach(&mut self) {
        self.lock().sink = None;
    }

    fn apply_features(&mut self, batch: &FeatureBatch) {
        let mut state = self.lock();
        state.features.retain(|feature| !batch.removed.contains(&feature.key()));
        state.features.extend(batch.added.iter().cloned());
        state.batches += 1;
    }

    fn set_routes(&mut self, routes: &[RenderedRoute]) {
        self.lock().routes = routes.to_vec();
    }

    fn apply_view(&mut self, directive: &ViewDirective) {
        let mut state = self.lock();
        let current = state.viewport.unwrap_or(self.initial);
        state.viewport = Some(match *directive {
            ViewDirective::Fit { center, zoom, .. } => Viewport { center, zoom, ..current },
            ViewDirective::CenterOn { center, .. } => Viewport { center, ..current },
        });
        state.directives.push(*directive);
    }

    fn show_popup(&mut self, popup: Option<&Popup>) {
        self.lock().popup = popup.cloned();
    }

    fn viewport(&self) -> Viewport {
        self.lock().viewport.unwrap_or(self.initial)
    }
}
