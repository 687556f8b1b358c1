//! Route computation and per-view route caching.

pub mod cache;
pub mod error;
pub mod provider;

pub use cache::{RouteCache, RouteCompletion, RouteStats, RouteStatus};
pub use error::RouteError;
pub use provider::{parse_directions, OpenRouteService, RouteProvider};
