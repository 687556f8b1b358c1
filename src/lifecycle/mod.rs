//! Runtime orchestration and lifecycle management.
//!
//! - [`DispatchSystem`] starts the order actor and the location registry, opens
//!   views on demand and tears everything down in order.
//! - [`setup_tracing`] initializes the tracing/logging infrastructure.

pub mod dispatch_system;
pub mod tracing;

pub use dispatch_system::*;
pub use tracing::*;
