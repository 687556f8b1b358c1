//! Generic actor framework for tracked resources.
//!
//! This module provides the core building blocks for creating type-safe actor systems
//! that own resource entities and serialize every mutation through custom actions.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that manages entities
//! - [`ResourceClient`] - Type-safe, cloneable handle for sending requests
//! - [`FrameworkError`] - Common error types
//! - [`ShutdownSignal`] - Cooperative stop for actors that listen to more than one input
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod core;
pub mod mock;
pub mod shutdown;

// Re-export core types for convenience
pub use core::*;
pub use shutdown::{ShutdownListener, ShutdownSignal};
