//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate. Every
//! actor logs its lifecycle at `info`, each message at `debug`, and every failure it
//! absorbs (a registry refresh, a route fetch) at `warn`.
//!
//! The compact format hides the module prefix (`with_target(false)`); levels come
//! from `RUST_LOG`:
//!
//! ```bash
//! # Lifecycle and accepted transitions
//! RUST_LOG=info cargo run
//!
//! # Every command, cycle and route request
//! RUST_LOG=debug cargo run
//!
//! # Only the view actors
//! RUST_LOG=delivery_dispatch::view=debug cargo run
//! ```
//!
//! ## What a delivery looks like
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Dispatch system started routing=true
//! INFO Drivers refreshed drivers=2 version=1
//! INFO Tracked entity_type="Order" id=o-1001 size=1
//! INFO View opened scope=order:o-1001
//! INFO transition: Sending transition to actor order_id=OrderId("o-1001") to=OutForDelivery
//! INFO transition: Status changed order_id=o-1001 from=ready to=out-for-delivery
//! INFO transition: Action ok entity_type="Order" id=o-1001
//! ```
//!
//! **With `RUST_LOG=debug`** the same run also shows each refresh cycle:
//!
//! ```text
//! DEBUG View refreshed trigger="order" cycle=3 added=1 removed=1 routes=0
//! DEBUG Route requested query=driving-car [-7.90000,31.70000]->[-7.98000,31.63000] ticket=2
//! DEBUG Route ready query=driving-car [-7.90000,31.70000]->[-7.98000,31.63000] points=42
//! ```

/// Installs the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
