//! # Delivery Dispatch
//!
//! > **The live core behind a restaurant dispatch screen.**
//!
//! This crate keeps delivery orders moving through their lifecycle, tracks where the
//! drivers are, and keeps a map in sync with both: which markers are on it, which
//! route is drawn, where the camera points, and what happens when someone clicks.
//!
//! ## 🏗️ Design Philosophy
//!
//! Every stateful component is an **actor**: one Tokio task, one inbox, state that
//! nobody else touches. Components talk through cloneable clients, broadcast events
//! and `watch` snapshots, never through shared locks.
//!
//! - **Orders** live in a generic [`ResourceActor`](framework::ResourceActor); the
//!   lifecycle rules live on [`Order`](model::Order) itself.
//! - **Driver positions** are owned by the [`registry`], which republishes an
//!   immutable [`DriverSnapshot`](registry::DriverSnapshot) after every refresh.
//! - **Views** ([`view`]) recompute what the map should show from scratch on every
//!   change and apply only the difference.
//!
//! ## 🚀 Core Concepts
//!
//! ### Derive, then diff
//! A view never patches the map by hand. Each refresh cycle builds the complete
//! desired feature list, lets [`FeatureSynchronizer`](map::FeatureSynchronizer) diff
//! it against what is rendered, and sends one [`FeatureBatch`](map::FeatureBatch).
//! Routes are evaluated after features, in the same cycle.
//!
//! ### Invalid positions disappear
//! Upstream rows are often incomplete. Any coordinate with a NaN or infinite
//! component is filtered out before it can become a marker, a route query or a pick.
//!
//! ### Network results can arrive late
//! Route fetches run in their own tasks. When the inputs move on, the fetch is
//! aborted, and any result that still arrives is checked against the live request
//! before it is drawn.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Each component has its own error enum ([`OrderError`](order_actor::OrderError),
//! [`RegistryError`](registry::RegistryError), [`RouteError`](routing::RouteError),
//! [`ViewError`](view::ViewError)). Lifecycle violations are returned to the caller;
//! network failures are logged and absorbed.
//!
//! ### 2. Async Context Injection
//! Actors receive their dependencies when they are started (`run(ctx)`), so stores
//! and route providers can be swapped for in-memory versions in tests.
//!
//! ### 3. Observability
//! `tracing` everywhere, with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic `ResourceActor<T>`, the shutdown signal and the `MockClient`.
//!
//! ### 2. The Orchestrator ([`lifecycle`])
//! [`DispatchSystem`](lifecycle::DispatchSystem) starts the actors, opens views and
//! shuts everything down.
//!
//! ### 3. The Interface ([`clients`], [`registry`], [`view`])
//! [`OrderClient`](clients::OrderClient), [`RegistryClient`](registry::RegistryClient)
//! and [`ViewClient`](view::ViewClient) hide the message passing.
//!
//! ### 4. The Domain ([`model`], [`order_actor`], [`routing`], [`map`])
//! Orders, drivers, coordinates, map features and routes; the transition table; the
//! route provider and cache; projection, framing and pointer handling.
//!
//! ### 5. The Edges ([`store`], [`config`])
//! Record-store traits with in-memory implementations, and layered configuration.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Scripted demo against in-memory stores and a headless map
//! RUST_LOG=info cargo run
//!
//! # With real routes
//! DISPATCH__ROUTING__API_KEY=... RUST_LOG=debug cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod map;
pub mod model;
pub mod order_actor;
pub mod registry;
pub mod routing;
pub mod store;
pub mod view;
