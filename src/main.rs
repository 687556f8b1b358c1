//! Scripted walk through one delivery against in-memory stores and a headless map.
//!
//! Pass a config file path as the first argument to override the defaults; routing
//! stays off unless an API key is configured (`DISPATCH__ROUTING__API_KEY`).

use delivery_dispatch::config::load_config;
use delivery_dispatch::lifecycle::{setup_tracing, DispatchSystem};
use delivery_dispatch::map::{HeadlessSurface, Viewport};
use delivery_dispatch::model::{Contact, Coordinate, DriverLocation, DriverRef, Order, OrderStatus, OrderType, RestaurantId, RestaurantRef};
use delivery_dispatch::order_actor::summary;
use delivery_dispatch::registry::{ChangeEvent, ChangeKind};
use delivery_dispatch::store::{MemoryLocationStore, MemoryOrderStore};
use delivery_dispatch::view::ViewScope;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(path.as_deref()).map_err(|e| e.to_string())?;
    let view_config = config.view.clone();

    let order_store = Arc::new(MemoryOrderStore::new());
    let locations = Arc::new(MemoryLocationStore::new(vec![
        DriverLocation::new("d-7", Coordinate::new(-7.90, 31.70)).named("Youssef", Some("+212611111111")),
        DriverLocation::new("d-9", Coordinate::new(-7.62, 33.55)).named("Salma", None),
    ]));

    let mut system =
        DispatchSystem::new(config, order_store.clone(), locations.clone()).map_err(|e| e.to_string())?;

    let order = Order::new(
        "o-1001",
        OrderType::Delivery,
        Contact {
            name: "Amina".to_string(),
            phone: Some("+212600000000".to_string()),
        },
        12.5,
    )
    .with_delivery("12 Rue Ibn Sina", Coordinate::new(-7.98, 31.63))
    .with_restaurant(RestaurantRef {
        id: RestaurantId::from("r-1"),
        name: "Dar Tajine".to_string(),
        address: None,
        coordinate: Some(Coordinate::new(-7.60, 33.57)),
    });
    let order_id = order.id.clone();

    let tracked = system.order_client.track_order(order).await.map_err(|e| e.to_string())?;
    info!(alert = %summary(&tracked), "New order");

    let surface = HeadlessSurface::new(Viewport::new(
        view_config.default_center,
        view_config.default_zoom,
        view_config.width,
        view_config.height,
    ));
    let view = system
        .open_view(ViewScope::Order(order_id.clone()), surface.clone())
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("order_processing");
    let result = async {
        info!("Preparing order");
        let client = &system.order_client;
        client.transition(&order_id, OrderStatus::Preparing).await?;
        client
            .assign_driver(&order_id, DriverRef::new("d-7"))
            .await?;
        client.transition(&order_id, OrderStatus::Ready).await?;
        client.transition(&order_id, OrderStatus::OutForDelivery).await
    }
    .instrument(span)
    .await;

    match result {
        Ok(order) => info!(order_id = %order.id, status = %order.status, "Order on its way"),
        Err(e) => error!(error = %e, "Order processing failed"),
    }

    // The driver moves; the push feed only says "something changed".
    locations.upsert(DriverLocation::new("d-7", Coordinate::new(-7.95, 31.65)).named("Youssef", Some("+212611111111")));
    system
        .notifier()
        .notify(ChangeEvent::driver_locations(ChangeKind::Update))
        .await
        .map_err(|e| e.to_string())?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = view.snapshot().await.map_err(|e| e.to_string())?;
    let features: Vec<String> = snapshot.features.iter().map(|f| f.key().to_string()).collect();
    info!(
        ?features,
        routes = snapshot.routes.len(),
        directives = surface.directives().len(),
        "Map state"
    );

    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}
