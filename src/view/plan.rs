//! What a view should show, computed from scratch on every cycle.

use crate::map::InteractionMode;
use crate::model::{
    Coordinate, DriverLocation, FeatureKind, MapFeature, Order, RestaurantRef, RouteKind, RouteProfile, RouteQuery,
};
use crate::order_actor::RoutePolicy;
use crate::registry::DriverSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Show the customer marker even when no route to the customer is active.
    pub show_customer: bool,
    /// Show every active driver, not only the assigned one.
    pub show_fleet: bool,
}

/// Inputs of one planning pass.
pub struct PlanInput<'a> {
    pub order: Option<&'a Order>,
    pub drivers: &'a DriverSnapshot,
    pub restaurants: &'a [RestaurantRef],
    pub picker: Option<Coordinate>,
    pub mode: InteractionMode,
    pub options: ViewOptions,
}

fn restaurant_feature(restaurant: &RestaurantRef) -> Option<MapFeature> {
    MapFeature::new(
        FeatureKind::Restaurant {
            restaurant_id: restaurant.id.clone(),
            name: restaurant.name.clone(),
            address: restaurant.address.clone(),
        },
        restaurant.coordinate,
    )
}

fn fleet_feature(driver: &DriverLocation) -> Option<MapFeature> {
    MapFeature::new(
        FeatureKind::Driver {
            driver_id: driver.driver_id.clone(),
            name: driver.full_name.clone().unwrap_or_else(|| driver.driver_id.to_string()),
            phone: driver.phone.clone(),
            fleet: true,
        },
        driver.position(),
    )
}

/// Desired features in insertion order: restaurants, customer, assigned driver,
/// fleet, picker. Anything without a valid coordinate is left out.
pub fn desired_features(input: &PlanInput<'_>) -> Vec<MapFeature> {
    let policy = input.order.map(RoutePolicy::for_order).unwrap_or_default();
    let mut features = Vec::new();

    if let Some(order) = input.order {
        if policy.shows_restaurant() {
            features.extend(order.restaurant.as_ref().and_then(restaurant_feature));
        }
    }
    if !policy.any() {
        features.extend(input.restaurants.iter().filter_map(restaurant_feature));
    }

    let assigned = input.order.and_then(|order| order.driver.as_ref());
    if let Some(order) = input.order {
        if order.order_type.is_delivery() && (policy.to_customer || input.options.show_customer) {
            features.extend(MapFeature::new(
                FeatureKind::User {
                    name: order.customer.name.clone(),
                    phone: order.customer.phone.clone(),
                    order_id: order.id.clone(),
                },
                order.delivery,
            ));
        }
    }

    if let Some(driver) = assigned {
        let location = input.drivers.get(&driver.id);
        features.extend(MapFeature::new(
            FeatureKind::Driver {
                driver_id: driver.id.clone(),
                name: driver
                    .full_name
                    .clone()
                    .or_else(|| location.and_then(|l| l.full_name.clone()))
                    .unwrap_or_else(|| driver.display_name().to_string()),
                phone: driver.phone.clone().or_else(|| location.and_then(|l| l.phone.clone())),
                fleet: false,
            },
            location.and_then(DriverLocation::position),
        ));
    }

    if input.options.show_fleet {
        features.extend(
            input
                .drivers
                .drivers
                .iter()
                .filter(|driver| assigned.map_or(true, |a| a.id != driver.driver_id))
                .filter_map(fleet_feature),
        );
    }

    if input.mode == InteractionMode::Picker {
        features.extend(MapFeature::new(FeatureKind::Picker, input.picker));
    }

    features
}

/// The single route leg worth drawing: driver to customer while out for delivery,
/// otherwise driver to restaurant once a driver is on the way.
pub fn desired_routes(order: &Order, drivers: &DriverSnapshot, profile: RouteProfile) -> Vec<(RouteKind, RouteQuery)> {
    let policy = RoutePolicy::for_order(order);
    let Some(origin) = order.driver.as_ref().and_then(|driver| drivers.position(&driver.id)) else {
        return Vec::new();
    };

    let leg = if policy.to_customer {
        order.delivery.map(|to| (RouteKind::ToCustomer, to))
    } else if policy.to_restaurant {
        order
            .restaurant
            .as_ref()
            .and_then(|restaurant| restaurant.coordinate)
            .map(|to| (RouteKind::ToRestaurant, to))
    } else {
        None
    };

    leg.and_then(|(kind, to)| RouteQuery::new(origin, to, profile).map(|query| (kind, query)))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contact, DriverRef, FeatureRole, OrderStatus, OrderType, RestaurantId};

    const CUSTOMER: Coordinate = Coordinate { lon: -7.98, lat: 31.63 };
    const RESTAURANT: Coordinate = Coordinate { lon: -7.60, lat: 33.57 };

    fn drivers() -> DriverSnapshot {
        DriverSnapshot {
            drivers: vec![
                DriverLocation::new("d1", Coordinate::new(-7.90, 31.70)).named("Youssef", Some("+212611111111")),
                DriverLocation::new("d2", Coordinate::new(-7.85, 31.60)),
            ],
            version: 1,
            refreshed_at: None,
        }
    }

    fn order(status: OrderStatus) -> Order {
        Order::new(
            "o1",
            OrderType::Delivery,
            Contact {
                name: "Amina".into(),
                phone: None,
            },
            12.5,
        )
        .with_status(status)
        .with_delivery("Rue 1", CUSTOMER)
        .with_restaurant(RestaurantRef {
            id: RestaurantId::from("r1"),
            name: "Dar".into(),
            address: None,
            coordinate: Some(RESTAURANT),
        })
        .with_driver(DriverRef::new("d1"))
    }

    fn roles(order: &Order, snapshot: &DriverSnapshot, options: ViewOptions) -> Vec<FeatureRole> {
        desired_features(&PlanInput {
            order: Some(order),
            drivers: snapshot,
            restaurants: &[],
            picker: None,
            mode: InteractionMode::Inspector,
            options,
        })
        .iter()
        .map(MapFeature::role)
        .collect()
    }

    #[test]
    fn ready_order_shows_restaurant_and_driver() {
        let snapshot = drivers();
        let order = order(OrderStatus::Ready);
        assert_eq!(
            roles(&order, &snapshot, ViewOptions::default()),
            vec![FeatureRole::Restaurant, FeatureRole::Driver]
        );

        let routes = desired_routes(&order, &snapshot, RouteProfile::DrivingCar);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].0, RouteKind::ToRestaurant);
        assert_eq!(routes[0].1.destination, RESTAURANT);
    }

    #[test]
    fn out_for_delivery_swaps_restaurant_for_customer() {
        let snapshot = drivers();
        let order = order(OrderStatus::OutForDelivery);
        assert_eq!(
            roles(&order, &snapshot, ViewOptions::default()),
            vec![FeatureRole::User, FeatureRole::Driver]
        );

        let routes = desired_routes(&order, &snapshot, RouteProfile::DrivingCar);
        assert_eq!(routes.iter().map(|(kind, _)| *kind).collect::<Vec<_>>(), vec![RouteKind::ToCustomer]);
    }

    #[test]
    fn assigned_driver_takes_name_from_the_registry() {
        let snapshot = drivers();
        let features = desired_features(&PlanInput {
            order: Some(&order(OrderStatus::Ready)),
            drivers: &snapshot,
            restaurants: &[],
            picker: None,
            mode: InteractionMode::Inspector,
            options: ViewOptions::default(),
        });
        match &features[1].kind {
            FeatureKind::Driver { name, phone, fleet, .. } => {
                assert_eq!(name, "Youssef");
                assert_eq!(phone.as_deref(), Some("+212611111111"));
                assert!(!fleet);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn driver_without_position_has_no_feature_and_no_route() {
        let snapshot = DriverSnapshot::default();
        let order = order(OrderStatus::Ready);
        assert_eq!(roles(&order, &snapshot, ViewOptions::default()), vec![FeatureRole::Restaurant]);
        assert!(desired_routes(&order, &snapshot, RouteProfile::DrivingCar).is_empty());
    }

    #[test]
    fn invalid_customer_coordinate_is_dropped() {
        let snapshot = drivers();
        let mut order = order(OrderStatus::OutForDelivery);
        order.delivery = Some(Coordinate::new(f64::NAN, 31.63));
        assert_eq!(roles(&order, &snapshot, ViewOptions::default()), vec![FeatureRole::Driver]);
        assert!(desired_routes(&order, &snapshot, RouteProfile::DrivingCar).is_empty());
    }

    #[test]
    fn fleet_excludes_the_assigned_driver_and_picker_goes_last() {
        let snapshot = drivers();
        let order = order(OrderStatus::Preparing);
        let features = desired_features(&PlanInput {
            order: Some(&order),
            drivers: &snapshot,
            restaurants: &[],
            picker: Some(Coordinate::new(-7.99, 31.62)),
            mode: InteractionMode::Picker,
            options: ViewOptions {
                show_customer: true,
                show_fleet: true,
            },
        });
        let keys: Vec<String> = features.iter().map(|f| f.key().to_string()).collect();
        assert_eq!(keys, vec!["restaurant:r1", "user", "driver:d1", "driver:d2", "picker"]);
        assert_eq!(features[3].style().stroke, crate::model::FLEET_STROKE);
    }
}
