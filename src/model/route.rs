use crate::model::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::{Hash, Hasher};

pub const ROUTE_WIDTH: f32 = 6.0;
pub const TO_RESTAURANT_COLOR: &str = "#8b5cf6";
pub const TO_CUSTOMER_COLOR: &str = "#22c55e";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteProfile {
    #[default]
    DrivingCar,
    DrivingHgv,
    CyclingRegular,
    FootWalking,
}

impl RouteProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteProfile::DrivingCar => "driving-car",
            RouteProfile::DrivingHgv => "driving-hgv",
            RouteProfile::CyclingRegular => "cycling-regular",
            RouteProfile::FootWalking => "foot-walking",
        }
    }
}

impl Display for RouteProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered origin/destination pair. Equality and hashing use the exact bit
/// patterns of the coordinates, so `-0.0` and `0.0` are different keys.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteQuery {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub profile: RouteProfile,
}

impl RouteQuery {
    /// Returns `None` unless both ends are valid coordinates.
    pub fn new(origin: Coordinate, destination: Coordinate, profile: RouteProfile) -> Option<Self> {
        Some(Self {
            origin: origin.validated()?,
            destination: destination.validated()?,
            profile,
        })
    }

    fn bits(&self) -> [u64; 4] {
        [
            self.origin.lon.to_bits(),
            self.origin.lat.to_bits(),
            self.destination.lon.to_bits(),
            self.destination.lat.to_bits(),
        ]
    }
}

impl PartialEq for RouteQuery {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits() && self.profile == other.profile
    }
}

impl Eq for RouteQuery {}

impl Hash for RouteQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
        self.profile.hash(state);
    }
}

impl Display for RouteQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{:.5},{:.5}]->[{:.5},{:.5}]",
            self.profile, self.origin.lon, self.origin.lat, self.destination.lon, self.destination.lat
        )
    }
}

/// A route path as a list of positions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline(pub Vec<Coordinate>);

impl Polyline {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }
}

/// Which leg of the delivery a route overlay shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    ToRestaurant,
    ToCustomer,
}

impl RouteKind {
    pub fn color(self) -> &'static str {
        match self {
            RouteKind::ToRestaurant => TO_RESTAURANT_COLOR,
            RouteKind::ToCustomer => TO_CUSTOMER_COLOR,
        }
    }

    pub fn width(self) -> f32 {
        ROUTE_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn queries_are_value_keyed() {
        let a = RouteQuery::new(Coordinate::new(-7.98, 31.63), Coordinate::new(-7.60, 33.57), RouteProfile::DrivingCar).unwrap();
        let b = RouteQuery::new(Coordinate::new(-7.98, 31.63), Coordinate::new(-7.60, 33.57), RouteProfile::DrivingCar).unwrap();
        let reversed = RouteQuery::new(Coordinate::new(-7.60, 33.57), Coordinate::new(-7.98, 31.63), RouteProfile::DrivingCar).unwrap();
        let walking = RouteQuery { profile: RouteProfile::FootWalking, ..a };

        let keys: HashSet<_> = [a, b, reversed, walking].into_iter().collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn invalid_endpoints_make_no_query() {
        assert!(RouteQuery::new(Coordinate::new(f64::NAN, 0.0), Coordinate::new(1.0, 1.0), RouteProfile::DrivingCar).is_none());
        assert!(RouteQuery::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, f64::INFINITY), RouteProfile::DrivingCar).is_none());
    }

    #[test]
    fn profile_uses_provider_spelling() {
        assert_eq!(RouteProfile::default().to_string(), "driving-car");
        assert_eq!(RouteKind::ToCustomer.color(), "#22c55e");
        assert_eq!(RouteKind::ToRestaurant.width(), 6.0);
    }
}
