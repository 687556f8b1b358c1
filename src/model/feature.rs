//! Map features: the markers a dispatch view puts on the surface.
//!
//! Styling is dispatched on [`FeatureKind`], never on a role string.

use crate::model::{Coordinate, DriverId, OrderId, RestaurantId};
use serde::Serialize;
use std::fmt::Display;

pub const WHITE: &str = "#ffffff";
pub const USER_STROKE: &str = "#3b82f6";
pub const DRIVER_STROKE: &str = "#8b5cf6";
pub const FLEET_STROKE: &str = "#6b7280";
pub const RESTAURANT_STROKE: &str = "#e11d48";
pub const PICKER_STROKE: &str = "#ef4444";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureRole {
    Restaurant,
    User,
    Driver,
    Picker,
}

impl Display for FeatureRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FeatureRole::Restaurant => "restaurant",
            FeatureRole::User => "user",
            FeatureRole::Driver => "driver",
            FeatureRole::Picker => "picker",
        })
    }
}

/// Stroke and fill colors of a circle marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    pub stroke: &'static str,
    pub fill: &'static str,
}

impl Style {
    const fn stroked(stroke: &'static str) -> Self {
        Self { stroke, fill: WHITE }
    }
}

/// Role-specific label payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum FeatureKind {
    User {
        name: String,
        phone: Option<String>,
        order_id: OrderId,
    },
    Driver {
        driver_id: DriverId,
        name: String,
        phone: Option<String>,
        /// Unassigned drivers shown in the fleet view.
        fleet: bool,
    },
    Restaurant {
        restaurant_id: RestaurantId,
        name: String,
        address: Option<String>,
    },
    Picker,
}

impl FeatureKind {
    pub fn role(&self) -> FeatureRole {
        match self {
            FeatureKind::User { .. } => FeatureRole::User,
            FeatureKind::Driver { .. } => FeatureRole::Driver,
            FeatureKind::Restaurant { .. } => FeatureRole::Restaurant,
            FeatureKind::Picker => FeatureRole::Picker,
        }
    }

    pub fn style(&self) -> Style {
        match self {
            FeatureKind::User { .. } => Style::stroked(USER_STROKE),
            FeatureKind::Driver { fleet: false, .. } => Style::stroked(DRIVER_STROKE),
            FeatureKind::Driver { fleet: true, .. } => Style::stroked(FLEET_STROKE),
            FeatureKind::Restaurant { .. } => Style::stroked(RESTAURANT_STROKE),
            FeatureKind::Picker => Style::stroked(PICKER_STROKE),
        }
    }

    /// Whether a click on this feature opens a popup.
    pub fn is_inspectable(&self) -> bool {
        !matches!(self, FeatureKind::Picker)
    }

    pub fn key(&self) -> FeatureKey {
        let discriminator = match self {
            FeatureKind::Driver { driver_id, .. } => Some(driver_id.to_string()),
            FeatureKind::Restaurant { restaurant_id, .. } => Some(restaurant_id.to_string()),
            FeatureKind::User { .. } | FeatureKind::Picker => None,
        };
        FeatureKey {
            role: self.role(),
            discriminator,
        }
    }
}

/// Identity of a feature across refresh cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FeatureKey {
    pub role: FeatureRole,
    pub discriminator: Option<String>,
}

impl Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.discriminator {
            Some(discriminator) => write!(f, "{}:{}", self.role, discriminator),
            None => write!(f, "{}", self.role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFeature {
    pub kind: FeatureKind,
    pub coordinate: Coordinate,
}

impl MapFeature {
    /// Builds a feature only when the coordinate is present and valid.
    pub fn new(kind: FeatureKind, coordinate: Option<Coordinate>) -> Option<Self> {
        Some(Self {
            kind,
            coordinate: coordinate?.validated()?,
        })
    }

    pub fn key(&self) -> FeatureKey {
        self.kind.key()
    }

    pub fn role(&self) -> FeatureRole {
        self.kind.role()
    }

    pub fn style(&self) -> Style {
        self.kind.style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(fleet: bool) -> FeatureKind {
        FeatureKind::Driver {
            driver_id: DriverId::from("d1"),
            name: "Youssef".into(),
            phone: None,
            fleet,
        }
    }

    #[test]
    fn styles_follow_the_role() {
        assert_eq!(driver(false).style().stroke, DRIVER_STROKE);
        assert_eq!(driver(true).style().stroke, FLEET_STROKE);
        assert_eq!(FeatureKind::Picker.style(), Style { stroke: PICKER_STROKE, fill: WHITE });
    }

    #[test]
    fn invalid_coordinates_produce_no_feature() {
        assert!(MapFeature::new(FeatureKind::Picker, Some(Coordinate::new(f64::NAN, 1.0))).is_none());
        assert!(MapFeature::new(FeatureKind::Picker, None).is_none());
        assert!(MapFeature::new(FeatureKind::Picker, Some(Coordinate::new(1.0, 1.0))).is_some());
    }

    #[test]
    fn keys_distinguish_repeatable_roles() {
        let a = FeatureKind::Restaurant {
            restaurant_id: RestaurantId::from("r1"),
            name: "A".into(),
            address: None,
        };
        let b = FeatureKind::Restaurant {
            restaurant_id: RestaurantId::from("r2"),
            name: "B".into(),
            address: None,
        };
        assert_ne!(a.key(), b.key());
        assert_eq!(driver(false).key(), driver(true).key());
        assert_eq!(FeatureKind::Picker.key().to_string(), "picker");
        assert!(!FeatureKind::Picker.is_inspectable());
    }
}
