use crate::model::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Drivers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub String);

impl From<&str> for DriverId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DriverId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the driver location table, joined with the driver's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLocation {
    pub driver_id: DriverId,
    /// `None` when the row has no usable position.
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn active_by_default() -> bool {
    true
}

impl DriverLocation {
    pub fn new(driver_id: impl Into<DriverId>, coordinate: Coordinate) -> Self {
        Self {
            driver_id: driver_id.into(),
            coordinate: Some(coordinate),
            is_active: true,
            updated_at: Utc::now(),
            full_name: None,
            phone: None,
        }
    }

    pub fn named(mut self, full_name: impl Into<String>, phone: Option<&str>) -> Self {
        self.full_name = Some(full_name.into());
        self.phone = phone.map(str::to_string);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// The position, if present and valid.
    pub fn position(&self) -> Option<Coordinate> {
        self.coordinate.and_then(Coordinate::validated)
    }
}
