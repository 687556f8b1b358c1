//! # Coordinates
//!
//! Geographic positions in `[lon, lat]` order, the order used by the record store,
//! the routing provider and the map surface alike.
//!
//! Every position that reaches the map passes through [`Coordinate::is_valid`] first.
//! Upstream rows are frequently incomplete (missing geocoding, partial driver
//! records), so the decoding helpers here return `None` instead of failing and the
//! caller simply drops the feature.

use serde::{Deserialize, Serialize};

/// A `[lon, lat]` pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// True iff both components are finite (neither NaN nor infinite).
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Returns `Some(self)` when valid, `None` otherwise.
    pub fn validated(self) -> Option<Self> {
        self.is_valid().then_some(self)
    }

    /// Decodes a raw numeric tuple. Anything that is not exactly two finite numbers is rejected.
    pub fn from_slice(raw: &[f64]) -> Option<Self> {
        match raw {
            [lon, lat] => Self::new(*lon, *lat).validated(),
            _ => None,
        }
    }

    /// Decodes a JSON `[lon, lat]` array.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let items = value.as_array()?;
        let numbers: Option<Vec<f64>> = items.iter().map(serde_json::Value::as_f64).collect();
        Self::from_slice(&numbers?)
    }

    /// Decodes a pair of nullable `lng`/`lat` columns.
    pub fn from_parts(lon: Option<f64>, lat: Option<f64>) -> Option<Self> {
        Self::new(lon?, lat?).validated()
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coord: Coordinate) -> Self {
        coord.to_array()
    }
}

/// Validity predicate over an optional position, the shape most inputs arrive in.
pub fn is_valid(coord: Option<&Coordinate>) -> bool {
    coord.is_some_and(Coordinate::is_valid)
}
