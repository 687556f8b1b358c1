//! Web Mercator math for a 256 px tile pyramid.

use crate::model::Coordinate;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Pixel) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Position in world pixels at zoom 0, in `[0, 256)`.
pub fn project(coord: Coordinate) -> Pixel {
    let lat = coord.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (coord.lon + 180.0) / 360.0 * TILE_SIZE;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * TILE_SIZE;
    Pixel::new(x, y)
}

pub fn unproject(world: Pixel) -> Coordinate {
    let lon = world.x / TILE_SIZE * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * world.y / TILE_SIZE);
    let lat = n.sinh().atan().to_degrees();
    Coordinate::new(lon, lat)
}

pub fn scale(zoom: f64) -> f64 {
    2f64.powf(zoom)
}

/// What the surface currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: Coordinate, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    pub fn to_pixel(&self, coord: Coordinate) -> Pixel {
        let k = scale(self.zoom);
        let point = project(coord);
        let center = project(self.center);
        Pixel::new(
            (point.x - center.x) * k + self.width / 2.0,
            (point.y - center.y) * k + self.height / 2.0,
        )
    }

    pub fn from_pixel(&self, pixel: Pixel) -> Coordinate {
        let k = scale(self.zoom);
        let center = project(self.center);
        unproject(Pixel::new(
            center.x + (pixel.x - self.width / 2.0) / k,
            center.y + (pixel.y - self.height / 2.0) / k,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn center_maps_to_the_middle() {
        let viewport = Viewport::new(Coordinate::new(13.388, 52.517), 9.5, 800.0, 600.0);
        let pixel = viewport.to_pixel(viewport.center);
        assert!(close(pixel.x, 400.0) && close(pixel.y, 300.0));
    }

    #[test]
    fn pixels_unproject_back() {
        let viewport = Viewport::new(Coordinate::new(-7.98, 31.63), 12.0, 800.0, 600.0);
        let coord = Coordinate::new(-7.95, 31.65);
        let back = viewport.from_pixel(viewport.to_pixel(coord));
        assert!(close(back.lon, coord.lon) && close(back.lat, coord.lat));
    }

    #[test]
    fn north_is_up() {
        let viewport = Viewport::new(Coordinate::new(0.0, 0.0), 3.0, 256.0, 256.0);
        assert!(viewport.to_pixel(Coordinate::new(0.0, 10.0)).y < 128.0);
        assert!(viewport.to_pixel(Coordinate::new(10.0, 0.0)).x > 128.0);
    }
}
