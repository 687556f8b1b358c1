use super::projection::{project, scale, unproject, Pixel, Viewport, TILE_SIZE};
use crate::config::ViewConfig;
use crate::model::Coordinate;
use serde::Serialize;

/// Camera move requested from the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewDirective {
    Fit {
        center: Coordinate,
        zoom: f64,
        duration_ms: u64,
    },
    CenterOn {
        center: Coordinate,
        duration_ms: u64,
    },
}

impl ViewDirective {
    pub fn center(&self) -> Coordinate {
        match self {
            ViewDirective::Fit { center, .. } | ViewDirective::CenterOn { center, .. } => *center,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingPolicy {
    /// Top, right, bottom, left, in pixels.
    pub padding: [f64; 4],
    pub max_zoom: f64,
    pub duration_ms: u64,
}

impl Default for FramingPolicy {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}

impl FramingPolicy {
    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            padding: config.padding,
            max_zoom: config.max_zoom,
            duration_ms: config.animation_ms,
        }
    }

    /// Fits every valid coordinate inside the padded viewport. `None` when there is nothing to fit.
    pub fn fit(&self, coords: &[Coordinate], viewport: &Viewport) -> Option<ViewDirective> {
        let points: Vec<Pixel> = coords.iter().copied().filter(Coordinate::is_valid).map(project).collect();
        let first = points.first()?;

        let (mut min, mut max) = (*first, *first);
        for p in &points {
            min = Pixel::new(min.x.min(p.x), min.y.min(p.y));
            max = Pixel::new(max.x.max(p.x), max.y.max(p.y));
        }

        let [top, right, bottom, left] = self.padding;
        let usable_w = (viewport.width - left - right).max(1.0);
        let usable_h = (viewport.height - top - bottom).max(1.0);
        let span_x = max.x - min.x;
        let span_y = max.y - min.y;

        let zoom = if span_x <= f64::EPSILON && span_y <= f64::EPSILON {
            self.max_zoom
        } else {
            let zx = if span_x > f64::EPSILON { (usable_w / span_x).log2() } else { f64::INFINITY };
            let zy = if span_y > f64::EPSILON { (usable_h / span_y).log2() } else { f64::INFINITY };
            zx.min(zy).min(self.max_zoom).max(0.0)
        };

        // Shift the center so the box sits in the middle of the padded area.
        let k = scale(zoom);
        let offset_x = (left - right) / 2.0 / k;
        let offset_y = (top - bottom) / 2.0 / k;
        let mid = Pixel::new((min.x + max.x) / 2.0 - offset_x, (min.y + max.y) / 2.0 - offset_y);
        let center = unproject(Pixel::new(mid.x.rem_euclid(TILE_SIZE), mid.y.clamp(0.0, TILE_SIZE)));

        Some(ViewDirective::Fit {
            center,
            zoom,
            duration_ms: self.duration_ms,
        })
    }

    pub fn center_on(&self, coord: Coordinate) -> Option<ViewDirective> {
        Some(ViewDirective::CenterOn {
            center: coord.validated()?,
            duration_ms: self.duration_ms,
        })
    }
}
