//! Pointer handling: coordinate picking or feature inspection, depending on mode.

use super::projection::{Pixel, Viewport};
use crate::model::{Coordinate, FeatureKind, MapFeature, RestaurantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Picker,
    #[default]
    Inspector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PopupAction {
    ViewMenu { restaurant_id: RestaurantId },
    Call { phone: String },
}

/// Info bubble anchored on a selected feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub feature: MapFeature,
    pub anchor: Coordinate,
    pub actions: Vec<PopupAction>,
    pub autopan_ms: u64,
}

pub fn popup_actions(kind: &FeatureKind) -> Vec<PopupAction> {
    match kind {
        FeatureKind::Restaurant { restaurant_id, .. } => vec![PopupAction::ViewMenu {
            restaurant_id: restaurant_id.clone(),
        }],
        FeatureKind::Driver { phone: Some(phone), .. } | FeatureKind::User { phone: Some(phone), .. } => {
            vec![PopupAction::Call { phone: phone.clone() }]
        }
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Picker mode: the clicked position.
    Picked(Coordinate),
    Selected(Popup),
    /// Nothing hit; the previous selection was dropped.
    Cleared,
    /// Nothing hit and nothing was selected, or the click could not be resolved.
    Ignored,
}

#[derive(Debug)]
pub struct InteractionController {
    mode: InteractionMode,
    hit_radius_px: f64,
    autopan_ms: u64,
    selection: Option<Popup>,
}

impl InteractionController {
    pub fn new(mode: InteractionMode, hit_radius_px: f64, autopan_ms: u64) -> Self {
        Self {
            mode,
            hit_radius_px,
            autopan_ms,
            selection: None,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn selection(&self) -> Option<&Popup> {
        self.selection.as_ref()
    }

    /// Switching mode drops the selection. Returns the dropped popup, if any.
    pub fn set_mode(&mut self, mode: InteractionMode) -> Option<Popup> {
        if self.mode == mode {
            return None;
        }
        self.mode = mode;
        self.selection.take()
    }

    pub fn clear(&mut self) -> Option<Popup> {
        self.selection.take()
    }

    /// Resolves a click against the rendered features, topmost (last rendered) first.
    pub fn handle_pointer(&mut self, pixel: Pixel, viewport: &Viewport, rendered: &[MapFeature]) -> PointerOutcome {
        match self.mode {
            InteractionMode::Picker => match viewport.from_pixel(pixel).validated() {
                Some(coord) => PointerOutcome::Picked(coord),
                None => PointerOutcome::Ignored,
            },
            InteractionMode::Inspector => {
                let hit = rendered.iter().rev().find(|feature| {
                    feature.kind.is_inspectable()
                        && viewport.to_pixel(feature.coordinate).distance(&pixel) <= self.hit_radius_px
                });
                match hit {
                    Some(feature) => {
                        let popup = Popup {
                            feature: feature.clone(),
                            anchor: feature.coordinate,
                            actions: popup_actions(&feature.kind),
                            autopan_ms: self.autopan_ms,
                        };
                        self.selection = Some(popup.clone());
                        PointerOutcome::Selected(popup)
                    }
                    None if self.selection.take().is_some() => PointerOutcome::Cleared,
                    None => PointerOutcome::Ignored,
                }
            }
        }
    }

    /// Drops the selection if its feature disappeared or changed. Returns true when it did.
    pub fn reconcile(&mut self, rendered: &[MapFeature]) -> bool {
        match &self.selection {
            Some(popup) if !rendered.contains(&popup.feature) => {
                self.selection = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DriverId, OrderId};

    fn viewport() -> Viewport {
        Viewport::new(Coordinate::new(-7.98, 31.63), 14.0, 800.0, 600.0)
    }

    fn restaurant(at: Coordinate) -> MapFeature {
        MapFeature {
            kind: FeatureKind::Restaurant {
                restaurant_id: RestaurantId::from("r1"),
                name: "Dar".into(),
                address: None,
            },
            coordinate: at,
        }
    }

    fn driver(at: Coordinate) -> MapFeature {
        MapFeature {
            kind: FeatureKind::Driver {
                driver_id: DriverId::from("d1"),
                name: "Youssef".into(),
                phone: Some("+212611111111".into()),
                fleet: false,
            },
            coordinate: at,
        }
    }

    #[test]
    fn topmost_feature_wins() {
        let here = Coordinate::new(-7.98, 31.63);
        let rendered = vec![restaurant(here), driver(here)];
        let mut controller = InteractionController::new(InteractionMode::Inspector, 16.0, 250);

        let pixel = viewport().to_pixel(here);
        match controller.handle_pointer(Pixel::new(pixel.x + 5.0, pixel.y), &viewport(), &rendered) {
            PointerOutcome::Selected(popup) => {
                assert!(matches!(popup.feature.kind, FeatureKind::Driver { .. }));
                assert_eq!(popup.actions, vec![PopupAction::Call { phone: "+212611111111".into() }]);
                assert_eq!(popup.autopan_ms, 250);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn miss_clears_selection_once() {
        let here = Coordinate::new(-7.98, 31.63);
        let rendered = vec![restaurant(here)];
        let mut controller = InteractionController::new(InteractionMode::Inspector, 16.0, 250);
        let pixel = viewport().to_pixel(here);

        assert!(matches!(controller.handle_pointer(pixel, &viewport(), &rendered), PointerOutcome::Selected(_)));
        let far = Pixel::new(pixel.x + 40.0, pixel.y);
        assert_eq!(controller.handle_pointer(far, &viewport(), &rendered), PointerOutcome::Cleared);
        assert_eq!(controller.handle_pointer(far, &viewport(), &rendered), PointerOutcome::Ignored);
    }

    #[test]
    fn picker_marker_is_not_inspectable() {
        let here = Coordinate::new(-7.98, 31.63);
        let rendered = vec![MapFeature {
            kind: FeatureKind::Picker,
            coordinate: here,
        }];
        let mut controller = InteractionController::new(InteractionMode::Inspector, 16.0, 250);
        let pixel = viewport().to_pixel(here);
        assert_eq!(controller.handle_pointer(pixel, &viewport(), &rendered), PointerOutcome::Ignored);
    }

    #[test]
    fn picker_mode_unprojects_the_click() {
        let mut controller = InteractionController::new(InteractionMode::Picker, 16.0, 250);
        match controller.handle_pointer(Pixel::new(400.0, 300.0), &viewport(), &[]) {
            PointerOutcome::Picked(coord) => {
                assert!((coord.lon + 7.98).abs() < 1e-9);
                assert!((coord.lat - 31.63).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn selection_follows_the_rendered_set() {
        let here = Coordinate::new(-7.98, 31.63);
        let user = MapFeature {
            kind: FeatureKind::User {
                name: "Amina".into(),
                phone: None,
                order_id: OrderId::from("o1"),
            },
            coordinate: here,
        };
        let mut controller = InteractionController::new(InteractionMode::Inspector, 16.0, 250);
        let pixel = viewport().to_pixel(here);
        controller.handle_pointer(pixel, &viewport(), std::slice::from_ref(&user));

        assert!(!controller.reconcile(std::slice::from_ref(&user)));
        let moved = MapFeature {
            coordinate: Coordinate::new(-7.97, 31.63),
            ..user
        };
        assert!(controller.reconcile(&[moved]));
        assert!(controller.selection().is_none());
        assert!(controller.set_mode(InteractionMode::Picker).is_none());
    }
}
