use super::surface::FeatureBatch;
use crate::model::{FeatureKey, MapFeature};
use std::collections::{HashMap, HashSet};

/// Owns the authoritative rendered feature list, in render order (last is topmost).
#[derive(Debug, Default)]
pub struct FeatureSynchronizer {
    rendered: Vec<MapFeature>,
}

impl FeatureSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> &[MapFeature] {
        &self.rendered
    }

    pub fn get(&self, key: &FeatureKey) -> Option<&MapFeature> {
        self.rendered.iter().find(|feature| &feature.key() == key)
    }

    /// Diffs `desired` against what is rendered and returns the batch that gets the
    /// surface there. Unchanged features keep their position; changed ones are removed
    /// and re-added on top; duplicate keys in `desired` keep the first occurrence.
    pub fn sync(&mut self, desired: Vec<MapFeature>) -> FeatureBatch {
        let mut seen = HashSet::new();
        let desired: Vec<MapFeature> = desired
            .into_iter()
            .filter(|feature| feature.coordinate.is_valid() && seen.insert(feature.key()))
            .collect();
        let wanted: HashMap<FeatureKey, &MapFeature> = desired.iter().map(|f| (f.key(), f)).collect();

        let mut kept = Vec::with_capacity(desired.len());
        let mut removed = Vec::new();
        for feature in self.rendered.drain(..) {
            let key = feature.key();
            match wanted.get(&key) {
                Some(next) if **next == feature => kept.push(feature),
                _ => removed.push(key),
            }
        }

        let kept_keys: HashSet<FeatureKey> = kept.iter().map(MapFeature::key).collect();
        let added: Vec<MapFeature> = desired
            .iter()
            .filter(|feature| !kept_keys.contains(&feature.key()))
            .cloned()
            .collect();

        kept.extend(added.iter().cloned());
        self.rendered = kept;
        FeatureBatch { added, removed }
    }
}
