use std::collections::HashSet;

use serde::Serialize;

use super::{AreaIndex, LabelSource};
use crate::map::MapSource;
use crate::normalize::{CanonicalKey, canonical_key};

/// How many dataset records a map element resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaCoverage {
    pub id: String,
    pub key: CanonicalKey,
    pub label: String,
    pub label_source: LabelSource,
    pub records: usize,
}

impl AreaIndex {
    /// Resolves every element of `map` as if it had been clicked, using its
    /// area tag when it has one.
    #[must_use]
    pub fn coverage(&self, map: &MapSource) -> Vec<AreaCoverage> {
        map.elements()
            .iter()
            .filter_map(|element| {
                let raw = element.area_tag.as_deref().unwrap_or(&element.id);
                let resolution = self.resolve(map, Some(raw));
                let label = resolution.area_label()?;
                Some(AreaCoverage {
                    id: element.id.clone(),
                    key: element.key(),
                    label: label.text.clone(),
                    label_source: label.source,
                    records: resolution.records().len(),
                })
            })
            .collect()
    }

    /// Primary location keys present in the dataset that no map element
    /// addresses, sorted.
    #[must_use]
    pub fn orphan_keys(&self, map: &MapSource) -> Vec<CanonicalKey> {
        let addressed: HashSet<CanonicalKey> = map
            .elements()
            .iter()
            .flat_map(|element| [canonical_key(&element.id), element.key()])
            .collect();
        self.location_keys()
            .into_iter()
            .filter(|key| !addressed.contains(*key))
            .cloned()
            .collect()
    }
}
