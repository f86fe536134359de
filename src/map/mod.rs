mod svg;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::logger::{log_warn, set_log_prefix};
use crate::normalize::{CanonicalKey, canonical_key};

/// An addressable element of the floor-plan drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapElement {
    /// The element's `id` attribute (falls back to its area tag).
    pub id: String,
    /// Explicit `data-area` attribute, when present.
    pub area_tag: Option<String>,
    /// Friendly title embedded in the drawing.
    pub title: Option<String>,
}

impl MapElement {
    #[must_use]
    pub fn key(&self) -> CanonicalKey {
        canonical_key(self.area_tag.as_deref().unwrap_or(&self.id))
    }
}

/// Source of friendly area titles keyed by raw clicked identifier.
///
/// `None` means the source has no title for the identifier; it is never
/// replaced by the identifier itself.
pub trait TitleLookup {
    fn title_for(&self, raw_id: &str) -> Option<&str>;
}

/// A lookup that never knows any title.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTitles;

impl TitleLookup for NoTitles {
    fn title_for(&self, _raw_id: &str) -> Option<&str> {
        None
    }
}

impl TitleLookup for HashMap<String, String> {
    fn title_for(&self, raw_id: &str) -> Option<&str> {
        self.get(raw_id).map(String::as_str)
    }
}

impl<T: TitleLookup + ?Sized> TitleLookup for Option<&T> {
    fn title_for(&self, raw_id: &str) -> Option<&str> {
        self.and_then(|inner| inner.title_for(raw_id))
    }
}

/// Parsed floor-plan map: its clickable elements and their titles.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    elements: Vec<MapElement>,
    by_raw: HashMap<String, usize>,
    by_key: HashMap<CanonicalKey, usize>,
}

impl MapSource {
    /// Parses SVG markup.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Map`] when the markup is not well formed.
    pub fn parse(svg: &str) -> Result<Self> {
        Ok(Self::from_elements(svg::collect_elements(svg)?))
    }

    /// Reads and parses an SVG file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let _prefix = set_log_prefix(path.display().to_string());
        let svg = fs::read_to_string(path)?;
        Self::parse(&svg)
    }

    /// Builds a map from already-extracted elements. Later duplicates of an
    /// identifier are dropped.
    #[must_use]
    pub fn from_elements(elements: impl IntoIterator<Item = MapElement>) -> Self {
        let mut map = Self::default();
        for element in elements {
            if map.by_raw.contains_key(&element.id) {
                log_warn(&format!(
                    "duplicate map element id '{}'; keeping the first",
                    element.id
                ));
                continue;
            }
            let idx = map.elements.len();
            map.by_raw.insert(element.id.clone(), idx);
            if let Some(tag) = &element.area_tag {
                map.by_raw.entry(tag.clone()).or_insert(idx);
            }
            map.by_key.entry(canonical_key(&element.id)).or_insert(idx);
            map.by_key.entry(element.key()).or_insert(idx);
            map.elements.push(element);
        }
        map
    }

    #[must_use]
    pub fn elements(&self) -> &[MapElement] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element addressed by a raw clicked identifier: exact `id` or
    /// `data-area` first, then canonical-key match.
    #[must_use]
    pub fn element(&self, raw_id: &str) -> Option<&MapElement> {
        self.by_raw
            .get(raw_id)
            .or_else(|| self.by_key.get(&canonical_key(raw_id)))
            .map(|&idx| &self.elements[idx])
    }
}

impl TitleLookup for MapSource {
    fn title_for(&self, raw_id: &str) -> Option<&str> {
        self.element(raw_id)?.title.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, tag: Option<&str>, title: Option<&str>) -> MapElement {
        MapElement {
            id: id.to_owned(),
            area_tag: tag.map(str::to_owned),
            title: title.map(str::to_owned),
        }
    }

    #[test]
    fn title_lookup_distinguishes_missing_from_equal_to_id() {
        let map = MapSource::from_elements([
            element("LOBBY", None, Some("Recepción")),
            element("R7", None, Some("R7")),
            element("PASILLO", None, None),
        ]);
        assert_eq!(map.title_for("LOBBY"), Some("Recepción"));
        assert_eq!(map.title_for("R7"), Some("R7"));
        assert_eq!(map.title_for("PASILLO"), None);
        assert_eq!(map.title_for("ZZZ"), None);
    }

    #[test]
    fn lookup_falls_back_to_canonical_key_and_area_tag() {
        let map = MapSource::from_elements([element(
            "path12",
            Some("Almacén"),
            Some("Almacén general"),
        )]);
        assert_eq!(map.title_for("path12"), Some("Almacén general"));
        assert_eq!(map.title_for("Almacén"), Some("Almacén general"));
        assert_eq!(map.title_for("almacen"), Some("Almacén general"));
        assert_eq!(map.elements()[0].key().as_str(), "ALMACEN");
    }

    #[test]
    fn duplicate_ids_keep_first_element() {
        let map = MapSource::from_elements([
            element("A1", None, Some("first")),
            element("A1", None, Some("second")),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.title_for("A1"), Some("first"));
    }

    #[test]
    fn optional_lookup_and_no_titles() {
        let map = MapSource::from_elements([element("A1", None, Some("Uno"))]);
        assert_eq!(Some(&map).title_for("A1"), Some("Uno"));
        assert_eq!(None::<&MapSource>.title_for("A1"), None);
        assert_eq!(NoTitles.title_for("A1"), None);
    }
}
