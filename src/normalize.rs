//! Canonical comparison keys for area labels.
//!
//! Labels for the same physical area arrive from three sources (the map
//! authoring tool, the spreadsheet and the external oracle system) with
//! different accents, casing and spacing. Every comparison between them goes
//! through [`CanonicalKey`]:
//! - Unicode canonical decomposition (NFD)
//! - Combining marks stripped
//! - Uppercased
//! - Leading/trailing whitespace trimmed, inner whitespace runs replaced by `_`

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalized label used as the sole basis for equality between sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// The key of absent or blank labels.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Normalizes an optional raw label. Absent input yields the empty key.
///
/// # Examples
///
/// ```
/// use floorplan_inventory::normalize::normalize;
///
/// assert_eq!(normalize(Some("Área Norte")).as_str(), "AREA_NORTE");
/// assert!(normalize(None).is_empty());
/// ```
#[must_use]
pub fn normalize(raw: Option<&str>) -> CanonicalKey {
    raw.map_or_else(CanonicalKey::empty, canonical_key)
}

/// Normalizes a raw label into its [`CanonicalKey`].
#[must_use]
pub fn canonical_key(raw: &str) -> CanonicalKey {
    // Uppercasing can reintroduce combining marks (e.g. U+01F0), so marks are
    // stripped again after the case mapping.
    let upper: String = strip_marks(raw).to_uppercase();
    let folded = strip_marks(&upper);

    let mut key = String::with_capacity(folded.len());
    for (idx, word) in folded.split_whitespace().enumerate() {
        if idx > 0 {
            key.push('_');
        }
        key.push_str(word);
    }
    CanonicalKey(key)
}

fn strip_marks(raw: &str) -> String {
    raw.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Returns `true` when two raw labels name the same area.
#[must_use]
pub fn same_area(left: &str, right: &str) -> bool {
    canonical_key(left) == canonical_key(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_collapses_whitespace() {
        assert_eq!(canonical_key("Área Norte").as_str(), "AREA_NORTE");
        assert_eq!(canonical_key("  área   norte ").as_str(), "AREA_NORTE");
        assert_eq!(canonical_key("AREA_NORTE").as_str(), "AREA_NORTE");
        assert_eq!(canonical_key("Almacén\tGeneral").as_str(), "ALMACEN_GENERAL");
        assert_eq!(canonical_key("Oficina 2").as_str(), "OFICINA_2");
    }

    #[test]
    fn absent_and_blank_inputs_yield_empty_key() {
        assert!(normalize(None).is_empty());
        assert!(normalize(Some("")).is_empty());
        assert!(normalize(Some(" \t\n")).is_empty());
        assert!(canonical_key("\u{0301}\u{0308}").is_empty());
        assert_eq!(normalize(None), normalize(Some("")));
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Área Norte",
            "  lobby ",
            "Locación",
            "WH-07",
            "ǰ-dock",
            "straße 5",
            "ÅNGSTRÖM  lab",
            "",
            "\u{00A0}Recepción\u{00A0}",
        ];
        for sample in samples {
            let once = canonical_key(sample);
            let twice = canonical_key(once.as_str());
            assert_eq!(once, twice, "normalizing {sample:?} twice changed the key");
        }
    }

    #[test]
    fn same_area_ignores_label_drift() {
        assert!(same_area("Almacén", "ALMACEN"));
        assert!(same_area("Oficina  2", "oficina_2"));
        assert!(!same_area("Oficina 2", "Oficina 3"));
    }
}
