use serde::Serialize;

use crate::error::{ColumnRole, Error, Result};
use crate::logger::log_warn;
use crate::normalize::{CanonicalKey, canonical_key};

const LOCATION_ALIASES: &[&str] = &["LOCATION", "LOCACION", "UBICACION", "LOCALIZACION"];
const MAP_ID_ALIASES: &[&str] = &["SVG_ID", "MAP_ID", "ID_SVG", "AREA_ID", "ID_AREA"];
const SECONDARY_ALIASES: &[&str] = &[
    "ORACLE_LOCATION",
    "ORACLE_LOCACION",
    "UBICACION_ORACLE",
    "ORACLE",
];
const NAME_ALIASES: &[&str] = &[
    "NOMBRE",
    "NAME",
    "NOMBRE_COMPLETO",
    "EMPLEADO",
    "ACTIVO",
    "ASSET",
];
const ACTIVITY_ALIASES: &[&str] = &[
    "ACTIVIDAD",
    "ACTIVITY",
    "ROL",
    "ROLE",
    "CATEGORIA",
    "CATEGORY",
];

/// Optional explicit column names for each role. Roles left unset are
/// detected from built-in header aliases.
#[derive(Debug, Clone, Default)]
pub struct ColumnSpec {
    location: Option<String>,
    map_id: Option<String>,
    secondary: Option<String>,
    name: Option<String>,
    activity: Option<String>,
}

impl ColumnSpec {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            location: None,
            map_id: None,
            secondary: None,
            name: None,
            activity: None,
        }
    }

    #[must_use]
    pub fn with_location_column(mut self, name: impl Into<String>) -> Self {
        self.location = non_blank(name.into());
        self
    }

    #[must_use]
    pub fn with_map_id_column(mut self, name: impl Into<String>) -> Self {
        self.map_id = non_blank(name.into());
        self
    }

    #[must_use]
    pub fn with_secondary_column(mut self, name: impl Into<String>) -> Self {
        self.secondary = non_blank(name.into());
        self
    }

    #[must_use]
    pub fn with_name_column(mut self, name: impl Into<String>) -> Self {
        self.name = non_blank(name.into());
        self
    }

    #[must_use]
    pub fn with_activity_column(mut self, name: impl Into<String>) -> Self {
        self.activity = non_blank(name.into());
        self
    }

    /// Maps each role onto a column of `headers`.
    ///
    /// All header comparisons are made on canonical keys, so `Locación`,
    /// `LOCACION` and ` locacion ` are the same column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] when no header is recognisable as the
    /// location column, or when an explicitly requested column is absent.
    pub fn detect(&self, headers: &[String]) -> Result<ColumnMap> {
        let keys: Vec<CanonicalKey> = headers.iter().map(|h| canonical_key(h)).collect();

        let location = find_role(
            ColumnRole::Location,
            self.location.as_deref(),
            LOCATION_ALIASES,
            headers,
            &keys,
        )?
        .ok_or_else(|| missing(ColumnRole::Location, None, headers))?;

        Ok(ColumnMap {
            location,
            map_id: find_role(
                ColumnRole::MapId,
                self.map_id.as_deref(),
                MAP_ID_ALIASES,
                headers,
                &keys,
            )?,
            secondary: find_role(
                ColumnRole::SecondaryLocation,
                self.secondary.as_deref(),
                SECONDARY_ALIASES,
                headers,
                &keys,
            )?,
            name: find_role(
                ColumnRole::Name,
                self.name.as_deref(),
                NAME_ALIASES,
                headers,
                &keys,
            )?,
            activity: find_role(
                ColumnRole::Activity,
                self.activity.as_deref(),
                ACTIVITY_ALIASES,
                headers,
                &keys,
            )?,
        })
    }
}

/// Column positions resolved for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub location: usize,
    pub map_id: Option<usize>,
    pub secondary: Option<usize>,
    pub name: Option<usize>,
    pub activity: Option<usize>,
}

impl ColumnMap {
    /// Position of the column playing `role`, if the dataset has one.
    #[must_use]
    pub const fn position(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Location => Some(self.location),
            ColumnRole::MapId => self.map_id,
            ColumnRole::SecondaryLocation => self.secondary,
            ColumnRole::Name => self.name,
            ColumnRole::Activity => self.activity,
        }
    }
}

fn find_role(
    role: ColumnRole,
    requested: Option<&str>,
    aliases: &[&str],
    headers: &[String],
    keys: &[CanonicalKey],
) -> Result<Option<usize>> {
    if let Some(requested) = requested {
        let wanted = canonical_key(requested);
        return keys
            .iter()
            .position(|key| *key == wanted)
            .map(Some)
            .ok_or_else(|| missing(role, Some(requested), headers));
    }

    let mut candidates = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| aliases.contains(&key.as_str()))
        .map(|(idx, _)| idx);
    let first = candidates.next();
    if let Some(first) = first
        && let Some(other) = candidates.next()
    {
        log_warn(&format!(
            "columns '{}' and '{}' both look like the {role} column; using '{}'",
            headers[first], headers[other], headers[first]
        ));
    }
    Ok(first)
}

fn missing(role: ColumnRole, requested: Option<&str>, headers: &[String]) -> Error {
    Error::MissingColumn {
        role,
        requested: requested.map(str::to_owned),
        available: headers.to_vec(),
    }
}

fn non_blank(name: String) -> Option<String> {
    if name.trim().is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn detects_accented_location_header() {
        let map = ColumnSpec::new()
            .detect(&headers(&["Nombre", "Locación", "Actividad"]))
            .unwrap();
        assert_eq!(map.location, 1);
        assert_eq!(map.name, Some(0));
        assert_eq!(map.activity, Some(2));
        assert_eq!(map.map_id, None);
        assert_eq!(map.secondary, None);
    }

    #[test]
    fn secondary_location_is_not_mistaken_for_primary() {
        let map = ColumnSpec::new()
            .detect(&headers(&["SVG_ID", "Oracle Location", " location "]))
            .unwrap();
        assert_eq!(map.location, 2);
        assert_eq!(map.map_id, Some(0));
        assert_eq!(map.secondary, Some(1));
    }

    #[test]
    fn missing_location_column_is_an_error() {
        let err = ColumnSpec::new()
            .detect(&headers(&["Nombre", "Actividad"]))
            .unwrap_err();
        match err {
            Error::MissingColumn {
                role, available, ..
            } => {
                assert_eq!(role, ColumnRole::Location);
                assert_eq!(available, headers(&["Nombre", "Actividad"]));
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn explicit_columns_are_matched_case_insensitively() {
        let map = ColumnSpec::new()
            .with_location_column("sitio")
            .with_map_id_column("codigo mapa")
            .detect(&headers(&["Nombre", "SITIO", "Código Mapa"]))
            .unwrap();
        assert_eq!(map.location, 1);
        assert_eq!(map.map_id, Some(2));
    }

    #[test]
    fn explicit_column_that_does_not_exist_is_an_error() {
        let err = ColumnSpec::new()
            .with_secondary_column("Oracle")
            .detect(&headers(&["Location"]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                role: ColumnRole::SecondaryLocation,
                requested: Some(_),
                ..
            }
        ));
    }
}
