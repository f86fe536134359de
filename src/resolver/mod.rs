//! Area index: reconciles clicked map identifiers with dataset rows.
//!
//! A record is reachable under every non-empty canonical key derived from
//! its map-id, primary location and secondary location columns. Lookups
//! union all three sub-indices and return records in dataset order.

mod coverage;
mod label;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use smallvec::SmallVec;

pub use coverage::AreaCoverage;
pub use label::{AreaLabel, LabelSource, resolve_label};

use crate::dataset::{AreaRecord, ColumnMap, ColumnSpec, Dataset};
use crate::error::Result;
use crate::logger::log_warn;
use crate::map::TitleLookup;
use crate::normalize::{CanonicalKey, canonical_key, normalize};

type Bucket = SmallVec<[usize; 4]>;

/// Canonical keys derived from one record's location-bearing columns.
///
/// Optional keys are `None` when the dataset has no such column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedKeys {
    pub map_id: Option<CanonicalKey>,
    pub location: CanonicalKey,
    pub secondary: Option<CanonicalKey>,
}

/// Lookup structure from canonical area keys to dataset records.
///
/// Built once per dataset load and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AreaIndex {
    dataset: Arc<Dataset>,
    columns: ColumnMap,
    keys: Vec<DerivedKeys>,
    by_map_id: HashMap<CanonicalKey, Bucket>,
    by_location: HashMap<CanonicalKey, Bucket>,
    by_secondary: HashMap<CanonicalKey, Bucket>,
}

impl AreaIndex {
    /// Detects the key columns of `dataset` and indexes every record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] when no column is recognisable
    /// as the primary location column.
    pub fn build(dataset: Arc<Dataset>, spec: &ColumnSpec) -> Result<Self> {
        let columns = spec.detect(dataset.headers())?;
        Ok(Self::with_columns(dataset, columns))
    }

    /// Indexes `dataset` using already-resolved column positions.
    #[must_use]
    pub fn with_columns(dataset: Arc<Dataset>, columns: ColumnMap) -> Self {
        let mut index = Self {
            keys: Vec::with_capacity(dataset.len()),
            by_map_id: HashMap::new(),
            by_location: HashMap::new(),
            by_secondary: HashMap::new(),
            dataset,
            columns,
        };

        for (row, record) in index.dataset.records().iter().enumerate() {
            let keys = DerivedKeys {
                map_id: columns.map_id.map(|idx| canonical_key(record.field(idx))),
                location: canonical_key(record.field(columns.location)),
                secondary: columns.secondary.map(|idx| canonical_key(record.field(idx))),
            };

            // Blank primary locations stay reachable under the empty key.
            index
                .by_location
                .entry(keys.location.clone())
                .or_default()
                .push(row);
            if let Some(key) = keys.map_id.as_ref().filter(|key| !key.is_empty()) {
                index.by_map_id.entry(key.clone()).or_default().push(row);
            }
            if let Some(key) = keys.secondary.as_ref().filter(|key| !key.is_empty()) {
                index.by_secondary.entry(key.clone()).or_default().push(row);
            }
            index.keys.push(keys);
        }

        let unlabeled = index.bucket_len(&CanonicalKey::empty());
        if unlabeled > 0 {
            log_warn(&format!(
                "{unlabeled} records have an empty location and cannot be selected from the map"
            ));
        }
        index
    }

    fn bucket_len(&self, key: &CanonicalKey) -> usize {
        self.by_location.get(key).map_or(0, SmallVec::len)
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub const fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Keys derived for the record at dataset position `row`.
    #[must_use]
    pub fn derived_keys(&self, row: usize) -> Option<&DerivedKeys> {
        self.keys.get(row)
    }

    /// Records reachable under `key` on any key column, in dataset order.
    #[must_use]
    pub fn lookup(&self, key: &CanonicalKey) -> Vec<&AreaRecord> {
        let mut rows: Vec<usize> = [&self.by_map_id, &self.by_location, &self.by_secondary]
            .into_iter()
            .filter_map(|sub| sub.get(key))
            .flatten()
            .copied()
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows.into_iter()
            .filter_map(|row| self.dataset.record(row))
            .collect()
    }

    /// Records whose primary location is blank.
    #[must_use]
    pub fn unlabeled(&self) -> Vec<&AreaRecord> {
        self.by_location
            .get(&CanonicalKey::empty())
            .into_iter()
            .flatten()
            .filter_map(|&row| self.dataset.record(row))
            .collect()
    }

    /// Distinct non-empty primary location keys, sorted.
    #[must_use]
    pub fn location_keys(&self) -> Vec<&CanonicalKey> {
        let mut keys: Vec<&CanonicalKey> =
            self.by_location.keys().filter(|key| !key.is_empty()).collect();
        keys.sort_unstable();
        keys
    }

    /// Resolves a clicked map identifier to its records and display label.
    ///
    /// An absent click is [`Resolution::Unselected`]. A click that matches no
    /// record (including one whose key is empty) is [`Resolution::NoData`].
    pub fn resolve<T>(&self, titles: &T, raw_click: Option<&str>) -> Resolution<'_>
    where
        T: TitleLookup + ?Sized,
    {
        let Some(raw) = raw_click else {
            return Resolution::Unselected;
        };
        let key = normalize(Some(raw));
        let records = if key.is_empty() {
            Vec::new()
        } else {
            self.lookup(&key)
        };

        let location = self.columns.location;
        let label = resolve_label(
            titles,
            raw,
            records.iter().map(|record| record.field(location)),
        );

        if records.is_empty() {
            Resolution::NoData {
                raw: raw.to_owned(),
                key,
                label,
            }
        } else {
            Resolution::Matched {
                raw: raw.to_owned(),
                key,
                label,
                records,
            }
        }
    }
}

/// Outcome of resolving one click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// No area has been clicked yet.
    Unselected,
    /// An area was clicked but no dataset record belongs to it.
    NoData {
        raw: String,
        key: CanonicalKey,
        label: AreaLabel,
    },
    /// Records belonging to the clicked area, in dataset order.
    Matched {
        raw: String,
        key: CanonicalKey,
        label: AreaLabel,
        records: Vec<&'a AreaRecord>,
    },
}

impl<'a> Resolution<'a> {
    /// Display label; empty when nothing is selected.
    #[must_use]
    pub fn label(&self) -> &str {
        self.area_label().map_or("", |label| label.text.as_str())
    }

    #[must_use]
    pub const fn area_label(&self) -> Option<&AreaLabel> {
        match self {
            Self::Unselected => None,
            Self::NoData { label, .. } | Self::Matched { label, .. } => Some(label),
        }
    }

    #[must_use]
    pub const fn key(&self) -> Option<&CanonicalKey> {
        match self {
            Self::Unselected => None,
            Self::NoData { key, .. } | Self::Matched { key, .. } => Some(key),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[&'a AreaRecord] {
        match self {
            Self::Matched { records, .. } => records,
            Self::Unselected | Self::NoData { .. } => &[],
        }
    }

    #[must_use]
    pub const fn is_selected(&self) -> bool {
        !matches!(self, Self::Unselected)
    }

    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Keeps only the matched records accepted by `keep`. A match whose
    /// records are all rejected becomes [`Resolution::NoData`].
    ///
    /// The label names the clicked area and is left as resolved from the
    /// unfiltered match, even when the record it was read from is dropped.
    #[must_use]
    pub fn retain<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&AreaRecord) -> bool,
    {
        match self {
            Self::Matched {
                raw,
                key,
                label,
                mut records,
            } => {
                records.retain(|record| keep(record));
                if records.is_empty() {
                    Self::NoData { raw, key, label }
                } else {
                    Self::Matched {
                        raw,
                        key,
                        label,
                        records,
                    }
                }
            }
            other => other,
        }
    }
}
