//! Free-text narrowing of a matched record set by name and activity.

use crate::dataset::{AreaRecord, ColumnMap};
use crate::normalize::{CanonicalKey, canonical_key};

/// Substring filters compared on canonical keys, so `jose` finds `José`.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    name: Option<CanonicalKey>,
    activity: Option<CanonicalKey>,
}

impl RecordFilter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            activity: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, text: &str) -> Self {
        self.name = needle(text);
        self
    }

    #[must_use]
    pub fn with_activity(mut self, text: &str) -> Self {
        self.activity = needle(text);
        self
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.name.is_some() || self.activity.is_some()
    }

    /// Returns `true` when `record` passes every active filter. A filter on
    /// a column the dataset does not have excludes nothing.
    #[must_use]
    pub fn matches(&self, columns: &ColumnMap, record: &AreaRecord) -> bool {
        contains(self.name.as_ref(), columns.name, record)
            && contains(self.activity.as_ref(), columns.activity, record)
    }
}

fn needle(text: &str) -> Option<CanonicalKey> {
    let key = canonical_key(text);
    if key.is_empty() { None } else { Some(key) }
}

fn contains(needle: Option<&CanonicalKey>, column: Option<usize>, record: &AreaRecord) -> bool {
    match (needle, column) {
        (Some(needle), Some(column)) => canonical_key(record.field(column))
            .as_str()
            .contains(needle.as_str()),
        _ => true,
    }
}
