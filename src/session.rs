//! Session-scoped state: the loaded dataset and map, the cached area index
//! and the current selection.

use std::sync::Arc;

use crate::dataset::{ColumnSpec, Dataset};
use crate::error::{Error, Result};
use crate::map::MapSource;
use crate::normalize::{CanonicalKey, canonical_key};
use crate::resolver::{AreaIndex, Resolution};

/// Selection lifecycle of one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Selected { raw: String, key: CanonicalKey },
}

impl Selection {
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Selected { raw, .. } => Some(raw.as_str()),
        }
    }

    /// Canonical key of the selected area.
    #[must_use]
    pub const fn key(&self) -> Option<&CanonicalKey> {
        match self {
            Self::Unselected => None,
            Self::Selected { key, .. } => Some(key),
        }
    }
}

/// Owns the inputs of one viewing session.
///
/// The index is rebuilt lazily after any load and reused for every click in
/// between.
#[derive(Debug, Default)]
pub struct Session {
    spec: ColumnSpec,
    dataset: Option<Arc<Dataset>>,
    map: Option<MapSource>,
    index: Option<AreaIndex>,
    selection: Selection,
    generation: u64,
}

impl Session {
    #[must_use]
    pub fn new(spec: ColumnSpec) -> Self {
        Self {
            spec,
            ..Self::default()
        }
    }

    /// Replaces the dataset. The selection is kept.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(Arc::new(dataset));
        self.invalidate();
    }

    /// Replaces the map. The selection is kept.
    pub fn load_map(&mut self, map: MapSource) {
        self.map = Some(map);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.index = None;
        self.generation += 1;
    }

    /// Number of loads so far; changes whenever the cached index is dropped.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn map(&self) -> Option<&MapSource> {
        self.map.as_ref()
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The area index for the loaded dataset, built on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] without a dataset, or
    /// [`Error::MissingColumn`] if the dataset has no location column.
    pub fn index(&mut self) -> Result<&AreaIndex> {
        if self.index.is_none() {
            let dataset = self
                .dataset
                .clone()
                .ok_or(Error::NotLoaded { what: "dataset" })?;
            self.index = Some(AreaIndex::build(dataset, &self.spec)?);
        }
        self.index.as_ref().ok_or(Error::NotLoaded { what: "area index" })
    }

    /// Selects the area identified by a raw clicked id.
    pub fn click(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        let key = canonical_key(&raw);
        self.selection = Selection::Selected { raw, key };
    }

    /// Returns to the unselected state.
    pub fn reset(&mut self) {
        self.selection = Selection::Unselected;
    }

    /// The index built by the last [`Session::index`] call, unless a load
    /// has dropped it since.
    #[must_use]
    pub const fn cached_index(&self) -> Option<&AreaIndex> {
        self.index.as_ref()
    }

    /// Resolves the current selection with the cached index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] if the index has not been built since the
    /// last load.
    pub fn resolve_selection(&self) -> Result<Resolution<'_>> {
        let index = self
            .cached_index()
            .ok_or(Error::NotLoaded { what: "area index" })?;
        Ok(index.resolve(&self.map.as_ref(), self.selection.raw()))
    }

    /// Builds the index if needed and resolves the current selection.
    ///
    /// # Errors
    ///
    /// Propagates index build failures; see [`Session::index`].
    pub fn current(&mut self) -> Result<Resolution<'_>> {
        self.index()?;
        self.resolve_selection()
    }
}
