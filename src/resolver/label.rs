use serde::Serialize;

use crate::map::TitleLookup;

/// Where a resolved area label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    MapTitle,
    Dataset,
    RawId,
}

/// Human-friendly name of a clicked area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaLabel {
    pub text: String,
    pub source: LabelSource,
}

/// Picks the display label for a clicked identifier.
///
/// Order: the map's embedded title for `raw_id`, then the first non-blank
/// dataset location value (verbatim), then `raw_id` itself.
pub fn resolve_label<'v, T, I>(titles: &T, raw_id: &str, dataset_values: I) -> AreaLabel
where
    T: TitleLookup + ?Sized,
    I: IntoIterator<Item = &'v str>,
{
    if let Some(title) = titles.title_for(raw_id) {
        return AreaLabel {
            text: title.to_owned(),
            source: LabelSource::MapTitle,
        };
    }
    if let Some(value) = dataset_values
        .into_iter()
        .find(|value| !value.trim().is_empty())
    {
        return AreaLabel {
            text: value.to_owned(),
            source: LabelSource::Dataset,
        };
    }
    AreaLabel {
        text: raw_id.to_owned(),
        source: LabelSource::RawId,
    }
}
