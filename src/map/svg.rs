use std::borrow::Cow;
use std::fmt::Display;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::MapElement;
use crate::error::{Error, Result};

/// Attributes of one addressable element, gathered before its `<title>`
/// child (if any) has been read.
#[derive(Debug, Default)]
struct Candidate {
    id: Option<String>,
    area_tag: Option<String>,
    data_title: Option<String>,
    child_title: Option<String>,
    aria_label: Option<String>,
    inkscape_label: Option<String>,
}

impl Candidate {
    fn into_element(self) -> Option<MapElement> {
        let id = self.id.or_else(|| self.area_tag.clone())?;
        let title = self
            .data_title
            .or(self.child_title)
            .or(self.aria_label)
            .or(self.inkscape_label);
        Some(MapElement {
            id,
            area_tag: self.area_tag,
            title,
        })
    }
}

fn map_error(err: impl Display) -> Error {
    Error::Map {
        details: Cow::Owned(err.to_string()),
    }
}

fn non_blank(value: Cow<'_, str>) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn read_candidate(start: &BytesStart<'_>) -> Result<Option<Candidate>> {
    let mut candidate = Candidate::default();
    for attr in start.attributes() {
        let attr = attr.map_err(map_error)?;
        let slot = match attr.key.as_ref() {
            b"id" => &mut candidate.id,
            b"data-area" => &mut candidate.area_tag,
            b"data-title" => &mut candidate.data_title,
            b"aria-label" => &mut candidate.aria_label,
            b"inkscape:label" => &mut candidate.inkscape_label,
            _ => continue,
        };
        *slot = non_blank(attr.unescape_value().map_err(map_error)?);
    }
    if candidate.id.is_none() && candidate.area_tag.is_none() {
        return Ok(None);
    }
    Ok(Some(candidate))
}

/// Walks SVG markup and returns every element carrying an `id` or
/// `data-area` attribute, in document order.
pub(super) fn collect_elements(svg: &str) -> Result<Vec<MapElement>> {
    let mut reader = Reader::from_str(svg);
    let mut candidates: Vec<Candidate> = Vec::new();
    // For each open element, the candidate it registered (if any).
    let mut open: Vec<Option<usize>> = Vec::new();
    // Candidate owning the `<title>` being read, plus its text so far.
    let mut title: Option<(usize, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if start.local_name().as_ref() == b"title"
                    && let Some(Some(parent)) = open.last()
                {
                    title = Some((*parent, String::new()));
                }
                let registered = read_candidate(&start)?.map(|candidate| {
                    candidates.push(candidate);
                    candidates.len() - 1
                });
                open.push(registered);
            }
            Event::Empty(start) => {
                if let Some(candidate) = read_candidate(&start)? {
                    candidates.push(candidate);
                }
            }
            Event::Text(text) => {
                if let Some((_, buffer)) = title.as_mut() {
                    buffer.push_str(&text.unescape().map_err(map_error)?);
                }
            }
            Event::CData(data) => {
                if let Some((_, buffer)) = title.as_mut() {
                    buffer.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(end) => {
                open.pop();
                if end.local_name().as_ref() == b"title"
                    && let Some((owner, text)) = title.take()
                {
                    let slot = &mut candidates[owner].child_title;
                    if slot.is_none() {
                        *slot = non_blank(Cow::Owned(text));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(candidates
        .into_iter()
        .filter_map(Candidate::into_element)
        .collect())
}
