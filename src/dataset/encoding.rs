use std::borrow::Cow;

use encoding_rs::{Encoding, WINDOWS_1252};
use simdutf8::basic;

use crate::error::{Error, Result};
use crate::logger::log_warn;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Resolves a user-supplied character-set label (`latin1`, `cp1252`,
/// `utf_8`, ...) to an `encoding_rs` encoding.
///
/// # Errors
///
/// Returns [`Error::Encoding`] when the label is not recognised.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    resolve_label(label).ok_or_else(|| Error::Encoding {
        encoding: Cow::Owned(label.to_owned()),
        details: Cow::from("unknown character-set label"),
    })
}

fn resolve_label(name: &str) -> Option<&'static Encoding> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }

    try_encoding_label(trimmed).or_else(|| {
        let lower = trimmed.to_ascii_lowercase();
        try_encoding_label(&lower)
            .or_else(|| try_encoding_label(&lower.replace('_', "-")))
            .or_else(|| spreadsheet_compat_encoding(&lower))
    })
}

fn try_encoding_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
}

fn spreadsheet_compat_encoding(lower_label: &str) -> Option<&'static Encoding> {
    match lower_label {
        "ansi" | "cp1252" | "windows1252" => Some(WINDOWS_1252),
        "macroman" => Encoding::for_label(b"macintosh"),
        _ => None,
    }
}

/// Decodes raw file bytes into text.
///
/// With an explicit encoding the bytes are decoded strictly. Otherwise valid
/// UTF-8 (with or without BOM) is used as-is and anything else is decoded as
/// Windows-1252, the default of spreadsheet CSV exports.
///
/// # Errors
///
/// Returns [`Error::Encoding`] when an explicitly requested encoding cannot
/// decode the input without replacement characters.
pub fn decode_text<'a>(bytes: &'a [u8], encoding: Option<&'static Encoding>) -> Result<Cow<'a, str>> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if let Some(encoding) = encoding {
        let (decoded, had_errors) = encoding.decode_without_bom_handling(body);
        if had_errors {
            return Err(Error::Encoding {
                encoding: Cow::from(encoding.name()),
                details: Cow::from("input contains byte sequences invalid for this encoding"),
            });
        }
        return Ok(decoded);
    }

    if let Ok(text) = basic::from_utf8(body) {
        return Ok(Cow::Borrowed(text));
    }

    log_warn("input is not valid UTF-8; decoding as windows-1252");
    let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(body);
    Ok(decoded)
}
