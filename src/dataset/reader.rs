use std::fs;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use super::Dataset;
use super::encoding::{decode_text, resolve_encoding};
use crate::error::Result;
use crate::logger::{log_warn, set_log_prefix};

/// Configures how a delimited inventory export is read.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    delimiter: u8,
    encoding: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: b',',
            encoding: None,
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Forces a character set instead of auto-detecting UTF-8/Windows-1252.
    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.encoding = if label.trim().is_empty() {
            None
        } else {
            Some(label)
        };
        self
    }
}

impl Dataset {
    /// Reads a delimited file whose first row holds the column names.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, decoded or parsed.
    pub fn open(path: &Path, options: &LoadOptions) -> Result<Self> {
        let _prefix = set_log_prefix(path.display().to_string());
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes, options)
    }

    /// Reads delimited data from any reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, decoding or parsing fails.
    pub fn from_reader<R: Read>(mut reader: R, options: &LoadOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes, options)
    }

    /// Parses delimited data from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or parsing fails.
    pub fn from_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        let encoding = options
            .encoding
            .as_deref()
            .map(resolve_encoding)
            .transpose()?;
        let text = decode_text(bytes, encoding)?;
        Self::from_text(&text, options)
    }

    fn from_text(text: &str, options: &LoadOptions) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let mut rows = Vec::new();
        let mut ragged = 0usize;
        for record in reader.records() {
            let record = record?;
            if record.len() != headers.len() {
                ragged += 1;
            }
            // Spreadsheet exports end with blank lines padded by delimiters.
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_owned).collect::<Vec<_>>());
        }
        if ragged > 0 {
            log_warn(&format!(
                "{ragged} rows do not have {} fields; padded or truncated to the header width",
                headers.len()
            ));
        }

        Ok(Self::from_rows(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_headers_and_skips_blank_rows() {
        let data = "Nombre,Locación\nAna,Lobby\n,\nLuis,Oficina 2\n";
        let dataset = Dataset::from_bytes(data.as_bytes(), &LoadOptions::new()).unwrap();
        assert_eq!(dataset.headers(), ["Nombre", "Locación"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[1].fields(), ["Luis", "Oficina 2"]);
        assert_eq!(dataset.records()[1].row, 1);
    }

    #[test]
    fn honours_delimiter_and_explicit_encoding() {
        let data = b"Nombre;Location\nJos\xE9;Almac\xE9n\n";
        let options = LoadOptions::new()
            .with_delimiter(b';')
            .with_encoding("latin1");
        let dataset = Dataset::from_bytes(data, &options).unwrap();
        assert_eq!(dataset.records()[0].fields(), ["José", "Almacén"]);
    }

    #[test]
    fn reads_from_any_reader() {
        let data = Cursor::new(b"\xEF\xBB\xBFNombre\tUbicaci\xC3\xB3n\nAna\tLobby\n".to_vec());
        let dataset =
            Dataset::from_reader(data, &LoadOptions::new().with_delimiter(b'\t')).unwrap();
        assert_eq!(dataset.headers(), ["Nombre", "Ubicación"]);
        assert_eq!(dataset.records()[0].fields(), ["Ana", "Lobby"]);
    }

    #[test]
    fn pads_short_rows() {
        let data = "Nombre,Location,Actividad\nAna,Lobby\n";
        let dataset = Dataset::from_bytes(data.as_bytes(), &LoadOptions::new()).unwrap();
        assert_eq!(dataset.records()[0].fields(), ["Ana", "Lobby", ""]);
    }
}
