mod columns;
mod encoding;
mod reader;

pub use columns::{ColumnMap, ColumnSpec};
pub use encoding::{decode_text, resolve_encoding};
pub use reader::LoadOptions;

/// One row of the inventory spreadsheet.
///
/// Fields are stored in header order; a record always has exactly as many
/// fields as its dataset has headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRecord {
    pub row: usize,
    fields: Vec<String>,
}

impl AreaRecord {
    #[must_use]
    pub const fn new(row: usize, fields: Vec<String>) -> Self {
        Self { row, fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at column position `index`, or `""` when out of range.
    #[must_use]
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }
}

/// Tabular inventory data with named columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<AreaRecord>,
}

impl Dataset {
    /// Builds a dataset from already-parsed rows. Rows shorter than the
    /// header are padded with empty fields; longer rows are truncated.
    #[must_use]
    pub fn from_rows<I, R, S>(headers: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let width = headers.len();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(row, fields)| {
                let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
                fields.resize(width, String::new());
                AreaRecord::new(row, fields)
            })
            .collect();
        Self { headers, records }
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn records(&self) -> &[AreaRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn record(&self, row: usize) -> Option<&AreaRecord> {
        self.records.get(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_pads_and_truncates_to_header_width() {
        let dataset = Dataset::from_rows(
            vec!["Nombre".into(), "Location".into()],
            vec![vec!["Ana"], vec!["Luis", "Lobby", "extra"]],
        );
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].fields(), ["Ana", ""]);
        assert_eq!(dataset.records()[1].fields(), ["Luis", "Lobby"]);
        assert_eq!(dataset.records()[1].row, 1);
        assert_eq!(dataset.records()[1].field(7), "");
    }
}
