use std::borrow::Cow;
use std::io::Write;

use csv::{ByteRecord, Writer, WriterBuilder};

use crate::dataset::AreaRecord;
use crate::error::{Error, Result};
use crate::resolver::AreaIndex;
use crate::sinks::{RecordSink, SinkContext};

const KEY_HEADERS: [&str; 3] = ["MAP_ID_KEY", "LOCATION_KEY", "SECONDARY_KEY"];

/// Writes exported records into a delimited text file (CSV/TSV).
pub struct CsvSink<W: Write> {
    output: Option<W>,
    writer: Option<Writer<W>>,
    delimiter: u8,
    write_headers: bool,
    derived_keys: bool,
    column_count: usize,
    record: ByteRecord,
}

impl<W: Write> CsvSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            output: Some(writer),
            writer: None,
            delimiter: b',',
            write_headers: true,
            derived_keys: false,
            column_count: 0,
            record: ByteRecord::new(),
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn with_headers(mut self, headers: bool) -> Self {
        self.write_headers = headers;
        self
    }

    /// Appends the canonical map-id, location and secondary keys of every
    /// record as three trailing columns.
    #[must_use]
    pub const fn with_derived_keys(mut self, derived_keys: bool) -> Self {
        self.derived_keys = derived_keys;
        self
    }

    /// Returns the underlying writer once the sink has finished.
    ///
    /// # Errors
    ///
    /// Fails if called while a write is still in progress.
    pub fn into_inner(mut self) -> Result<W> {
        self.output.take().ok_or_else(|| Error::Csv {
            details: Cow::from("CSV sink has not been finished"),
        })
    }

    fn build_writer(&mut self) -> Result<()> {
        let output = self.output.take().ok_or_else(|| Error::Csv {
            details: Cow::from("CSV sink output already taken"),
        })?;
        let writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(output);
        self.writer = Some(writer);
        Ok(())
    }

    fn writer(&mut self) -> Result<&mut Writer<W>> {
        self.writer.as_mut().ok_or_else(|| Error::Csv {
            details: Cow::from("CSV sink used before begin"),
        })
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()> {
        if self.writer.is_some() {
            return Err(Error::Csv {
                details: Cow::from("CSV sink cannot be reused without finishing"),
            });
        }
        self.build_writer()?;
        self.column_count = context.headers.len();

        if self.write_headers {
            let mut header = ByteRecord::with_capacity(0, self.column_count + KEY_HEADERS.len());
            for name in context.headers {
                header.push_field(name.as_bytes());
            }
            if self.derived_keys {
                for name in KEY_HEADERS {
                    header.push_field(name.as_bytes());
                }
            }
            self.writer()?.write_byte_record(&header)?;
        }
        Ok(())
    }

    fn write_record(&mut self, index: &AreaIndex, record: &AreaRecord) -> Result<()> {
        if record.fields().len() != self.column_count {
            return Err(Error::Csv {
                details: Cow::Owned(format!(
                    "record {} has {} fields, expected {}",
                    record.row,
                    record.fields().len(),
                    self.column_count
                )),
            });
        }
        self.record.clear();
        for field in record.fields() {
            self.record.push_field(field.as_bytes());
        }
        if self.derived_keys {
            let keys = index.derived_keys(record.row).cloned().unwrap_or_default();
            self.record
                .push_field(keys.map_id.as_ref().map_or("", |k| k.as_str()).as_bytes());
            self.record.push_field(keys.location.as_str().as_bytes());
            self.record
                .push_field(keys.secondary.as_ref().map_or("", |k| k.as_str()).as_bytes());
        }

        let record = std::mem::take(&mut self.record);
        let written = self.writer()?.write_byte_record(&record);
        self.record = record;
        written?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            let out = writer.into_inner().map_err(|e| Error::Csv {
                details: Cow::Owned(format!("csv into_inner failed: {e}")),
            })?;
            self.output = Some(out);
        }
        self.column_count = 0;
        self.record.clear();
        Ok(())
    }
}
