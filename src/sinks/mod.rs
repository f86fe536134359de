mod csv;

use crate::dataset::AreaRecord;
use crate::error::Result;
use crate::resolver::AreaIndex;

pub use csv::CsvSink;

/// Dataset information handed to sinks before any record is written.
pub struct SinkContext<'a> {
    pub headers: &'a [String],
}

/// Trait implemented by sinks that consume a matched record set.
pub trait RecordSink {
    /// Called before any records are written to allow the sink to initialise internal state.
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()>;

    /// Invoked for every exported record together with the index it came from.
    fn write_record(&mut self, index: &AreaIndex, record: &AreaRecord) -> Result<()>;

    /// Called once all records have been forwarded to the sink.
    fn finish(&mut self) -> Result<()>;
}

/// Streams `records` from `index` through `sink`.
///
/// # Errors
///
/// Propagates any error raised by the sink.
pub fn export_records<S: RecordSink + ?Sized>(
    sink: &mut S,
    index: &AreaIndex,
    records: &[&AreaRecord],
) -> Result<()> {
    sink.begin(SinkContext {
        headers: index.dataset().headers(),
    })?;
    for record in records {
        sink.write_record(index, record)?;
    }
    sink.finish()
}
