pub mod dataset;
pub mod error;
pub mod filter;
pub mod logger;
pub mod map;
pub mod normalize;
pub mod resolver;
pub mod session;
pub mod sinks;
pub use crate::error::{ColumnRole, Error, Result};
pub use dataset::{AreaRecord, ColumnMap, ColumnSpec, Dataset, LoadOptions};
pub use filter::RecordFilter;
pub use map::{MapElement, MapSource, NoTitles, TitleLookup};
pub use normalize::{CanonicalKey, canonical_key, normalize};
pub use resolver::{AreaCoverage, AreaIndex, AreaLabel, LabelSource, Resolution};
pub use session::{Selection, Session};
pub use sinks::{CsvSink, RecordSink, SinkContext, export_records};
