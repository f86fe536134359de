use std::borrow::Cow;
use std::fmt;
use std::io;

/// Result type used across the floor-plan resolver.
pub type Result<T> = std::result::Result<T, Error>;

/// High-level error type surfaced while loading inputs and building indices.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure while reading from the underlying data source.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Failure to convert bytes between character encodings.
    #[error("encoding conversion from {encoding} failed: {details}")]
    Encoding {
        encoding: Cow<'static, str>,
        details: Cow<'static, str>,
    },

    /// The dataset has no column recognisable for a required role.
    #[error(
        "no column recognisable as the {role} column{suffix} (found: {found}); rename the column or pass it explicitly",
        suffix = requested_suffix(.requested.as_deref()),
        found = .available.join(", ")
    )]
    MissingColumn {
        role: ColumnRole,
        requested: Option<String>,
        available: Vec<String>,
    },

    /// The delimited text reader rejected the input.
    #[error("csv error: {details}")]
    Csv { details: Cow<'static, str> },

    /// The map markup could not be read.
    #[error("map error: {details}")]
    Map { details: Cow<'static, str> },

    /// A session was queried before its inputs were loaded.
    #[error("{what} has not been loaded")]
    NotLoaded { what: &'static str },
}

/// Role a dataset column plays when indexing areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Location,
    MapId,
    SecondaryLocation,
    Name,
    Activity,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location => write!(f, "location"),
            Self::MapId => write!(f, "map id"),
            Self::SecondaryLocation => write!(f, "secondary location"),
            Self::Name => write!(f, "name"),
            Self::Activity => write!(f, "activity"),
        }
    }
}

fn requested_suffix(requested: Option<&str>) -> String {
    requested.map_or_else(String::new, |name| format!(" '{name}'"))
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            details: Cow::Owned(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Map {
            details: Cow::Owned(err.to_string()),
        }
    }
}
