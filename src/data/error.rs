use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// ProcessError – every way the decimate/average transform can fail
// ---------------------------------------------------------------------------

/// Failures of the data layer. Line numbers are 1-based and refer to the
/// original input file, not the decimated copy.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file is empty: no header line")]
    MissingHeader,

    #[error("header label '{0}' is not a frequency in MHz")]
    InvalidLabel(String),

    #[error("header repeats frequency label '{0}'")]
    DuplicateLabel(String),

    #[error("line {line}: '{token}' in column '{label}' is not a number")]
    Parse {
        line: usize,
        label: String,
        token: String,
    },

    #[error("line {line}: expected {expected} values but found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("no data rows left after decimation, averages are undefined")]
    Empty,

    #[error("column '{0}' has no numeric samples")]
    NoSamples(String),

    #[error("frequency '{0}' MHz is not present in the data")]
    UnknownFrequency(String),

    #[error("invalid processing parameters: {0}")]
    InvalidParams(String),
}
