use std::path::PathBuf;

use thiserror::Error;

/// Failure to build a [`RecordStore`](crate::data::model::RecordStore).
/// Always fatal for the load: no partially loaded store is ever returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Excel error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("workbook contains no worksheets")]
    NoWorksheet,

    #[error("expected a top-level JSON array of records")]
    NotRecordArray,

    #[error("row {row} is not a JSON object")]
    NotAnObject { row: usize },

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("row {row}: missing value in '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: '{value}' is not a valid {expected} in '{column}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType {
        column: &'static str,
        data_type: String,
    },
}

/// Aggregation over a view that has no records to aggregate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationError {
    #[error("no records in view")]
    EmptyView,
}

/// Failure while writing a CSV export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Failure to read a dashboard configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;
