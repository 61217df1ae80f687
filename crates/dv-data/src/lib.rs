//! Data containers and datasets consumed by the filter engine

pub mod container;
pub mod dataset;
pub mod timestamp;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use container::{create_data_container, ArrowDataContainer, DataContainer, RowDataContainer};
pub use dataset::Dataset;
pub use timestamp::{parse_timestamp_ms, timestamp_accessor};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Unsupported column type for '{column}': {data_type}")]
    UnsupportedColumn { column: String, data_type: DataType },

    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Could not parse timestamp '{0}'")]
    Timestamp(String),
}
