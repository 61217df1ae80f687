use thiserror::Error;

/// Errors raised at the fallible boundaries of the filter model
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid filter spec: {0}")]
    InvalidSpec(String),

    #[error("Invalid value for {filter_type} filter")]
    InvalidValue { filter_type: String },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unknown time interval '{0}'")]
    UnknownInterval(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
