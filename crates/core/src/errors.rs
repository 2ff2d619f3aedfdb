//! Error types for the encoding and evaluation pipeline

use thiserror::Error;

/// Errors that can occur while preparing a dataset or scoring a model.
///
/// Every stage of the pipeline surfaces one of these verbatim; nothing is
/// retried or recovered.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Raw dataset file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed row or non-numeric continuous value
    #[error("Parse error: {0}")]
    Parse(String),

    /// The raw dataset contained no rows
    #[error("Dataset is empty")]
    EmptyDataset,

    /// A continuous attribute whose observed maximum is zero
    #[error("Degenerate scale for continuous column {column}: maximum observed value is 0")]
    DegenerateScale { column: usize },

    /// A value missing from its attribute's class list
    #[error("Unknown category {value:?} in column {column}")]
    UnknownCategory { column: usize, value: String },

    /// An encoded record violated the fixed feature width
    #[error("row {record}: encoded width {got}, expected {expected}")]
    WidthMismatch {
        record: usize,
        got: usize,
        expected: usize,
    },

    /// Accuracy is undefined without test records
    #[error("Test set is empty, accuracy is undefined")]
    EmptyTestSet,

    /// Attribute or run configuration rejected before any work
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration source could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// External learner failed to produce a model
    #[error("Training error: {0}")]
    Training(String),

    /// Run report could not be serialized
    #[error("Report error: {0}")]
    Report(String),
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => PipelineError::Io(io),
            _ => PipelineError::Parse(message),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
