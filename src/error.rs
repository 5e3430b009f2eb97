//! Error types for the scorecast pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline.
///
/// Every stage wraps its failures into one of these variants and propagates
/// upward; no stage attempts recovery or retry.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Preprocessing error: {0}")]
    Preprocessing(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Model not fitted")]
    NotFitted,
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::Training("no candidates".to_string());
        assert_eq!(err.to_string(), "Training error: no candidates");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
