use thiserror::Error;

/// Failure taxonomy for the ingest/retrieval pipeline. All three are fatal;
/// there is no retry policy anywhere in this workspace.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed source: {0}")]
    MalformedSource(String),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
