use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed embedding store: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Malformed record {position} ('{identifier}'): {reason}")]
    MalformedRecord {
        position: usize,
        identifier: String,
        reason: String,
    },

    #[error("Invalid query dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
