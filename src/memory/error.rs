use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    /// The embedding capability could not produce vectors. Callers degrade
    /// to running without memory augmentation.
    #[error("Embedding capability unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Memory storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
