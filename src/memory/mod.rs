//! Semantic memory of previously extracted business rules

mod error;
mod store;
mod vector;

pub use error::{MemoryError, Result};
pub use store::{
    MemoryRecord, MemoryStats, Metadata, RecalledRule, SemanticMemoryStore, MEMORY_FILE_NAME,
};
pub use vector::{cosine_distance, cosine_similarity};
