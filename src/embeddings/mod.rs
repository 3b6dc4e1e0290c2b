//! Embedding capability used by the semantic memory store

mod client;
mod hashing;
mod openai_compatible;

pub use client::EmbeddingClient;
pub use hashing::{HashingEmbedder, DEFAULT_DIMENSIONS};
pub use openai_compatible::OpenAICompatibleEmbedder;
