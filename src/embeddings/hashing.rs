//! Offline lexical embeddings
//!
//! Word tokens and character trigrams are hashed into a fixed number of
//! buckets and the result is L2-normalized. Texts that share vocabulary end up
//! close under cosine distance; there is no semantic understanding beyond
//! that, so recall quality is lower than with a model-backed embedder.

use super::client::EmbeddingClient;
use crate::llm::BackendError;
use async_trait::async_trait;

pub const DEFAULT_DIMENSIONS: usize = 256;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            self.accumulate(&mut vector, "w:", token, 1.0);
        }

        let padded: Vec<char> = format!(" {} ", lowered.trim()).chars().collect();
        for window in padded.windows(3) {
            let trigram: String = window.iter().collect();
            self.accumulate(&mut vector, "t:", &trigram, 0.5);
        }

        normalize(&mut vector);
        vector
    }

    fn accumulate(&self, vector: &mut [f32], prefix: &str, feature: &str, weight: f32) {
        let digest = md5::compute(format!("{}{}", prefix, feature).as_bytes());
        let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize
            % self.dimensions;
        let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        Ok(inputs.iter().map(|text| self.embed_text(text)).collect())
    }

    fn name(&self) -> &str {
        "hashing"
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}
