use crate::llm::BackendError;
use async_trait::async_trait;

/// Text embedding capability
///
/// Returns one fixed-dimension vector per input, aligned by position.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, BackendError>;

    fn name(&self) -> &str;

    fn dimensions(&self) -> Option<usize> {
        None
    }
}
