use crate::llm::{BackendError, LLMClient, LLMRequest};
use std::time::Instant;
use tracing::{debug, error};

const TEMPERATURE: f32 = 0.1;

/// Sends a single-turn prompt and returns the raw completion text
pub async fn query_llm(
    llm_client: &dyn LLMClient,
    prompt: String,
    phase: &str,
) -> Result<String, BackendError> {
    let start = Instant::now();
    let request = LLMRequest::prompt(prompt).with_temperature(TEMPERATURE);

    let response = llm_client.chat(request).await.map_err(|e| {
        error!(phase, client = llm_client.name(), "LLM call failed: {}", e);
        e
    })?;

    debug!(
        phase,
        latency_ms = start.elapsed().as_millis() as u64,
        chars = response.content.len(),
        "LLM response received"
    );

    Ok(response.content)
}
