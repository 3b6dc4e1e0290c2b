//! OpenAI-compatible embeddings client
//!
//! Talks to `POST {endpoint}/v1/embeddings`, which OpenAI, Ollama and
//! LM Studio all expose.

use super::client::EmbeddingClient;
use crate::llm::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub struct OpenAICompatibleEmbedder {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http_client: Client,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl OpenAICompatibleEmbedder {
    /// Creates a new embeddings client
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL without the `/v1` suffix (e.g. "https://api.openai.com")
    /// * `model` - Embedding model name
    /// * `api_key` - Bearer token, if the service requires one
    /// * `timeout` - Optional request timeout
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| BackendError::ConfigurationError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            http_client,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/embeddings", self.endpoint)
    }
}

#[async_trait]
impl EmbeddingClient for OpenAICompatibleEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            model = %self.model,
            inputs = inputs.len(),
            "Requesting embeddings"
        );

        let mut request = self.http_client.post(self.url()).json(&EmbeddingRequest {
            model: &self.model,
            input: inputs,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Embedding request error: {}", e);
            BackendError::NetworkError {
                message: format!("Request failed: {}", e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                message: body,
                status_code: Some(status.as_u16()),
            });
        }

        let parsed: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| BackendError::InvalidResponse {
                    message: format!("Failed to decode embeddings: {}", e),
                    raw_response: None,
                })?;

        align_embeddings(parsed.data, inputs.len())
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

fn align_embeddings(
    mut data: Vec<EmbeddingData>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, BackendError> {
    if data.len() != expected {
        return Err(BackendError::InvalidResponse {
            message: format!("expected {} embeddings, got {}", expected, data.len()),
            raw_response: None,
        });
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

impl std::fmt::Debug for OpenAICompatibleEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompatibleEmbedder")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}
