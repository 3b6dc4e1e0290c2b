//! GenAI-based LLM client implementation
//!
//! Uses the `genai` crate so one client covers Gemini, OpenAI, Anthropic,
//! Ollama and the other adapters it supports.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Environment variable overriding the provider endpoint
pub const API_BASE_URL_ENV: &str = "LOGICMAPPER_API_BASE_URL";

/// GenAI-based LLM client supporting multiple providers
pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    /// `None` means the call is awaited without a ceiling
    timeout: Option<Duration>,
}

impl GenAIClient {
    /// Creates a new GenAI client
    ///
    /// # Arguments
    ///
    /// * `provider` - LLM provider to use
    /// * `model` - Model name (without provider prefix)
    /// * `timeout` - Optional request timeout
    pub fn new(provider: AdapterKind, model: String, timeout: Option<Duration>) -> Self {
        let client = match std::env::var(API_BASE_URL_ENV).ok() {
            Some(endpoint_url) => {
                debug!(
                    "Using custom endpoint for {}: {}",
                    provider.as_str(),
                    endpoint_url
                );

                let model_clone = model.clone();
                let resolver = ServiceTargetResolver::from_resolver_fn(
                    move |_service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                        let auth = match provider.default_key_env_name() {
                            Some(api_key_var) => AuthData::from_env(api_key_var),
                            None => AuthData::from_single(""),
                        };

                        Ok(ServiceTarget {
                            endpoint: Endpoint::from_owned(endpoint_url.clone()),
                            auth,
                            model: ModelIden::new(provider, &model_clone),
                        })
                    },
                );

                Client::builder()
                    .with_service_target_resolver(resolver)
                    .build()
            }
            None => Client::default(),
        };

        debug!(
            "Creating GenAI client: provider={}, model={}",
            provider.as_str(),
            model,
        );

        Self {
            client,
            model,
            provider,
            timeout,
        }
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();

        let messages: Vec<GenAIChatMessage> =
            request.messages.iter().map(Self::convert_message).collect();
        let genai_request = GenAIChatRequest::new(messages);

        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        let call = self
            .client
            .exec_chat(&self.model, genai_request, Some(&options));

        let result = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => {
                    error!(
                        "{} request timed out after {}s",
                        self.provider.as_str(),
                        timeout.as_secs()
                    );
                    return Err(BackendError::TimeoutError {
                        seconds: timeout.as_secs(),
                    });
                }
            },
            None => call.await,
        };

        let response = result.map_err(|e| {
            error!("{} API error: {}", self.provider.as_str(), e);
            BackendError::ApiError {
                message: format!("{} request failed: {}", self.provider.as_str(), e),
                status_code: None,
            }
        })?;

        let content = response.first_text().unwrap_or_default().to_string();
        if content.trim().is_empty() {
            return Err(BackendError::InvalidResponse {
                message: "empty completion".to_string(),
                raw_response: None,
            });
        }

        Ok(LLMResponse::text(content, start.elapsed()))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
