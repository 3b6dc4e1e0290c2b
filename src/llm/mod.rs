//! LLM client abstraction layer
//!
//! Trait-based abstraction for completion calls, so the pipeline can run
//! against a real provider (`GenAIClient`) or a scripted one (`MockLLMClient`).

mod client;
mod error;
mod genai;
mod mock;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use genai::{GenAIClient, API_BASE_URL_ENV};
pub use mock::{MockLLMClient, MockResponse};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
