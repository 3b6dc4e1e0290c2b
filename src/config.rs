//! Configuration management for logicmapper
//!
//! Settings are read from environment variables with defaults, then
//! overridden by CLI flags where the CLI offers one.
//!
//! # Environment Variables
//!
//! - `LOGICMAPPER_PROVIDER`: genai adapter (gemini|openai|anthropic|ollama|groq|xai|deepseek|cohere) - default: "gemini"
//! - `LOGICMAPPER_MODEL`: model name - default depends on the provider
//! - `LOGICMAPPER_REQUEST_TIMEOUT`: LLM request timeout in seconds, 0 disables it - default: "0"
//! - `LOGICMAPPER_CLONE_TIMEOUT`: ceiling for `git clone` in seconds - default: "300"
//! - `LOGICMAPPER_STATE_FILE`, `LOGICMAPPER_REPORT_FILE`, `LOGICMAPPER_CRASH_LOG`: output files
//! - `LOGICMAPPER_MEMORY_DIR`: memory bank directory - default: "memory_bank"
//! - `LOGICMAPPER_EMBEDDINGS`: hashing|openai - default: "hashing"
//! - `LOGICMAPPER_EMBEDDING_MODEL`, `LOGICMAPPER_EMBEDDING_URL`, `OPENAI_API_KEY`
//! - `LOGICMAPPER_SEARCH`: google|disabled - default: google when both
//!   `GOOGLE_SEARCH_API_KEY` and `GOOGLE_SEARCH_ENGINE_ID` are set
//! - `LOGICMAPPER_LOG_LEVEL`: trace|debug|info|warn|error - default: "info"
//!
//! Provider credentials (`GEMINI_API_KEY`, `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`,
//! `OLLAMA_HOST`, ...) are read by genai itself.

use crate::embeddings::{EmbeddingClient, HashingEmbedder, OpenAICompatibleEmbedder};
use crate::git::DEFAULT_CLONE_TIMEOUT;
use crate::llm::{BackendError, GenAIClient, LLMClient};
use crate::pipeline::PipelineConfig;
use crate::search::{DisabledSearch, GoogleCustomSearch, SearchError, WebSearch};
use genai::adapter::AdapterKind;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_STATE_FILE: &str = "project_state.json";
const DEFAULT_REPORT_FILE: &str = "final_report.md";
const DEFAULT_CRASH_LOG: &str = "crash.log";
const DEFAULT_MEMORY_DIR: &str = "memory_bank";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com";
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const MAX_CLONE_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: gemini, openai, anthropic, ollama, groq, xai, deepseek, cohere")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Backend initialization failed: {0}")]
    BackendInitError(#[from] BackendError),

    #[error("Search initialization failed: {0}")]
    SearchInitError(#[from] SearchError),
}

#[derive(Clone, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Offline feature hashing
    Hashing,
    /// Any `/v1/embeddings` compatible service
    OpenAI {
        endpoint: String,
        model: String,
        api_key: Option<String>,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub enum SearchBackend {
    Google { api_key: String, engine_id: String },
    Disabled,
}

impl fmt::Debug for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingBackend::Hashing => write!(f, "Hashing"),
            EmbeddingBackend::OpenAI { endpoint, model, .. } => f
                .debug_struct("OpenAI")
                .field("endpoint", endpoint)
                .field("model", model)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Debug for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBackend::Google { engine_id, .. } => f
                .debug_struct("Google")
                .field("engine_id", engine_id)
                .finish_non_exhaustive(),
            SearchBackend::Disabled => write!(f, "Disabled"),
        }
    }
}

pub fn parse_provider(value: &str) -> Result<AdapterKind, ConfigError> {
    AdapterKind::from_lower_str(&value.to_lowercase())
        .ok_or_else(|| ConfigError::InvalidProvider(value.to_string()))
}

/// Model used when none is configured; `None` for adapters without one
pub fn default_model(provider: AdapterKind) -> Option<&'static str> {
    match provider {
        AdapterKind::Gemini => Some(DEFAULT_GEMINI_MODEL),
        AdapterKind::Ollama => Some(DEFAULT_OLLAMA_MODEL),
        AdapterKind::OpenAI => Some("gpt-4o-mini"),
        AdapterKind::Anthropic => Some("claude-3-5-haiku-latest"),
        AdapterKind::Groq => Some("llama-3.3-70b-versatile"),
        AdapterKind::DeepSeek => Some("deepseek-chat"),
        AdapterKind::Xai => Some("grok-3-mini"),
        AdapterKind::Cohere => Some("command-r-plus"),
        _ => None,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct LogicMapperConfig {
    pub provider: AdapterKind,
    pub model: String,
    /// 0 means no timeout
    pub request_timeout_secs: u64,
    pub clone_timeout_secs: u64,
    pub state_file: PathBuf,
    pub report_file: PathBuf,
    pub crash_log: PathBuf,
    pub memory_dir: PathBuf,
    pub embeddings: EmbeddingBackend,
    pub search: SearchBackend,
    pub log_level: String,
}

impl Default for LogicMapperConfig {
    /// Loads configuration from `LOGICMAPPER_*` environment variables
    fn default() -> Self {
        let provider = env::var("LOGICMAPPER_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s).ok())
            .unwrap_or(AdapterKind::Gemini);

        let model = non_empty_env("LOGICMAPPER_MODEL")
            .or_else(|| default_model(provider).map(str::to_string))
            .unwrap_or_default();

        let embeddings = match env::var("LOGICMAPPER_EMBEDDINGS")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "openai" => EmbeddingBackend::OpenAI {
                endpoint: non_empty_env("LOGICMAPPER_EMBEDDING_URL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_URL.to_string()),
                model: non_empty_env("LOGICMAPPER_EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                api_key: non_empty_env("OPENAI_API_KEY"),
            },
            _ => EmbeddingBackend::Hashing,
        };

        let google_credentials = non_empty_env("GOOGLE_SEARCH_API_KEY")
            .zip(non_empty_env("GOOGLE_SEARCH_ENGINE_ID"));
        let search = match (
            env::var("LOGICMAPPER_SEARCH").unwrap_or_default().to_lowercase().as_str(),
            google_credentials,
        ) {
            ("disabled", _) => SearchBackend::Disabled,
            (_, Some((api_key, engine_id))) => SearchBackend::Google { api_key, engine_id },
            _ => SearchBackend::Disabled,
        };

        let log_level = env::var("LOGICMAPPER_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            request_timeout_secs: env_u64("LOGICMAPPER_REQUEST_TIMEOUT", 0),
            clone_timeout_secs: env_u64(
                "LOGICMAPPER_CLONE_TIMEOUT",
                DEFAULT_CLONE_TIMEOUT.as_secs(),
            ),
            state_file: env_path("LOGICMAPPER_STATE_FILE", DEFAULT_STATE_FILE),
            report_file: env_path("LOGICMAPPER_REPORT_FILE", DEFAULT_REPORT_FILE),
            crash_log: env_path("LOGICMAPPER_CRASH_LOG", DEFAULT_CRASH_LOG),
            memory_dir: env_path("LOGICMAPPER_MEMORY_DIR", DEFAULT_MEMORY_DIR),
            embeddings,
            search,
            log_level,
        }
    }
}

impl LogicMapperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }
        if self.clone_timeout_secs == 0 || self.clone_timeout_secs > MAX_CLONE_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(format!(
                "Clone timeout must be between 1 and {} seconds",
                MAX_CLONE_TIMEOUT_SECS
            )));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                format!(
                    "No model configured for provider {}. Set LOGICMAPPER_MODEL or pass --model",
                    self.provider.as_str()
                ),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn create_llm_client(&self) -> Arc<dyn LLMClient> {
        Arc::new(GenAIClient::new(
            self.provider,
            self.model.clone(),
            self.request_timeout(),
        ))
    }

    pub fn create_embedder(&self) -> Result<Arc<dyn EmbeddingClient>, ConfigError> {
        match &self.embeddings {
            EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::default())),
            EmbeddingBackend::OpenAI {
                endpoint,
                model,
                api_key,
            } => Ok(Arc::new(OpenAICompatibleEmbedder::new(
                endpoint.clone(),
                model.clone(),
                api_key.clone(),
                self.request_timeout(),
            )?)),
        }
    }

    pub fn create_search(&self) -> Result<Arc<dyn WebSearch>, ConfigError> {
        match &self.search {
            SearchBackend::Google { api_key, engine_id } => Ok(Arc::new(GoogleCustomSearch::new(
                api_key.clone(),
                engine_id.clone(),
                self.request_timeout(),
            )?)),
            SearchBackend::Disabled => Ok(Arc::new(DisabledSearch)),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_clone_timeout(Duration::from_secs(self.clone_timeout_secs))
            .with_state_file(Some(self.state_file.clone()))
            .with_report_file(Some(self.report_file.clone()))
    }
}

impl fmt::Display for LogicMapperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LogicMapper Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        match self.request_timeout_secs {
            0 => writeln!(f, "  Request Timeout: none")?,
            secs => writeln!(f, "  Request Timeout: {}s", secs)?,
        }
        writeln!(f, "  Clone Timeout: {}s", self.clone_timeout_secs)?;
        writeln!(f, "  State File: {}", self.state_file.display())?;
        writeln!(f, "  Report File: {}", self.report_file.display())?;
        writeln!(f, "  Memory Dir: {}", self.memory_dir.display())?;
        writeln!(f, "  Embeddings: {:?}", self.embeddings)?;
        writeln!(f, "  Search: {:?}", self.search)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
