//! Pipeline dependencies and per-run working state

use std::sync::Arc;

use crate::embeddings::HashingEmbedder;
use crate::llm::LLMClient;
use crate::memory::SemanticMemoryStore;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::search::{DisabledSearch, WebSearch};

use super::config::PipelineConfig;
use super::phases::discover::ScanResult;
use super::phases::extract::ExtractionOutcome;
use super::state::PipelineState;

/// Context that owns all long-lived pipeline dependencies
pub struct PipelineContext {
    pub llm_client: Arc<dyn LLMClient>,
    pub memory: Arc<SemanticMemoryStore>,
    pub search: Arc<dyn WebSearch>,
    pub progress: Arc<dyn ProgressHandler>,
    pub config: PipelineConfig,
}

impl PipelineContext {
    pub fn new(
        llm_client: Arc<dyn LLMClient>,
        memory: Arc<SemanticMemoryStore>,
        search: Arc<dyn WebSearch>,
        progress: Arc<dyn ProgressHandler>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            llm_client,
            memory,
            search,
            progress,
            config,
        }
    }

    /// In-memory store, no search, no progress reporting
    pub fn offline(llm_client: Arc<dyn LLMClient>, config: PipelineConfig) -> Self {
        Self::new(
            llm_client,
            Arc::new(SemanticMemoryStore::in_memory(Arc::new(
                HashingEmbedder::default(),
            ))),
            Arc::new(DisabledSearch),
            Arc::new(NoOpHandler),
            config,
        )
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_memory(mut self, memory: Arc<SemanticMemoryStore>) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = search;
        self
    }

    pub fn emit(&self, event: ProgressEvent) {
        self.progress.on_progress(&event);
    }
}

/// Working state threaded through the phases of one run
#[derive(Debug)]
pub struct AnalysisContext {
    pub location: String,
    pub state: PipelineState,
    pub scan: Option<ScanResult>,
    pub extraction: Option<ExtractionOutcome>,
    pub plan: Option<String>,
    pub review: Option<String>,
}

impl AnalysisContext {
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            state: PipelineState::new(location.clone()),
            location,
            scan: None,
            extraction: None,
            plan: None,
            review: None,
        }
    }

    /// Flattened rules from the extraction phase
    pub fn rules(&self) -> &[String] {
        self.extraction
            .as_ref()
            .map(|outcome| outcome.rules.as_slice())
            .unwrap_or(&[])
    }
}
