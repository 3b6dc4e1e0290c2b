use crate::git::DEFAULT_CLONE_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub clone_timeout: Duration,
    /// Rules recalled from memory per file
    pub recall_limit: usize,
    /// Search hits folded into the prompt per file
    pub search_results: usize,
    /// Where the state document is written, `None` disables it
    pub state_file: Option<PathBuf>,
    /// Where the report text is written, `None` disables it
    pub report_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clone_timeout: DEFAULT_CLONE_TIMEOUT,
            recall_limit: 3,
            search_results: 2,
            state_file: Some(PathBuf::from("project_state.json")),
            report_file: Some(PathBuf::from("final_report.md")),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clone_timeout(mut self, timeout: Duration) -> Self {
        self.clone_timeout = timeout;
        self
    }

    pub fn with_recall_limit(mut self, limit: usize) -> Self {
        self.recall_limit = limit;
        self
    }

    pub fn with_state_file(mut self, path: Option<PathBuf>) -> Self {
        self.state_file = path;
        self
    }

    pub fn with_report_file(mut self, path: Option<PathBuf>) -> Self {
        self.report_file = path;
        self
    }
}
