use super::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

/// Web search capability used to research unfamiliar libraries
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Returns at most `num_results` hits for `query`
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>, SearchError>;

    fn name(&self) -> &str;
}

/// Search backend used when no provider is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearch;

#[async_trait]
impl WebSearch for DisabledSearch {
    async fn search(&self, _query: &str, _num_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
