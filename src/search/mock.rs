use super::client::{SearchHit, WebSearch};
use super::error::SearchError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Offline search backend returning canned hits
#[derive(Debug, Default)]
pub struct MockWebSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl MockWebSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    /// Every search returns an error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for MockWebSearch {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(SearchError::Request("mock search failure".to_string()));
        }
        Ok(self.hits.iter().take(num_results).cloned().collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
