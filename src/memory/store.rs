//! Long-term memory bank of extracted business rules
//!
//! Rules are embedded on write and recalled by cosine distance to a free-text
//! query. Recall is deliberately not keyed on file identity: a rule extracted
//! from one file can surface while analyzing an unrelated file if the wording
//! is close. That trades precision for cross-file convention detection.
//!
//! The whole store lives in memory and is mirrored to a single JSON document,
//! rewritten after every successful `store`.

use super::error::{MemoryError, Result};
use super::vector::cosine_distance;
use crate::embeddings::EmbeddingClient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// File name of the persisted memory document inside the memory directory
pub const MEMORY_FILE_NAME: &str = "rules.json";

/// Length of the rule snippet copied into each record's metadata
const SNIPPET_CHARS: usize = 100;

pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub rule_text: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

/// A rule returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecalledRule {
    pub rule: String,
    pub metadata: Metadata,
    /// Cosine distance to the query, lower is more similar
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStats {
    pub total_rules: usize,
    pub persist_path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryDocument {
    records: Vec<MemoryRecord>,
}

pub struct SemanticMemoryStore {
    embedder: Arc<dyn EmbeddingClient>,
    persist_path: Option<PathBuf>,
    records: RwLock<Vec<MemoryRecord>>,
}

impl SemanticMemoryStore {
    /// Opens (or creates) a persistent store under `directory`
    pub fn open(directory: impl AsRef<Path>, embedder: Arc<dyn EmbeddingClient>) -> Result<Self> {
        let directory = directory.as_ref();
        std::fs::create_dir_all(directory)?;

        let persist_path = directory.join(MEMORY_FILE_NAME);
        let records = if persist_path.exists() {
            let raw = std::fs::read_to_string(&persist_path)?;
            serde_json::from_str::<MemoryDocument>(&raw)?.records
        } else {
            Vec::new()
        };

        info!(
            path = %persist_path.display(),
            rules = records.len(),
            embedder = embedder.name(),
            "Memory bank initialized"
        );

        Ok(Self {
            embedder,
            persist_path: Some(persist_path),
            records: RwLock::new(records),
        })
    }

    /// A store that is never written to disk
    pub fn in_memory(embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self {
            embedder,
            persist_path: None,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embeds and stores `rules`, each tagged with a copy of `metadata`
    ///
    /// Ids are `rule_<n>` where `n` continues from the current store size.
    pub async fn store(&self, rules: &[String], metadata: &Metadata) -> Result<()> {
        if rules.is_empty() {
            warn!("No rules to store");
            return Ok(());
        }

        let embeddings = self
            .embedder
            .embed(rules)
            .await
            .map_err(|e| MemoryError::EmbeddingUnavailable(e.to_string()))?;
        if embeddings.len() != rules.len() {
            return Err(MemoryError::EmbeddingUnavailable(format!(
                "expected {} embeddings, got {}",
                rules.len(),
                embeddings.len()
            )));
        }

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let base = records.len();

        let new_records: Vec<MemoryRecord> = rules
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (rule, embedding))| {
                let mut rule_metadata = metadata.clone();
                rule_metadata.insert("rule_text".to_string(), snippet(rule));
                MemoryRecord {
                    id: format!("rule_{}", base + i),
                    rule_text: rule.clone(),
                    metadata: rule_metadata,
                    embedding,
                }
            })
            .collect();

        if let Some(path) = &self.persist_path {
            let mut document = MemoryDocument {
                records: records.clone(),
            };
            document.records.extend(new_records.iter().cloned());
            write_document(path, &document)?;
        }

        records.extend(new_records);
        info!(stored = rules.len(), total = records.len(), "Stored rules in memory bank");
        Ok(())
    }

    /// Returns up to `limit` stored rules nearest to `query`
    pub async fn search_similar(&self, query: &str, limit: usize) -> Result<Vec<RecalledRule>> {
        if self.is_empty() {
            info!("No prior memory found. Starting fresh.");
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await
            .map_err(|e| MemoryError::EmbeddingUnavailable(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                MemoryError::EmbeddingUnavailable("no embedding returned for query".to_string())
            })?;

        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut ranked: Vec<RecalledRule> = records
            .iter()
            .map(|record| RecalledRule {
                rule: record.rule_text.clone(),
                metadata: record.metadata.clone(),
                distance: cosine_distance(&query_embedding, &record.embedding),
            })
            .collect();

        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked.truncate(limit.min(records.len()));

        debug!(found = ranked.len(), "Found similar rules in memory");
        Ok(ranked)
    }

    /// Destroys every stored rule, including the persisted document
    pub fn clear(&self) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.clear();

        if let Some(path) = &self.persist_path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }

        warn!("Memory bank cleared");
        Ok(())
    }

    pub fn all_rules(&self) -> Vec<String> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| r.rule_text.clone())
            .collect()
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            total_rules: self.len(),
            persist_path: self.persist_path.clone(),
        }
    }
}

impl std::fmt::Debug for SemanticMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticMemoryStore")
            .field("embedder", &self.embedder.name())
            .field("persist_path", &self.persist_path)
            .field("rules", &self.len())
            .finish()
    }
}

fn snippet(rule: &str) -> String {
    rule.chars().take(SNIPPET_CHARS).collect()
}

fn write_document(path: &Path, document: &MemoryDocument) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        MemoryError::Storage(format!(
            "failed to replace {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;
    use crate::llm::BackendError;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct OfflineEmbedder;

    #[async_trait]
    impl EmbeddingClient for OfflineEmbedder {
        async fn embed(&self, _inputs: &[String]) -> std::result::Result<Vec<Vec<f32>>, BackendError> {
            Err(BackendError::NetworkError {
                message: "connection refused".to_string(),
            })
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    fn hashing_store() -> SemanticMemoryStore {
        SemanticMemoryStore::in_memory(Arc::new(HashingEmbedder::default()))
    }

    fn file_metadata(file: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("file".to_string(), file.to_string());
        metadata
    }

    #[tokio::test]
    async fn test_search_on_empty_store_is_empty() {
        let store = hashing_store();
        let results = store.search_similar("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_store_empty_is_noop() {
        let store = hashing_store();
        store.store(&[], &Metadata::new()).await.unwrap();
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_ids_continue_from_store_size() {
        let dir = TempDir::new().unwrap();
        let store = SemanticMemoryStore::open(dir.path(), Arc::new(HashingEmbedder::default()))
            .unwrap();

        store
            .store(&["A".to_string(), "B".to_string()], &file_metadata("a.py"))
            .await
            .unwrap();
        store
            .store(&["C".to_string()], &file_metadata("b.py"))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join(MEMORY_FILE_NAME)).unwrap();
        let document: MemoryDocument = serde_json::from_str(&raw).unwrap();
        let ids: Vec<&str> = document.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rule_0", "rule_1", "rule_2"]);
    }

    #[tokio::test]
    async fn test_metadata_carries_snippet() {
        let store = hashing_store();
        let long_rule = "x".repeat(250);
        store
            .store(&[long_rule], &file_metadata("pricing.py"))
            .await
            .unwrap();

        let results = store.search_similar("x", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["file"], "pricing.py");
        assert_eq!(results[0].metadata["rule_text"].chars().count(), SNIPPET_CHARS);
    }

    #[tokio::test]
    async fn test_exact_rule_ranks_first() {
        let store = hashing_store();
        store
            .store(
                &["Orders ship within two business days".to_string()],
                &file_metadata("shipping.js"),
            )
            .await
            .unwrap();
        store
            .store(&["R1".to_string(), "R2".to_string()], &file_metadata("rules.py"))
            .await
            .unwrap();

        let results = store.search_similar("R1", 5).await.unwrap();
        assert!(!results.is_empty());
        let r1 = results.iter().find(|r| r.rule == "R1").unwrap();
        let unrelated = results
            .iter()
            .find(|r| r.rule.starts_with("Orders"))
            .unwrap();
        assert!(r1.distance <= unrelated.distance);
        assert_eq!(results[0].rule, "R1");
    }

    #[tokio::test]
    async fn test_limit_is_capped_by_store_size() {
        let store = hashing_store();
        store
            .store(&["one".to_string(), "two".to_string()], &Metadata::new())
            .await
            .unwrap();
        let results = store.search_similar("one", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_then_search_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SemanticMemoryStore::open(dir.path(), Arc::new(HashingEmbedder::default()))
            .unwrap();
        store
            .store(&["VIPs get 20% off".to_string()], &Metadata::new())
            .await
            .unwrap();
        assert!(dir.path().join(MEMORY_FILE_NAME).exists());

        store.clear().unwrap();

        assert!(store.search_similar("VIP", 3).await.unwrap().is_empty());
        assert!(!dir.path().join(MEMORY_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_reopen_restores_rules() {
        let dir = TempDir::new().unwrap();
        {
            let store =
                SemanticMemoryStore::open(dir.path(), Arc::new(HashingEmbedder::default()))
                    .unwrap();
            store
                .store(&["Tax is 5%".to_string()], &file_metadata("tax.py"))
                .await
                .unwrap();
        }

        let reopened =
            SemanticMemoryStore::open(dir.path(), Arc::new(HashingEmbedder::default())).unwrap();
        assert_eq!(reopened.all_rules(), vec!["Tax is 5%".to_string()]);
        assert_eq!(reopened.stats().total_rules, 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_surfaces_as_unavailable() {
        let store = SemanticMemoryStore::in_memory(Arc::new(OfflineEmbedder));
        let result = store.store(&["R1".to_string()], &Metadata::new()).await;
        assert!(matches!(result, Err(MemoryError::EmbeddingUnavailable(_))));
        assert_eq!(store.len(), 0);
    }
}
