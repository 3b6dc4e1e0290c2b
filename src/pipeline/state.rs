//! Persisted record of a pipeline run

use super::error::StateError;
use super::phases::discover::{extension_of, ScanResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Analyzed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    /// File extension including the dot, empty when the file has none
    pub language: String,
    #[serde(default)]
    pub rules: Vec<String>,
    pub status: FileStatus,
}

impl FileRecord {
    pub fn pending(path: &str) -> Self {
        Self {
            path: path.to_string(),
            language: extension_of(path),
            rules: Vec::new(),
            status: FileStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Pending,
    Complete,
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStatus::Pending => write!(f, "pending"),
            PipelineStatus::Complete => write!(f, "complete"),
        }
    }
}

fn default_project_name() -> String {
    "LogicMapper Project".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    pub repo_path: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub scanned_files: Vec<String>,
    #[serde(default)]
    pub analyses: BTreeMap<String, FileRecord>,
    #[serde(default)]
    pub modernization_plan: Option<String>,
    /// Reserved for a dependency graph rendering; never produced
    #[serde(default)]
    pub dependency_graph: Option<String>,
}

impl PipelineState {
    pub fn new(repo_path: impl Into<String>) -> Self {
        Self {
            project_name: default_project_name(),
            repo_path: repo_path.into(),
            start_time: Utc::now(),
            scanned_files: Vec::new(),
            analyses: BTreeMap::new(),
            modernization_plan: None,
            dependency_graph: None,
        }
    }

    /// Records the scan and creates a pending record per file
    pub fn apply_scan(&mut self, scan: &ScanResult) {
        self.scanned_files = scan.files.clone();
        for path in &scan.files {
            self.analyses
                .entry(path.clone())
                .or_insert_with(|| FileRecord::pending(path));
        }
        info!(files = self.scanned_files.len(), "State updated with scan results");
    }

    pub fn record_analysis(&mut self, path: &str, rules: Vec<String>) {
        self.record(path, rules, FileStatus::Analyzed);
    }

    pub fn record_failure(&mut self, path: &str) {
        self.record(path, Vec::new(), FileStatus::Error);
    }

    fn record(&mut self, path: &str, rules: Vec<String>, status: FileStatus) {
        if !self.scanned_files.iter().any(|p| p == path) {
            warn!(file = %path, "File added to state outside of the scan");
        }
        let record = self
            .analyses
            .entry(path.to_string())
            .or_insert_with(|| FileRecord::pending(path));
        record.rules = rules;
        record.status = status;
    }

    pub fn set_modernization_plan(&mut self, plan: impl Into<String>) {
        self.modernization_plan = Some(plan.into());
        info!("Modernization plan stored in state");
    }

    pub fn status(&self) -> PipelineStatus {
        if self.modernization_plan.is_some() {
            PipelineStatus::Complete
        } else {
            PipelineStatus::Pending
        }
    }

    /// All rules across every analyzed file, in path order
    pub fn all_rules(&self) -> Vec<String> {
        self.analyses
            .values()
            .flat_map(|record| record.rules.iter().cloned())
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Pipeline state saved");
        Ok(())
    }

    /// Returns `Ok(None)` when no state has been saved yet
    pub fn load(path: &Path) -> Result<Option<Self>, StateError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }
}
