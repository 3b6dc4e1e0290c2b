use crate::git;
use crate::pipeline::context::{AnalysisContext, PipelineContext};
use crate::pipeline::error::{DiscoveryError, PipelineError};
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;
use ignore::WalkBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Extensions considered source code worth analyzing
pub const ALLOWED_EXTENSIONS: &[&str] = &[".py", ".java", ".js", ".ts", ".cpp", ".h", ".c"];

const REMOTE_PREFIXES: &[&str] = &["http://", "https://", "git@", "git://"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    /// Directory the relative paths in `files` resolve against. Empty for a
    /// single-file scan, where `files` holds the location itself.
    pub root: PathBuf,
    pub files: Vec<String>,
    pub language_histogram: BTreeMap<String, usize>,
    pub summary: String,
}

impl ScanResult {
    pub fn from_files(root: PathBuf, files: Vec<String>) -> Self {
        let mut language_histogram = BTreeMap::new();
        for file in &files {
            let extension = extension_of(file);
            if !extension.is_empty() {
                *language_histogram.entry(extension).or_insert(0) += 1;
            }
        }

        let languages: Vec<&str> = language_histogram.keys().map(String::as_str).collect();
        let summary = format!(
            "Scanned {} files. Languages: {}",
            files.len(),
            languages.join(", ")
        );

        Self {
            root,
            files,
            language_histogram,
            summary,
        }
    }

    pub fn full_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Extension including the leading dot, or an empty string
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn is_allowed(path: &str) -> bool {
    let extension = extension_of(path);
    ALLOWED_EXTENSIONS.contains(&extension.as_str())
}

/// Whether `location` should be cloned rather than read from disk
///
/// Any http(s) URL counts, git hosting or not. `ssh://` URLs and bare
/// `host:path` scp syntax are not recognized.
pub fn is_remote_repository(location: &str) -> bool {
    REMOTE_PREFIXES
        .iter()
        .any(|prefix| location.starts_with(prefix))
}

/// Turns a GitHub web URL into something `git clone` accepts
///
/// `https://github.com/org/repo/blob/main/app.py` becomes
/// `https://github.com/org/repo.git`. Non-GitHub locations pass through.
pub fn normalize_remote_url(location: &str) -> String {
    let mut url = location.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string();

    if !url.contains("github.com") {
        return url;
    }

    for separator in ["/blob/", "/tree/"] {
        if let Some(index) = url.find(separator) {
            url.truncate(index);
            debug!(url = %url, "Converted web URL to clone URL");
            break;
        }
    }

    let trimmed_len = url.trim_end_matches('/').len();
    url.truncate(trimmed_len);
    if !url.ends_with(".git") {
        url.push_str(".git");
    }
    url
}

/// Enumerates candidate source files at `location`
pub async fn discover(location: &str, clone_timeout: Duration) -> Result<ScanResult, DiscoveryError> {
    if is_remote_repository(location) {
        let destination = git::clone_destination();
        git::shallow_clone(location, &destination, clone_timeout).await?;
        return scan_local(&destination);
    }

    scan_local(Path::new(location))
}

/// Scans a local file or directory
pub fn scan_local(path: &Path) -> Result<ScanResult, DiscoveryError> {
    let start = Instant::now();
    info!(path = %path.display(), "Scanning path");

    if !path.exists() {
        return Err(DiscoveryError::NotFound(path.to_path_buf()));
    }

    if path.is_file() {
        let location = path.to_string_lossy().to_string();
        let files = if is_allowed(&location) {
            vec![location]
        } else {
            Vec::new()
        };
        return Ok(ScanResult::from_files(PathBuf::new(), files));
    }

    let mut files = Vec::new();
    let walker = WalkBuilder::new(path)
        .standard_filters(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let relative = match entry.path().strip_prefix(path) {
            Ok(relative) => relative.to_string_lossy().to_string(),
            Err(_) => continue,
        };

        if is_allowed(&relative) {
            files.push(relative);
        }
    }

    let scan = ScanResult::from_files(path.to_path_buf(), files);
    info!(
        files = scan.files.len(),
        scan_time_ms = start.elapsed().as_millis(),
        "Found code files"
    );
    Ok(scan)
}

pub struct DiscoverPhase;

#[async_trait]
impl WorkflowPhase for DiscoverPhase {
    fn name(&self) -> &'static str {
        "DiscoverPhase"
    }

    async fn execute(
        &self,
        pipeline: &PipelineContext,
        context: &mut AnalysisContext,
    ) -> Result<(), PipelineError> {
        let scan = discover(&context.location, pipeline.config.clone_timeout).await?;
        info!(summary = %scan.summary, "Scanner results");

        context.state.apply_scan(&scan);
        context.scan = Some(scan);
        Ok(())
    }
}
