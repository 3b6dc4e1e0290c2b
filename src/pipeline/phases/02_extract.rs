use super::discover::{extension_of, ScanResult};
use super::llm_helper::query_llm;
use crate::compress::ContextCompressor;
use crate::memory::Metadata;
use crate::pipeline::context::{AnalysisContext, PipelineContext};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::progress::ProgressEvent;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Libraries too ubiquitous to be worth a web search
pub const COMMON_LIBRARIES: &[&str] = &[
    "os",
    "sys",
    "json",
    "time",
    "datetime",
    "re",
    "math",
    "random",
    "typing",
    "collections",
    "logging",
    "java",
    "javax",
];

/// Characters of the compressed body used as the memory recall query
const RECALL_QUERY_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum FileOutcome {
    Analyzed { rules: Vec<String> },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionOutcome {
    /// Every extracted rule, in file order
    pub rules: Vec<String>,
    pub files: Vec<(String, FileOutcome)>,
}

fn js_import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*import\s+(?:.+?\s+from\s+)?['"]([^'"]+)['"]"#).expect("valid regex")
    })
}

fn python_from_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*from\s+([\w.]+)\s+import\b").expect("valid regex"))
}

fn java_import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;").expect("valid regex")
    })
}

fn python_import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*import\s+([\w.]+(?:\s+as\s+\w+)?(?:\s*,\s*[\w.]+(?:\s+as\s+\w+)?)*)\s*$")
            .expect("valid regex")
    })
}

fn require_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex"))
}

fn numbered_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)]\s*").expect("valid regex"))
}

fn module_root(module: &str) -> Option<String> {
    if module.starts_with('.') || module.starts_with('/') {
        return None;
    }
    let root = if module.starts_with('@') {
        module.splitn(3, '/').take(2).collect::<Vec<_>>().join("/")
    } else {
        module.split('/').next().unwrap_or_default().to_string()
    };
    let root = root.split('.').next().unwrap_or_default().to_string();
    (!root.is_empty()).then_some(root)
}

/// Imported library names that are not in [`COMMON_LIBRARIES`]
///
/// Recognizes Python `import`/`from` statements, ES module imports,
/// CommonJS `require` and Java imports. Relative imports are ignored.
/// Order of first appearance is preserved.
pub fn uncommon_imports(content: &str) -> Vec<String> {
    let mut libraries: Vec<String> = Vec::new();
    let mut push = |name: Option<String>| {
        if let Some(name) = name {
            if !COMMON_LIBRARIES.contains(&name.as_str()) && !libraries.contains(&name) {
                libraries.push(name);
            }
        }
    };

    for line in content.lines() {
        if let Some(caps) = js_import_regex().captures(line) {
            push(module_root(&caps[1]));
        } else if let Some(caps) = python_from_regex().captures(line) {
            push(module_root(&caps[1]));
        } else if let Some(caps) = java_import_regex().captures(line) {
            push(module_root(&caps[1]));
        } else if let Some(caps) = python_import_regex().captures(line) {
            for item in caps[1].split(',') {
                let module = item.split_whitespace().next().unwrap_or_default();
                push(module_root(module));
            }
        }

        for caps in require_regex().captures_iter(line) {
            push(module_root(&caps[1]));
        }
    }

    libraries
}

/// Best-effort split of a completion into individual rules
pub fn parse_rules(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .map(|line| {
            let unbulleted = line.trim_start_matches(|c: char| {
                matches!(c, '-' | '*' | '•' | '+') || c.is_whitespace()
            });
            numbered_prefix_regex()
                .replace(unbulleted, "")
                .trim()
                .to_string()
        })
        .filter(|rule| !rule.is_empty())
        .collect()
}

/// Human-readable language name for search queries
fn language_name(extension: &str) -> &'static str {
    match extension {
        ".py" => "python",
        ".js" => "javascript",
        ".ts" => "typescript",
        ".java" => "java",
        ".c" | ".h" => "c",
        ".cpp" => "c++",
        _ => "programming",
    }
}

pub fn build_extraction_prompt(
    filename: &str,
    content: &str,
    search_context: &str,
    memory_context: &str,
) -> String {
    format!(
        r#"Analyze the following code file: '{filename}'

Extract all BUSINESS RULES found in this code.
A business rule is a specific logic statement that dictates how the business operates (e.g., "VIPs get 20% off", "Tax is 5%").
Ignore boilerplate, imports, and technical setup.
{search_context}{memory_context}
Respond with only the business rules, one per line, with no numbering, headings or commentary.

Code Content:
```
{content}
```
"#
    )
}

async fn research_imports(pipeline: &PipelineContext, content: &str, extension: &str) -> String {
    let libraries = uncommon_imports(content);
    let Some(first) = libraries.first() else {
        return String::new();
    };

    let query = format!("{} {} library documentation", first, language_name(extension));
    match pipeline
        .search
        .search(&query, pipeline.config.search_results)
        .await
    {
        Ok(hits) if !hits.is_empty() => {
            let mut context = String::from("\nAdditional Context from Web Search:\n");
            for hit in hits {
                context.push_str(&format!("- {}: {}\n", hit.title, hit.snippet));
            }
            context
        }
        Ok(_) => String::new(),
        Err(e) => {
            warn!(query = %query, "Web search failed: {}", e);
            String::new()
        }
    }
}

async fn recall_memory(pipeline: &PipelineContext, path: &str, compressed: &str) -> (String, usize) {
    let head: String = compressed.chars().take(RECALL_QUERY_CHARS).collect();
    let query = format!("{}\n{}", path, head);

    match pipeline
        .memory
        .search_similar(&query, pipeline.config.recall_limit)
        .await
    {
        Ok(recalled) if !recalled.is_empty() => {
            let mut context = String::from("\nRelevant Business Rules from Memory Bank:\n");
            for item in &recalled {
                context.push_str(&format!("- {}\n", item.rule));
            }
            (context, recalled.len())
        }
        Ok(_) => (String::new(), 0),
        Err(e) => {
            warn!(file = %path, "Memory recall unavailable: {}", e);
            (String::new(), 0)
        }
    }
}

/// Runs rule extraction over every scanned file, strictly in order
pub async fn extract(pipeline: &PipelineContext, scan: &ScanResult) -> ExtractionOutcome {
    let compressor = ContextCompressor::new();
    let total = scan.files.len();
    let mut outcome = ExtractionOutcome::default();

    info!(files = total, "Analyst starting logic extraction");

    for (index, path) in scan.files.iter().enumerate() {
        let full_path = scan.full_path(path);
        let content = match tokio::fs::read_to_string(&full_path).await {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => {
                skip(pipeline, &mut outcome, path, "empty file".to_string());
                continue;
            }
            Err(e) => {
                skip(pipeline, &mut outcome, path, e.to_string());
                continue;
            }
        };

        let extension = extension_of(path);
        let compressed = compressor.compress(&content, &extension);

        let search_context = research_imports(pipeline, &compressed, &extension).await;
        let (memory_context, recalled) = recall_memory(pipeline, path, &compressed).await;
        pipeline.emit(ProgressEvent::MemoryRecalled {
            path: path.clone(),
            count: recalled,
        });

        info!(file = %path, "Analyzing file");
        let prompt = build_extraction_prompt(path, &compressed, &search_context, &memory_context);

        match query_llm(pipeline.llm_client.as_ref(), prompt, "extraction").await {
            Ok(text) => {
                let rules = parse_rules(&text);
                if !rules.is_empty() {
                    let mut metadata = Metadata::new();
                    metadata.insert("file".to_string(), path.clone());
                    if let Err(e) = pipeline.memory.store(&rules, &metadata).await {
                        warn!(file = %path, "Failed to store rules in memory bank: {}", e);
                    }
                }

                pipeline.emit(ProgressEvent::FileAnalyzed {
                    path: path.clone(),
                    rules: rules.len(),
                    index: index + 1,
                    total,
                });
                outcome.rules.extend(rules.iter().cloned());
                outcome
                    .files
                    .push((path.clone(), FileOutcome::Analyzed { rules }));
            }
            Err(e) => {
                pipeline.emit(ProgressEvent::FileFailed {
                    path: path.clone(),
                    error: e.to_string(),
                });
                outcome.files.push((
                    path.clone(),
                    FileOutcome::Failed {
                        error: e.to_string(),
                    },
                ));
            }
        }
    }

    info!(rules = outcome.rules.len(), "Analysis complete");
    outcome
}

fn skip(pipeline: &PipelineContext, outcome: &mut ExtractionOutcome, path: &str, reason: String) {
    debug!(file = %path, reason = %reason, "Skipping unreadable file");
    pipeline.emit(ProgressEvent::FileSkipped {
        path: path.to_string(),
        reason: reason.clone(),
    });
    outcome
        .files
        .push((path.to_string(), FileOutcome::Skipped { reason }));
}

pub struct ExtractPhase;

#[async_trait]
impl WorkflowPhase for ExtractPhase {
    fn name(&self) -> &'static str {
        "ExtractPhase"
    }

    async fn execute(
        &self,
        pipeline: &PipelineContext,
        context: &mut AnalysisContext,
    ) -> Result<(), PipelineError> {
        let outcome = match context.scan.as_ref() {
            Some(scan) => extract(pipeline, scan).await,
            None => ExtractionOutcome::default(),
        };

        for (path, file_outcome) in &outcome.files {
            match file_outcome {
                FileOutcome::Analyzed { rules } => {
                    context.state.record_analysis(path, rules.clone())
                }
                FileOutcome::Failed { .. } => context.state.record_failure(path),
                FileOutcome::Skipped { .. } => {}
            }
        }

        context.extraction = Some(outcome);
        Ok(())
    }
}
