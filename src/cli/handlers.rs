use crate::cli::commands::{AnalyzeArgs, ResetArgs, StatusArgs};
use crate::config::{default_model, LogicMapperConfig};
use crate::memory::{SemanticMemoryStore, MEMORY_FILE_NAME};
use crate::pipeline::{
    is_remote_repository, normalize_remote_url, Orchestrator, PipelineContext, PipelineState,
};
use crate::progress::LoggingHandler;
use crate::search::{DisabledSearch, WebSearch};
use anyhow::{Context, Result};
use chrono::Utc;
use genai::adapter::AdapterKind;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub async fn handle_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    let config = analyze_config(args);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }
    debug!("{}", config);

    install_panic_hook(config.crash_log.clone());

    match run_analysis(args, &config).await {
        Ok(report) => {
            if !quiet {
                println!("{}", report);
            }
            0
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            match write_crash_record(&config.crash_log, &format!("{:?}", e)) {
                Ok(()) => eprintln!(
                    "An unexpected error occurred. Details were written to {}",
                    config.crash_log.display()
                ),
                Err(io_err) => {
                    error!("Failed to write crash record: {}", io_err);
                    eprintln!("An unexpected error occurred.");
                }
            }
            if matches!(config.provider, AdapterKind::Ollama) {
                eprintln!("  - Ensure Ollama is running: ollama serve");
            }
            1
        }
    }
}

fn analyze_config(args: &AnalyzeArgs) -> LogicMapperConfig {
    let default_config = LogicMapperConfig::default();
    let provider = args.provider.unwrap_or(default_config.provider);
    let model = match (&args.model, args.provider) {
        (Some(model), _) => model.clone(),
        (None, Some(provider)) if provider != default_config.provider => {
            default_model(provider).unwrap_or_default().to_string()
        }
        _ => default_config.model.clone(),
    };

    let config = LogicMapperConfig {
        provider,
        model,
        state_file: args
            .state_file
            .clone()
            .unwrap_or(default_config.state_file.clone()),
        report_file: args
            .report_file
            .clone()
            .unwrap_or(default_config.report_file.clone()),
        memory_dir: args
            .memory_dir
            .clone()
            .unwrap_or(default_config.memory_dir.clone()),
        ..default_config
    };

    if args.provider.is_some() {
        debug!("Provider explicitly set to: {:?}", config.provider);
    }
    if args.model.is_some() {
        debug!("Model overridden to: {}", config.model);
    }
    config
}

async fn run_analysis(args: &AnalyzeArgs, config: &LogicMapperConfig) -> Result<String> {
    let location = if is_remote_repository(&args.location) {
        normalize_remote_url(&args.location)
    } else {
        args.location.clone()
    };
    info!(location = %location, "Starting LogicMapper");

    let embedder = config
        .create_embedder()
        .context("Failed to initialize embeddings")?;
    let memory = SemanticMemoryStore::open(&config.memory_dir, embedder).with_context(|| {
        format!(
            "Failed to open memory bank at {}",
            config.memory_dir.display()
        )
    })?;

    let search: Arc<dyn WebSearch> = if args.no_search {
        debug!("Web research disabled");
        Arc::new(DisabledSearch)
    } else {
        config
            .create_search()
            .context("Failed to initialize web search")?
    };

    let context = PipelineContext::new(
        config.create_llm_client(),
        Arc::new(memory),
        search,
        Arc::new(LoggingHandler),
        config.pipeline_config(),
    );

    let outcome = Orchestrator::new(context)
        .run(&location)
        .await
        .with_context(|| format!("Pipeline run failed for {}", location))?;

    info!(
        files = outcome.state.scanned_files.len(),
        rules = outcome.extraction.rules.len(),
        "Analysis complete"
    );
    Ok(outcome.report)
}

pub async fn handle_status(args: &StatusArgs) -> i32 {
    let path = args
        .state_file
        .clone()
        .unwrap_or_else(|| LogicMapperConfig::default().state_file);

    match PipelineState::load(&path) {
        Ok(Some(state)) => {
            print!("{}", format_status(&state));
            0
        }
        Ok(None) => {
            println!("No pipeline state found at {}", path.display());
            0
        }
        Err(e) => {
            error!(path = %path.display(), "Failed to load state: {}", e);
            1
        }
    }
}

/// Plain-text summary of a persisted run
pub fn format_status(state: &PipelineState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Project: {}", state.project_name);
    let _ = writeln!(out, "Repository: {}", state.repo_path);
    let _ = writeln!(
        out,
        "Started: {}",
        state.start_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Status: {}", state.status());
    let _ = writeln!(out, "Scanned files: {}", state.scanned_files.len());

    if !state.analyses.is_empty() {
        let _ = writeln!(out, "\nRules per file:");
        for record in state.analyses.values() {
            let _ = writeln!(
                out,
                "  {} - {} rules ({:?})",
                record.path,
                record.rules.len(),
                record.status
            );
        }
    }
    out
}

pub async fn handle_reset(args: &ResetArgs) -> i32 {
    let config = LogicMapperConfig::default();
    match reset(&config, args.memory || args.all, args.all) {
        Ok(removed) => {
            for path in removed {
                println!("Removed {}", path.display());
            }
            println!("Reset complete");
            0
        }
        Err(e) => {
            error!("Reset failed: {:#}", e);
            1
        }
    }
}

/// Clears the memory bank when `memory` is set and deletes the state,
/// report and crash files when `outputs` is set
///
/// Returns the output files that were actually removed.
pub fn reset(config: &LogicMapperConfig, memory: bool, outputs: bool) -> Result<Vec<PathBuf>> {
    if memory {
        clear_memory(config)?;
    }

    let mut removed = Vec::new();
    if outputs {
        for path in [&config.state_file, &config.report_file, &config.crash_log] {
            if remove_if_exists(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?
            {
                removed.push(path.clone());
            }
        }
    }
    Ok(removed)
}

fn clear_memory(config: &LogicMapperConfig) -> Result<()> {
    let embedder = config
        .create_embedder()
        .context("Failed to initialize embeddings")?;

    match SemanticMemoryStore::open(&config.memory_dir, embedder) {
        Ok(store) => store.clear().context("Failed to clear memory bank"),
        Err(e) => {
            warn!("Memory bank unreadable ({}), removing it directly", e);
            remove_if_exists(&config.memory_dir.join(MEMORY_FILE_NAME))
                .context("Failed to remove memory bank")?;
            Ok(())
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Appends a timestamped entry to the crash log
pub fn write_crash_record(path: &Path, details: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "[{}] {}", Utc::now().to_rfc3339(), details)?;
    writeln!(file, "{}", "-".repeat(50))
}

/// Records panics in the crash log before the default hook runs
pub fn install_panic_hook(crash_log: PathBuf) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = write_crash_record(&crash_log, &format!("panic: {}", info));
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbeddingBackend, SearchBackend};
    use crate::memory::Metadata;
    use crate::embeddings::HashingEmbedder;
    use crate::pipeline::FileStatus;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> LogicMapperConfig {
        LogicMapperConfig {
            state_file: dir.path().join("project_state.json"),
            report_file: dir.path().join("final_report.md"),
            crash_log: dir.path().join("crash.log"),
            memory_dir: dir.path().join("memory_bank"),
            embeddings: EmbeddingBackend::Hashing,
            search: SearchBackend::Disabled,
            ..LogicMapperConfig::default()
        }
    }

    #[test]
    fn test_write_crash_record_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crash.log");

        write_crash_record(&path, "first failure").unwrap();
        write_crash_record(&path, "second failure").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("first failure"));
        assert!(content.contains("second failure"));
    }

    #[test]
    fn test_format_status() {
        let mut state = PipelineState::new("/repo");
        state.analyses.insert(
            "a.py".to_string(),
            crate::pipeline::FileRecord {
                path: "a.py".to_string(),
                language: ".py".to_string(),
                rules: vec!["r1".to_string(), "r2".to_string()],
                status: FileStatus::Analyzed,
            },
        );
        state.scanned_files = vec!["a.py".to_string()];

        let out = format_status(&state);
        assert!(out.contains("Repository: /repo"));
        assert!(out.contains("Status: pending"));
        assert!(out.contains("Scanned files: 1"));
        assert!(out.contains("a.py - 2 rules (Analyzed)"));
    }

    #[tokio::test]
    async fn test_reset_memory_keeps_outputs() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let store =
            SemanticMemoryStore::open(&config.memory_dir, Arc::new(HashingEmbedder::default()))
                .unwrap();
        store
            .store(&["Orders over $500 ship free".to_string()], &Metadata::new())
            .await
            .unwrap();
        std::fs::write(&config.report_file, "report").unwrap();

        let removed = reset(&config, true, false).unwrap();

        assert!(removed.is_empty());
        assert!(!config.memory_dir.join(MEMORY_FILE_NAME).exists());
        assert!(config.report_file.exists());
    }

    #[test]
    fn test_reset_all_removes_outputs() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.state_file, "{}").unwrap();
        std::fs::write(&config.report_file, "report").unwrap();

        let removed = reset(&config, true, true).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!config.state_file.exists());
        assert!(!config.report_file.exists());
    }

    #[test]
    fn test_reset_recovers_from_corrupt_memory() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(&config.memory_dir).unwrap();
        std::fs::write(config.memory_dir.join(MEMORY_FILE_NAME), "not json").unwrap();

        reset(&config, true, false).unwrap();

        assert!(!config.memory_dir.join(MEMORY_FILE_NAME).exists());
    }
}
