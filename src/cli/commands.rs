use crate::config::parse_provider;
use clap::{ArgGroup, Parser, Subcommand};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// LLM-driven business rule extraction for legacy codebases
#[derive(Parser, Debug)]
#[command(
    name = "logicmapper",
    about = "LLM-driven business rule extraction for legacy codebases",
    version,
    author,
    long_about = "logicmapper walks a local directory or remote git repository, extracts the \
                  business rules embedded in each source file with an LLM, remembers them \
                  across runs, and produces a reviewed modernization report."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Extract business rules and produce a modernization report",
        long_about = "Discovers source files, extracts business rules file by file, synthesizes \
                      a modernization plan and appends a QA review.\n\n\
                      Examples:\n  \
                      logicmapper analyze ./legacy-billing\n  \
                      logicmapper analyze https://github.com/acme/billing\n  \
                      logicmapper analyze ./src --provider ollama --model qwen2.5-coder:7b"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Show the persisted state of the last run",
        long_about = "Prints the pipeline status, the number of scanned files and the rules \
                      found per file.\n\n\
                      Examples:\n  \
                      logicmapper status\n  \
                      logicmapper status --state-file out/project_state.json"
    )]
    Status(StatusArgs),

    #[command(
        about = "Forget stored rules and, optionally, run outputs",
        long_about = "Clears the semantic memory bank. With --all the state file, report and \
                      crash log are removed as well.\n\n\
                      Examples:\n  \
                      logicmapper reset --memory\n  \
                      logicmapper reset --all"
    )]
    Reset(ResetArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(
        value_name = "LOCATION",
        help = "Local directory or http(s) git repository URL"
    )]
    pub location: String,

    #[arg(
        short = 'p',
        long,
        value_parser = parse_adapter_kind,
        help = "LLM provider (gemini, openai, anthropic, ollama, ...)"
    )]
    pub provider: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Model name to use (provider-specific)"
    )]
    pub model: Option<String>,

    #[arg(long, value_name = "FILE", help = "Where to persist the pipeline state")]
    pub state_file: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Where to write the final report")]
    pub report_file: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Directory of the semantic memory bank")]
    pub memory_dir: Option<PathBuf>,

    #[arg(long, help = "Skip web research on uncommon imports")]
    pub no_search: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, value_name = "FILE", help = "State file to read")]
    pub state_file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("scope")
        .required(true)
        .multiple(true)
        .args(["memory", "all"])
))]
pub struct ResetArgs {
    #[arg(long, help = "Clear the semantic memory bank")]
    pub memory: bool,

    #[arg(
        long,
        help = "Clear the memory bank and remove the state file, report and crash log"
    )]
    pub all: bool,
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    parse_provider(s).map_err(|e| e.to_string())
}
