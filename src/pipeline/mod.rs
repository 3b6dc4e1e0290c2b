pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;
pub mod state;

pub use config::PipelineConfig;
pub use context::{AnalysisContext, PipelineContext};
pub use error::{DiscoveryError, PipelineError, StateError};
pub use orchestrator::{compose_report, Orchestrator, RunOutcome, REVIEW_DELIMITER};
pub use phase_trait::WorkflowPhase;
pub use phases::discover::{
    discover, is_remote_repository, normalize_remote_url, ScanResult, ALLOWED_EXTENSIONS,
};
pub use phases::extract::{parse_rules, uncommon_imports, ExtractionOutcome, FileOutcome};
pub use state::{FileRecord, FileStatus, PipelineState, PipelineStatus};
