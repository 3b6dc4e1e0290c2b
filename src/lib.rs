//! logicmapper - business rule extraction for legacy codebases
//!
//! Walks a local directory or a shallow clone of a remote repository,
//! compresses each source file, and asks an LLM for the business rules it
//! encodes. Rules are kept in a semantic memory bank that later files (and
//! later runs) recall from. The collected rules feed a modernization plan,
//! which a second prompt reviews before the report is written.
//!
//! # Example Usage
//!
//! ```no_run
//! use logicmapper::pipeline::{Orchestrator, PipelineConfig, PipelineContext};
//! use logicmapper::LogicMapperConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LogicMapperConfig::default();
//! let context = PipelineContext::offline(config.create_llm_client(), PipelineConfig::default());
//! let outcome = Orchestrator::new(context).run("./legacy-billing").await?;
//! println!("{}", outcome.report);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`compress`]: comment and blank-line stripping before prompting
//! - [`memory`]: embedding-backed rule store with cosine recall
//! - [`pipeline`]: discovery, extraction, synthesis and validation phases
//! - [`llm`], [`embeddings`], [`search`]: external service clients

pub mod cli;
pub mod compress;
pub mod config;
pub mod embeddings;
pub mod git;
pub mod llm;
pub mod memory;
pub mod pipeline;
pub mod progress;
pub mod search;
pub mod util;

pub use compress::{CompressionStats, ContextCompressor};
pub use config::{ConfigError, LogicMapperConfig};
pub use llm::{BackendError, GenAIClient, LLMClient, MockLLMClient, MockResponse};
pub use memory::{MemoryError, RecalledRule, SemanticMemoryStore};
pub use pipeline::{Orchestrator, PipelineContext, PipelineError, PipelineState, RunOutcome};
pub use progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
