// Pipeline phases for business rule extraction
//
// Each phase owns its prompt builder and reads/writes the shared
// AnalysisContext. Only discovery can fail a run; every LLM-backed phase
// degrades to placeholder output.

pub mod llm_helper;

#[path = "01_discover.rs"]
pub mod discover;
#[path = "02_extract.rs"]
pub mod extract;
#[path = "03_synthesize.rs"]
pub mod synthesize;
#[path = "04_validate.rs"]
pub mod validate;
