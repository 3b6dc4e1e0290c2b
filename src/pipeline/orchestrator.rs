use super::context::{AnalysisContext, PipelineContext};
use super::error::PipelineError;
use super::phase_trait::WorkflowPhase;
use super::phases::{
    discover::DiscoverPhase, extract::ExtractPhase, extract::ExtractionOutcome,
    synthesize::SynthesizePhase, validate::ValidatePhase,
};
use super::state::PipelineState;
use crate::progress::ProgressEvent;
use std::time::Instant;
use tracing::{debug, error, info};

/// Separates the draft plan from the QA review in the final report
pub const REVIEW_DELIMITER: &str = "\n\n---\n\n# QA Review\n";

pub fn compose_report(plan: &str, review: &str) -> String {
    format!("{}{}{}", plan, REVIEW_DELIMITER, review)
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: String,
    pub state: PipelineState,
    pub extraction: ExtractionOutcome,
}

/// Drives discovery, extraction, plan synthesis and validation in order
pub struct Orchestrator {
    context: PipelineContext,
}

impl Orchestrator {
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    pub async fn run(&self, location: &str) -> Result<RunOutcome, PipelineError> {
        let start = Instant::now();
        info!(location, "Orchestrator processing repository");
        self.context.emit(ProgressEvent::Started {
            location: location.to_string(),
        });

        let mut analysis = AnalysisContext::new(location);

        let workflow_phases: Vec<Box<dyn WorkflowPhase>> = vec![
            Box::new(DiscoverPhase),
            Box::new(ExtractPhase),
            Box::new(SynthesizePhase),
            Box::new(ValidatePhase),
        ];

        for phase in workflow_phases {
            let phase_name = phase.name();
            info!("Phase: {}", phase_name);
            self.context.emit(ProgressEvent::PhaseStarted {
                phase: phase_name.to_string(),
            });

            let phase_start = Instant::now();
            if let Err(e) = phase.execute(&self.context, &mut analysis).await {
                error!(phase = phase_name, "Phase failed: {}", e);
                self.context.emit(ProgressEvent::Failed {
                    error: e.to_string(),
                });
                return Err(e);
            }

            self.context.emit(ProgressEvent::PhaseComplete {
                phase: phase_name.to_string(),
                duration: phase_start.elapsed(),
            });
            debug!("Phase {} complete", phase_name);
        }

        let report = compose_report(
            analysis.plan.as_deref().unwrap_or_default(),
            analysis.review.as_deref().unwrap_or_default(),
        );
        analysis.state.set_modernization_plan(report.clone());
        self.persist(&analysis.state, &report);

        let extraction = analysis.extraction.take().unwrap_or_default();
        self.context.emit(ProgressEvent::Completed {
            files: analysis.state.scanned_files.len(),
            rules: extraction.rules.len(),
            total_time: start.elapsed(),
        });

        Ok(RunOutcome {
            report,
            state: analysis.state,
            extraction,
        })
    }

    /// Runs the pipeline on a private current-thread runtime
    ///
    /// Must not be called from within an async runtime.
    pub fn run_blocking(&self, location: &str) -> Result<RunOutcome, PipelineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(PipelineError::Runtime)?;
        runtime.block_on(self.run(location))
    }

    /// Failures here are logged and swallowed
    fn persist(&self, state: &PipelineState, report: &str) {
        if let Some(path) = &self.context.config.state_file {
            if let Err(e) = state.save(path) {
                error!(path = %path.display(), "Failed to save state: {}", e);
            }
        }

        if let Some(path) = &self.context.config.report_file {
            match std::fs::write(path, report) {
                Ok(()) => info!(path = %path.display(), "Report saved"),
                Err(e) => error!(path = %path.display(), "Failed to save report: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLLMClient, MockResponse};
    use crate::pipeline::{PipelineConfig, PipelineStatus};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> PipelineConfig {
        PipelineConfig::default()
            .with_state_file(Some(dir.path().join("project_state.json")))
            .with_report_file(Some(dir.path().join("final_report.md")))
    }

    #[test]
    fn test_compose_report() {
        assert_eq!(
            compose_report("Plan", "Pass"),
            "Plan\n\n---\n\n# QA Review\nPass"
        );
    }

    #[tokio::test]
    async fn test_missing_location_fails_without_persisting() {
        let out = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(PipelineContext::offline(
            Arc::new(MockLLMClient::new()),
            config_in(&out),
        ));

        let result = orchestrator
            .run(&out.path().join("missing").to_string_lossy())
            .await;

        assert!(matches!(result, Err(PipelineError::Discovery(_))));
        assert!(!out.path().join("project_state.json").exists());
        assert!(!out.path().join("final_report.md").exists());
    }

    #[tokio::test]
    async fn test_empty_repository_still_produces_report() {
        let repo = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let llm = Arc::new(MockLLMClient::new());
        llm.add_response(MockResponse::text("No code to modernize"));
        llm.add_response(MockResponse::text("Fail: nothing to review"));

        let orchestrator = Orchestrator::new(PipelineContext::offline(llm, config_in(&out)));
        let outcome = orchestrator
            .run(&repo.path().to_string_lossy())
            .await
            .unwrap();

        assert_eq!(
            outcome.report,
            "No code to modernize\n\n---\n\n# QA Review\nFail: nothing to review"
        );
        assert_eq!(outcome.state.status(), PipelineStatus::Complete);
        assert!(outcome.state.scanned_files.is_empty());
        assert!(out.path().join("final_report.md").exists());
    }

    #[test]
    fn test_run_blocking() {
        let repo = TempDir::new().unwrap();
        let llm = Arc::new(MockLLMClient::new());
        llm.add_response(MockResponse::text("plan"));
        llm.add_response(MockResponse::text("review"));

        let config = PipelineConfig::default()
            .with_state_file(None)
            .with_report_file(None);
        let orchestrator = Orchestrator::new(PipelineContext::offline(llm, config));
        let outcome = orchestrator
            .run_blocking(&repo.path().to_string_lossy())
            .unwrap();

        assert!(outcome.report.contains("# QA Review"));
    }
}
