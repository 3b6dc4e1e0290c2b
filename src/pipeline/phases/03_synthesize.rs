use super::discover::ScanResult;
use super::llm_helper::query_llm;
use crate::pipeline::context::{AnalysisContext, PipelineContext};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;
use tracing::{error, info};

pub fn build_architect_prompt(location: &str, scan: &ScanResult, rules: &[String]) -> String {
    let languages = scan
        .language_histogram
        .iter()
        .map(|(extension, count)| format!("{}: {}", extension, count))
        .collect::<Vec<_>>()
        .join(", ");
    let rule_list = if rules.is_empty() {
        "(none extracted)".to_string()
    } else {
        rules
            .iter()
            .map(|rule| format!("- {}", rule))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are the Lead Architect.
A scan of the repository '{location}' has been completed.

Scan Summary:
{summary}

Detected Languages:
{languages}

Extracted Business Rules:
{rule_list}

Please generate a preliminary modernization report outlining the next steps.
"#,
        summary = scan.summary,
    )
}

/// Drafts the modernization plan; failures become a placeholder plan
pub async fn synthesize_plan(
    pipeline: &PipelineContext,
    location: &str,
    scan: &ScanResult,
    rules: &[String],
) -> String {
    let prompt = build_architect_prompt(location, scan, rules);
    match query_llm(pipeline.llm_client.as_ref(), prompt, "synthesis").await {
        Ok(plan) => {
            info!(chars = plan.len(), "Modernization plan generated");
            plan
        }
        Err(e) => {
            error!("Failed to generate plan: {}", e);
            format!("Error generating modernization plan: {}", e)
        }
    }
}

pub struct SynthesizePhase;

#[async_trait]
impl WorkflowPhase for SynthesizePhase {
    fn name(&self) -> &'static str {
        "SynthesizePhase"
    }

    async fn execute(
        &self,
        pipeline: &PipelineContext,
        context: &mut AnalysisContext,
    ) -> Result<(), PipelineError> {
        let empty_scan;
        let scan = match context.scan.as_ref() {
            Some(scan) => scan,
            None => {
                empty_scan = ScanResult::from_files(Default::default(), Vec::new());
                &empty_scan
            }
        };

        let plan = synthesize_plan(pipeline, &context.location, scan, context.rules()).await;
        context.plan = Some(plan);
        Ok(())
    }
}
