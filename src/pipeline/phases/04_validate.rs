use super::llm_helper::query_llm;
use crate::pipeline::context::{AnalysisContext, PipelineContext};
use crate::pipeline::error::PipelineError;
use crate::pipeline::phase_trait::WorkflowPhase;
use async_trait::async_trait;
use tracing::{error, info};

pub const VALIDATION_FAILED_REVIEW: &str = "QA Validation Failed due to error.";

pub fn build_validation_prompt(plan: &str, rules: &[String]) -> String {
    let rule_list = rules
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are the Quality Assurance (QA) Lead.

Your goal is to validate the following Modernization Plan against the extracted Business Rules.

Extracted Business Rules:
{rule_list}

Proposed Modernization Plan:
{plan}

Task:
1. Verify that the plan addresses the business rules.
2. Check for any hallucinations (claims about code that isn't in the rules).
3. Rate the plan's quality (Pass/Fail).

Output your review in Markdown format.
"#
    )
}

/// Cross-checks `plan` against `rules`; failures become a placeholder review
pub async fn validate_plan(pipeline: &PipelineContext, plan: &str, rules: &[String]) -> String {
    info!("QA reviewing the plan");
    let prompt = build_validation_prompt(plan, rules);
    match query_llm(pipeline.llm_client.as_ref(), prompt, "validation").await {
        Ok(review) => {
            info!("QA review complete");
            review
        }
        Err(e) => {
            error!("QA validation failed: {}", e);
            VALIDATION_FAILED_REVIEW.to_string()
        }
    }
}

pub struct ValidatePhase;

#[async_trait]
impl WorkflowPhase for ValidatePhase {
    fn name(&self) -> &'static str {
        "ValidatePhase"
    }

    async fn execute(
        &self,
        pipeline: &PipelineContext,
        context: &mut AnalysisContext,
    ) -> Result<(), PipelineError> {
        let plan = context.plan.as_deref().unwrap_or_default();
        let review = validate_plan(pipeline, plan, context.rules()).await;
        context.review = Some(review);
        Ok(())
    }
}
