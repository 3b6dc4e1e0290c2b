use super::context::{AnalysisContext, PipelineContext};
use super::error::PipelineError;
use async_trait::async_trait;

#[async_trait]
pub trait WorkflowPhase: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(
        &self,
        pipeline: &PipelineContext,
        context: &mut AnalysisContext,
    ) -> Result<(), PipelineError>;
}
