//! Analysis invocation step.
//!
//! Builds the natural-language analysis instruction, invokes the defect
//! detection agent exactly once with the uploaded asset attached, and
//! assembles the draft report from the (normalized) reply. Assembly is total:
//! once the collaborator succeeded, no payload shape can fail the run.

use chrono::Utc;
use tracing::{info, warn};

use textilevision_agent::{
    AgentClient, AgentId, AgentInvocation, AgentReply, AssetId, normalize, parse_text_payload,
};
use textilevision_core::{FabricType, Inspection, InspectionId, InspectionStatus};

use crate::error::{ANALYSIS_FAILURE_MESSAGE, GENERIC_FAILURE_MESSAGE, PipelineError};

/// The single instruction sent to the defect detection agent.
pub fn analysis_instruction(batch_id: &str, fabric_type: FabricType) -> String {
    format!(
        "Analyze this textile fabric image for defects. Batch ID: {batch_id}, \
         Fabric Type: {fabric_type}. Identify all defects, classify severity \
         (critical, major, minor), calculate quality score (0-100), provide \
         pass/fail/conditional pass verdict, and give detailed recommendations."
    )
}

/// Wraps the opaque analysis-agent collaborator.
pub struct AnalysisInvocationStep<'a> {
    client: &'a dyn AgentClient,
    agent: AgentId,
}

impl<'a> AnalysisInvocationStep<'a> {
    pub fn new(client: &'a dyn AgentClient, agent: AgentId) -> Self {
        Self { client, agent }
    }

    /// One agent call with the asset attached. No retry; a reported failure
    /// surfaces the collaborator's message (or the generic fallback) and
    /// aborts the run.
    pub async fn invoke(
        &self,
        asset: AssetId,
        batch_id: &str,
        fabric_type: FabricType,
    ) -> Result<AgentReply, PipelineError> {
        let invocation = AgentInvocation::new(
            self.agent.clone(),
            analysis_instruction(batch_id, fabric_type),
        )
        .with_attachment(asset);

        let reply = self.client.invoke(&invocation).await.map_err(|err| {
            warn!(%err, agent = %self.agent, "analysis collaborator call failed");
            PipelineError::analysis(GENERIC_FAILURE_MESSAGE)
        })?;

        if !reply.success {
            return Err(PipelineError::analysis(
                reply.error_message(ANALYSIS_FAILURE_MESSAGE),
            ));
        }
        Ok(reply)
    }
}

/// Assemble a completed [`Inspection`] from a successful reply.
///
/// The raw textual result goes through the lenient parse and the normalizer;
/// the annotated overlay comes from the reply's first artifact file, falling
/// back to the uploaded image for display when absent.
pub fn draft_inspection(
    reply: &AgentReply,
    batch_id: &str,
    fabric_type: FabricType,
    image_url: &str,
) -> Inspection {
    let parsed = parse_text_payload(reply.result_text());
    let draft = normalize::inspection_report(&parsed);

    let inspection = Inspection {
        id: InspectionId::new(),
        batch_id: batch_id.trim().to_string(),
        fabric_type,
        date: Utc::now().date_naive(),
        image_url: image_url.to_string(),
        annotated_image_url: reply.annotated_image_url(),
        quality_score: draft.quality_score,
        verdict: draft.verdict,
        total_defects: draft.total_defects,
        critical_count: draft.critical_count,
        major_count: draft.major_count,
        minor_count: draft.minor_count,
        fabric_condition: draft.fabric_condition,
        defects: draft.defects,
        recommendations: draft.recommendations,
        status: InspectionStatus::Completed,
    };
    info!(
        inspection = %inspection.id,
        score = inspection.quality_score,
        verdict = %inspection.verdict,
        defects = inspection.defects.len(),
        "inspection report assembled"
    );
    inspection
}
