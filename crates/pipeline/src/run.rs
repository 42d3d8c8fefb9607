//! Inspection pipeline orchestrator.
//!
//! `Idle → Validating → Uploading → Invoking → Normalizing → Succeeded |
//! Failed`. A run starts only from `Idle` or a terminal state, and always
//! ends in a terminal state with the tracker and gauge reconciled — failure
//! never leaves a stage animation or progress percentage behind.

use tracing::{info, warn};

use textilevision_agent::{AgentClient, AgentEndpoints, AgentId, ImageFile};
use textilevision_core::{FabricType, Inspection};

use crate::analyze::{AnalysisInvocationStep, draft_inspection};
use crate::error::PipelineError;
use crate::progress::{Milestone, ProgressGauge, StageSchedule, StageTracker};
use crate::upload::AssetUploadStep;

/// Phase of the current (or last) run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Validating,
    Uploading,
    Invoking,
    Normalizing,
    Succeeded,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }

    /// A new run may begin only from `Idle` or a terminal state.
    pub fn can_start(self) -> bool {
        self == RunState::Idle || self.is_terminal()
    }
}

/// Operator input for a run. Starting with an incomplete form is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionForm {
    pub file: Option<ImageFile>,
    pub batch_id: String,
    pub fabric_type: Option<FabricType>,
    /// Local preview reference created at file selection; becomes the
    /// report's `image_url`.
    pub preview_url: String,
}

impl InspectionForm {
    pub fn is_complete(&self) -> bool {
        self.file.is_some() && !self.batch_id.trim().is_empty() && self.fabric_type.is_some()
    }
}

/// Result of [`InspectionPipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The form was incomplete (or a run was active); nothing happened.
    Skipped,
    Succeeded(Inspection),
    Failed(PipelineError),
}

/// Sequences upload → analysis against the remote agent and drives the
/// operator-feedback indicators.
pub struct InspectionPipeline<'a> {
    client: &'a dyn AgentClient,
    agent: AgentId,
    tracker: StageTracker,
    gauge: ProgressGauge,
    state: RunState,
}

impl<'a> InspectionPipeline<'a> {
    pub fn new(client: &'a dyn AgentClient, endpoints: &AgentEndpoints) -> Self {
        Self::with_schedule(client, endpoints, StageSchedule::default())
    }

    pub fn with_schedule(
        client: &'a dyn AgentClient,
        endpoints: &AgentEndpoints,
        schedule: StageSchedule,
    ) -> Self {
        Self {
            client,
            agent: endpoints.analysis.clone(),
            tracker: StageTracker::new(schedule),
            gauge: ProgressGauge::new(),
            state: RunState::default(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn tracker(&self) -> &StageTracker {
        &self.tracker
    }

    pub fn gauge(&self) -> &ProgressGauge {
        &self.gauge
    }

    /// Execute one full inspection run.
    ///
    /// On success the finished [`Inspection`] is handed back to the caller,
    /// which owns inserting it into the log and navigating.
    pub async fn run(&mut self, form: &InspectionForm) -> RunOutcome {
        if !self.state.can_start() || !form.is_complete() {
            return RunOutcome::Skipped;
        }
        // `is_complete` just proved these present.
        let Some(file) = form.file.as_ref() else {
            return RunOutcome::Skipped;
        };
        let Some(fabric_type) = form.fabric_type else {
            return RunOutcome::Skipped;
        };
        let batch_id = form.batch_id.trim();

        info!(batch = batch_id, fabric = %fabric_type, "inspection run started");
        self.state = RunState::Validating;
        self.gauge.advance(Milestone::Started);
        self.tracker.start();

        if let Err(err) = AssetUploadStep::validate(file) {
            return self.fail(err);
        }
        self.gauge.advance(Milestone::Validated);

        self.state = RunState::Uploading;
        let upload = AssetUploadStep::new(self.client);
        let asset = match upload.upload(file).await {
            Ok(asset) => asset,
            Err(err) => return self.fail(err),
        };
        self.gauge.advance(Milestone::Uploaded);

        self.state = RunState::Invoking;
        self.gauge.advance(Milestone::Invoking);
        let analysis = AnalysisInvocationStep::new(self.client, self.agent.clone());
        let reply = match analysis.invoke(asset, batch_id, fabric_type).await {
            Ok(reply) => reply,
            Err(err) => return self.fail(err),
        };
        self.gauge.advance(Milestone::Invoked);

        self.state = RunState::Normalizing;
        let inspection = draft_inspection(&reply, batch_id, fabric_type, &form.preview_url);

        self.tracker.complete();
        self.gauge.advance(Milestone::Finished);
        // Grace pause so the operator sees the finished animation before the
        // caller navigates away.
        self.tracker.settle().await;

        self.state = RunState::Succeeded;
        info!(inspection = %inspection.id, "inspection run succeeded");
        RunOutcome::Succeeded(inspection)
    }

    fn fail(&mut self, err: PipelineError) -> RunOutcome {
        warn!(%err, "inspection run failed");
        self.tracker.reset();
        self.gauge.reset();
        self.state = RunState::Failed;
        RunOutcome::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use textilevision_agent::{
        AgentError, AgentInvocation, AgentPayload, AgentReply, ArtifactFile, AssetId, ModuleOutputs,
        UploadReceipt,
    };
    use textilevision_core::{InspectionStatus, Verdict};

    use crate::progress::StageSnapshot;

    /// Scripted collaborator: fixed results, call counting.
    struct ScriptedClient {
        upload_result: Result<UploadReceipt, AgentError>,
        invoke_result: Result<AgentReply, AgentError>,
        uploads: AtomicUsize,
        invokes: AtomicUsize,
        last_agent: Mutex<Option<AgentId>>,
    }

    impl ScriptedClient {
        fn new(
            upload_result: Result<UploadReceipt, AgentError>,
            invoke_result: Result<AgentReply, AgentError>,
        ) -> Self {
            textilevision_observability::init_for_tests();
            Self {
                upload_result,
                invoke_result,
                uploads: AtomicUsize::new(0),
                invokes: AtomicUsize::new(0),
                last_agent: Mutex::new(None),
            }
        }

        fn happy() -> Self {
            let receipt = UploadReceipt {
                success: true,
                asset_ids: vec![AssetId::new("asset-1")],
            };
            let reply = AgentReply {
                success: true,
                error: None,
                response: Some(AgentPayload {
                    result: r#"{"inspection_summary": {"quality_score": "72", "verdict": "Pass"},
                                "defects": [{"id": 1, "type": "Hole", "severity": "critical"}]}"#
                        .to_string(),
                }),
                module_outputs: Some(ModuleOutputs {
                    artifact_files: vec![ArtifactFile {
                        file_url: "https://files.example/annotated.png".to_string(),
                    }],
                }),
            };
            Self::new(Ok(receipt), Ok(reply))
        }

        fn uploads(&self) -> usize {
            self.uploads.load(Ordering::SeqCst)
        }

        fn invokes(&self) -> usize {
            self.invokes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentClient for ScriptedClient {
        async fn upload(&self, _file: &ImageFile) -> Result<UploadReceipt, AgentError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            self.upload_result.clone()
        }

        async fn invoke(&self, invocation: &AgentInvocation) -> Result<AgentReply, AgentError> {
            self.invokes.fetch_add(1, Ordering::SeqCst);
            *self.last_agent.lock().unwrap() = Some(invocation.agent.clone());
            self.invoke_result.clone()
        }
    }

    fn form() -> InspectionForm {
        InspectionForm {
            file: Some(ImageFile::new("sample.jpg", "image/jpeg", 2_000_000)),
            batch_id: "BT-2024-1001".to_string(),
            fabric_type: Some(FabricType::Denim),
            preview_url: "preview://sample".to_string(),
        }
    }

    async fn let_time_pass(duration: Duration) {
        tokio::time::advance(duration).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_form_is_a_no_op() {
        let client = ScriptedClient::happy();
        let mut pipeline = InspectionPipeline::new(&client, &AgentEndpoints::default());

        let mut blank_batch = form();
        blank_batch.batch_id = "   ".to_string();

        assert_eq!(pipeline.run(&blank_batch).await, RunOutcome::Skipped);
        assert_eq!(pipeline.state(), RunState::Idle);
        assert_eq!(pipeline.gauge().percent(), 0);
        assert_eq!(pipeline.tracker().snapshot(), StageSnapshot::default());
        assert_eq!(client.uploads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn non_image_file_is_rejected_before_any_upload_call() {
        let client = ScriptedClient::happy();
        let mut pipeline = InspectionPipeline::new(&client, &AgentEndpoints::default());

        let mut bad = form();
        bad.file = Some(ImageFile::new("notes.txt", "text/plain", 1_000));

        let outcome = pipeline.run(&bad).await;
        assert_eq!(
            outcome,
            RunOutcome::Failed(PipelineError::validation(
                "Please upload an image file (JPG or PNG)"
            ))
        );
        assert_eq!(client.uploads(), 0);
        assert_eq!(pipeline.state(), RunState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_file_fails_with_size_message_and_9mb_passes() {
        let client = ScriptedClient::happy();
        let mut pipeline = InspectionPipeline::new(&client, &AgentEndpoints::default());

        let mut big = form();
        big.file = Some(ImageFile::new("big.png", "image/png", 11_000_000));
        assert_eq!(
            pipeline.run(&big).await,
            RunOutcome::Failed(PipelineError::validation("File size must be under 10MB"))
        );
        assert_eq!(client.uploads(), 0);

        let mut fine = form();
        fine.file = Some(ImageFile::new("fine.png", "image/png", 9_000_000));
        assert!(matches!(pipeline.run(&fine).await, RunOutcome::Succeeded(_)));
        assert_eq!(client.uploads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_asset_id_list_is_an_upload_failure_with_full_reset() {
        let client = ScriptedClient::new(
            Ok(UploadReceipt {
                success: true,
                asset_ids: vec![],
            }),
            Ok(AgentReply::default()),
        );
        let mut pipeline = InspectionPipeline::new(&client, &AgentEndpoints::default());

        let outcome = pipeline.run(&form()).await;
        assert_eq!(
            outcome,
            RunOutcome::Failed(PipelineError::upload("Upload failed. Please try again."))
        );
        assert_eq!(client.invokes(), 0);
        assert_eq!(pipeline.state(), RunState::Failed);
        assert_eq!(pipeline.gauge().percent(), 0);
        assert_eq!(pipeline.tracker().snapshot(), StageSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn analysis_transport_failure_cancels_every_deferred_timer() {
        let client = ScriptedClient::new(
            Ok(UploadReceipt {
                success: true,
                asset_ids: vec![AssetId::new("asset-1")],
            }),
            Err(AgentError::transport("connection reset")),
        );
        let mut pipeline = InspectionPipeline::new(&client, &AgentEndpoints::default());

        let outcome = pipeline.run(&form()).await;
        assert_eq!(
            outcome,
            RunOutcome::Failed(PipelineError::analysis(
                "An unexpected error occurred. Please try again."
            ))
        );

        // Real time later passes the 2s/4s/7s/10s marks; no stale stage
        // transition may fire after the failure instant.
        let_time_pass(Duration::from_secs(12)).await;
        assert_eq!(pipeline.tracker().snapshot(), StageSnapshot::default());
        assert_eq!(pipeline.gauge().percent(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn collaborator_reported_failure_surfaces_its_message() {
        let client = ScriptedClient::new(
            Ok(UploadReceipt {
                success: true,
                asset_ids: vec![AssetId::new("asset-1")],
            }),
            Ok(AgentReply {
                success: false,
                error: Some("Model overloaded".to_string()),
                response: None,
                module_outputs: None,
            }),
        );
        let mut pipeline = InspectionPipeline::new(&client, &AgentEndpoints::default());

        assert_eq!(
            pipeline.run(&form()).await,
            RunOutcome::Failed(PipelineError::analysis("Model overloaded"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_forces_completion_state_and_emits_the_report() {
        let client = ScriptedClient::happy();
        let mut pipeline = InspectionPipeline::new(&client, &AgentEndpoints::default());

        let RunOutcome::Succeeded(inspection) = pipeline.run(&form()).await else {
            panic!("expected a successful run");
        };

        assert_eq!(pipeline.state(), RunState::Succeeded);
        let snap = pipeline.tracker().snapshot();
        assert_eq!(snap.current, Some(crate::progress::PipelineStage::Report));
        assert!(snap.complete);
        assert_eq!(pipeline.gauge().percent(), 100);

        assert_eq!(inspection.status, InspectionStatus::Completed);
        assert_eq!(inspection.batch_id, "BT-2024-1001");
        assert_eq!(inspection.quality_score, 72);
        assert_eq!(inspection.verdict, Verdict::Pass);
        assert_eq!(inspection.total_defects, 1);
        assert_eq!(inspection.image_url, "preview://sample");
        assert_eq!(
            inspection.annotated_image_url.as_deref(),
            Some("https://files.example/annotated.png")
        );
        assert_eq!(client.uploads(), 1);
        assert_eq!(client.invokes(), 1);
        assert_eq!(
            client.last_agent.lock().unwrap().as_ref(),
            Some(&AgentEndpoints::default().analysis)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_run_may_start_after_a_terminal_state() {
        let client = ScriptedClient::happy();
        let mut pipeline = InspectionPipeline::new(&client, &AgentEndpoints::default());

        let mut bad = form();
        bad.file = Some(ImageFile::new("notes.txt", "text/plain", 1_000));
        assert!(matches!(pipeline.run(&bad).await, RunOutcome::Failed(_)));
        assert_eq!(pipeline.state(), RunState::Failed);

        assert!(matches!(pipeline.run(&form()).await, RunOutcome::Succeeded(_)));
        assert_eq!(pipeline.state(), RunState::Succeeded);
    }
}
