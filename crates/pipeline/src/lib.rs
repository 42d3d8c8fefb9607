//! `textilevision-pipeline` — the inspection pipeline state machine.
//!
//! A run sequences the asset upload step and the analysis invocation step
//! against the remote agent, drives the decoupled stage tracker and progress
//! gauge for operator feedback, and ends in exactly one terminal state with
//! either a finished [`textilevision_core::Inspection`] or a single
//! human-readable failure.

pub mod analyze;
pub mod error;
pub mod progress;
pub mod run;
pub mod upload;

pub use analyze::{AnalysisInvocationStep, analysis_instruction, draft_inspection};
pub use error::PipelineError;
pub use progress::{Milestone, PipelineStage, ProgressGauge, StageSchedule, StageSnapshot, StageTracker};
pub use run::{InspectionForm, InspectionPipeline, RunOutcome, RunState};
pub use upload::{AssetUploadStep, MAX_IMAGE_BYTES};
