//! Pipeline error taxonomy.
//!
//! All three variants are terminal for the run; nothing is retried. The
//! message inside each variant is the user-facing text the orchestrator
//! surfaces verbatim.

use thiserror::Error;

/// Generic message for a collaborator call that failed outright.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Message for an upload the collaborator reported as failed (or that
/// returned no asset handle).
pub const UPLOAD_FAILURE_MESSAGE: &str = "Upload failed. Please try again.";

/// Fallback when the analysis collaborator reports failure without a message.
pub const ANALYSIS_FAILURE_MESSAGE: &str = "Analysis could not complete. Please try again.";

/// Terminal failure of an inspection run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Bad file type/size; surfaced before any collaborator call.
    #[error("{0}")]
    Validation(String),

    /// Upload collaborator failed or returned no asset handle.
    #[error("{0}")]
    Upload(String),

    /// Analysis collaborator reported failure, or the call itself failed.
    #[error("{0}")]
    Analysis(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }
}
