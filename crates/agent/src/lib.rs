//! `textilevision-agent` — remote-agent subsystem boundary.
//!
//! This crate owns the collaborator contracts (`upload`, `invoke`) and the
//! safety layer immediately downstream of them: a lenient textual-payload
//! parse and the response normalizer that turns an arbitrary parsed value
//! into a strict report. Nothing in here performs transport; callers supply
//! an [`AgentClient`] implementation.

pub mod client;
pub mod normalize;
pub mod payload;

pub use client::{
    AgentClient, AgentEndpoints, AgentError, AgentId, AgentInvocation, AgentPayload, AgentReply,
    ArtifactFile, AssetId, ImageFile, ModuleOutputs, UploadReceipt,
};
pub use normalize::{AdvisoryReply, ReportDraft};
pub use payload::parse_text_payload;
