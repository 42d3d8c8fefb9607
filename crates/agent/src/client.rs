//! Collaborator contracts for the remote vision/LLM agents.
//!
//! Both agents (defect detection, inspection advisory) share one call shape:
//! a natural-language instruction plus optional asset attachments, answered
//! with an in-band success flag and a raw textual result. `Err(_)` from the
//! trait models a transport failure ("thrown"); `success = false` models a
//! failure the collaborator reported itself. Both are terminal for the
//! operation — there is no retry policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a remote agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a stored file, returned by the upload collaborator and used to
/// attach the file to a later agent invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The two agent identities used by the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEndpoints {
    /// Image-analysis agent (attachment required).
    pub analysis: AgentId,
    /// Conversational advisory agent (no attachment).
    pub advisory: AgentId,
}

impl Default for AgentEndpoints {
    fn default() -> Self {
        Self {
            analysis: AgentId::new("699c70cd3aff77bf1a4ebe04"),
            advisory: AgentId::new("699c70cdf75ee4297f34ba9e"),
        }
    }
}

/// An image file selected by the operator.
///
/// Only metadata is carried here; the transport implementation owns the
/// bytes. Client-side constraints (MIME prefix, size cap) are enforced by the
/// pipeline before any upload call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    pub size_bytes: u64,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Result of the upload collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub asset_ids: Vec<AssetId>,
}

impl UploadReceipt {
    /// The first asset handle, present only when the collaborator reported
    /// success *and* returned at least one id.
    pub fn first_asset(&self) -> Option<&AssetId> {
        if self.success { self.asset_ids.first() } else { None }
    }
}

/// One invocation of a remote agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInvocation {
    pub agent: AgentId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AssetId>,
}

impl AgentInvocation {
    pub fn new(agent: AgentId, message: impl Into<String>) -> Self {
        Self {
            agent,
            message: message.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, asset: AssetId) -> Self {
        self.attachments.push(asset);
        self
    }
}

/// Raw textual payload wrapper inside an agent reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPayload {
    #[serde(default)]
    pub result: String,
}

/// An artifact file emitted by an agent module (e.g. an annotated overlay).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    #[serde(default)]
    pub file_url: String,
}

/// Auxiliary module outputs attached to an agent reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOutputs {
    #[serde(default)]
    pub artifact_files: Vec<ArtifactFile>,
}

/// Reply of the agent collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AgentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_outputs: Option<ModuleOutputs>,
}

impl AgentReply {
    /// The raw textual result, empty when absent.
    pub fn result_text(&self) -> &str {
        self.response.as_ref().map(|p| p.result.as_str()).unwrap_or("")
    }

    /// The collaborator's error message, or the given fallback.
    pub fn error_message(&self, fallback: &str) -> String {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// URL of the first artifact file, if the reply carries one.
    pub fn annotated_image_url(&self) -> Option<String> {
        self.module_outputs
            .as_ref()?
            .artifact_files
            .first()
            .map(|f| f.file_url.clone())
            .filter(|u| !u.is_empty())
    }
}

/// Transport-level failure of a collaborator call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The remote call itself failed (network, serialization, timeout).
    #[error("agent call failed: {0}")]
    Transport(String),
}

impl AgentError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Opaque remote collaborator: file upload plus agent invocation.
///
/// The concrete transport lives outside this system; tests use scripted
/// in-memory implementations.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// `upload(file) -> {success, asset_ids}`.
    async fn upload(&self, file: &ImageFile) -> Result<UploadReceipt, AgentError>;

    /// `invoke_agent(message, agent_id, attachments?)`.
    async fn invoke(&self, invocation: &AgentInvocation) -> Result<AgentReply, AgentError>;
}
