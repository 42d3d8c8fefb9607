//! Advisory chat transcript model.
//!
//! Messages are appended to a per-report transcript. A loading placeholder is
//! inserted optimistically while the advisory call is in flight and replaced
//! by exactly one terminal entry (answer or error) when it resolves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fabric::Priority;
use crate::id::MessageId;

/// Who produced a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Agent,
}

/// A structured corrective action carried in an advisory reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectiveAction {
    pub action: String,
    pub priority: Priority,
    pub expected_impact: String,
}

/// One entry of an advisory transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corrective_actions: Vec<CorrectiveAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preventive_measures: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub industry_references: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub is_loading: bool,
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub is_error: bool,
}

impl ChatMessage {
    fn bare(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            key_points: Vec::new(),
            corrective_actions: Vec::new(),
            preventive_measures: Vec::new(),
            industry_references: Vec::new(),
            timestamp: Utc::now(),
            is_loading: false,
            is_error: false,
        }
    }

    /// An operator question.
    pub fn user(content: impl Into<String>) -> Self {
        Self::bare(ChatRole::User, content)
    }

    /// The optimistic placeholder shown while an advisory call is in flight.
    pub fn loading_placeholder() -> Self {
        let mut msg = Self::bare(ChatRole::Agent, "");
        msg.is_loading = true;
        msg
    }

    /// A terminal agent error entry.
    pub fn agent_error(content: impl Into<String>) -> Self {
        let mut msg = Self::bare(ChatRole::Agent, content);
        msg.is_error = true;
        msg
    }

    /// A normal agent answer, with the optional structured sections.
    pub fn agent_answer(
        content: impl Into<String>,
        key_points: Vec<String>,
        corrective_actions: Vec<CorrectiveAction>,
        preventive_measures: Vec<String>,
        industry_references: Vec<String>,
    ) -> Self {
        let mut msg = Self::bare(ChatRole::Agent, content);
        msg.key_points = key_points;
        msg.corrective_actions = corrective_actions;
        msg.preventive_measures = preventive_measures;
        msg.industry_references = industry_references;
        msg
    }
}
