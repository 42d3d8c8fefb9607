//! Advisory chat session over one inspection report.
//!
//! Protocol per question: append the user's message and a loading placeholder
//! atomically, call the advisory agent with the report context prepended,
//! then replace the placeholder with exactly one terminal entry (answer or
//! error). At most one question is in flight per session; submissions while
//! one is pending are ignored, as are blank questions.

use thiserror::Error;
use tracing::{info, warn};

use textilevision_agent::{
    AgentClient, AgentEndpoints, AgentId, AgentInvocation, normalize, parse_text_payload,
};
use textilevision_core::{ChatMessage, Inspection};

/// Fallback when the advisory collaborator reports failure without a message.
pub const QUESTION_FAILURE_MESSAGE: &str = "Unable to process your question. Please try again.";

const UNEXPECTED_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// Terminal failure of one advisory question. Always also recorded in the
/// transcript as an error entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdvisoryError {
    /// The collaborator reported failure; carries its message (or the
    /// question fallback).
    #[error("{0}")]
    Agent(String),

    /// The collaborator call itself failed.
    #[error("{UNEXPECTED_FAILURE_MESSAGE}")]
    Unexpected,
}

/// Result of [`AdvisorySession::ask`].
#[derive(Debug, Clone, PartialEq)]
pub enum AskOutcome {
    /// Blank question or a question already in flight; transcript untouched.
    Ignored,
    Answered,
    Failed(AdvisoryError),
}

/// One report-scoped chat session.
pub struct AdvisorySession<'a> {
    client: &'a dyn AgentClient,
    agent: AgentId,
    inspection: &'a Inspection,
    messages: Vec<ChatMessage>,
    awaiting: bool,
}

impl<'a> AdvisorySession<'a> {
    pub fn new(
        client: &'a dyn AgentClient,
        endpoints: &AgentEndpoints,
        inspection: &'a Inspection,
    ) -> Self {
        Self {
            client,
            agent: endpoints.advisory.clone(),
            inspection,
            messages: Vec::new(),
            awaiting: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting
    }

    /// Grounding preamble sent with every question so the stateless agent
    /// answers about this specific report.
    pub fn question_context(&self, question: &str) -> String {
        let report = self.inspection;
        let defects = serde_json::to_string(&report.defects).unwrap_or_default();
        let recommendations =
            serde_json::to_string(&report.recommendations).unwrap_or_default();
        format!(
            "Context: Inspection for Batch {batch}, Fabric Type: {fabric}, \
             Quality Score: {score}/100, Verdict: {verdict}, \
             Total Defects: {total} (Critical: {critical}, Major: {major}, Minor: {minor}), \
             Fabric Condition: {condition}. Defects found: {defects}. \
             Recommendations: {recommendations}. \n\nUser question: {question}",
            batch = report.batch_id,
            fabric = report.fabric_type,
            score = report.quality_score,
            verdict = report.verdict,
            total = report.total_defects,
            critical = report.critical_count,
            major = report.major_count,
            minor = report.minor_count,
            condition = report.fabric_condition,
        )
    }

    /// Admit a question: record the user message and the loading placeholder,
    /// mark the session in flight, and hand back the contextualized message
    /// to send. `None` means the question was ignored (blank, or another
    /// question is pending) and the transcript is untouched.
    pub fn begin(&mut self, question: &str) -> Option<String> {
        let question = question.trim();
        if question.is_empty() || self.awaiting {
            return None;
        }
        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::loading_placeholder());
        self.awaiting = true;
        Some(self.question_context(question))
    }

    /// Resolve the in-flight question: drop the placeholder and append the
    /// terminal entry.
    fn conclude(&mut self, entry: ChatMessage) {
        self.messages.retain(|m| !m.is_loading);
        self.messages.push(entry);
        self.awaiting = false;
    }

    /// Ask one question end to end.
    pub async fn ask(&mut self, question: &str) -> AskOutcome {
        let Some(context) = self.begin(question) else {
            return AskOutcome::Ignored;
        };

        // No attachment: the context preamble carries the report.
        let invocation = AgentInvocation::new(self.agent.clone(), context);
        let reply = match self.client.invoke(&invocation).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(%err, agent = %self.agent, "advisory collaborator call failed");
                self.conclude(ChatMessage::agent_error(UNEXPECTED_FAILURE_MESSAGE));
                return AskOutcome::Failed(AdvisoryError::Unexpected);
            }
        };

        if !reply.success {
            let message = reply.error_message(QUESTION_FAILURE_MESSAGE);
            self.conclude(ChatMessage::agent_error(&message));
            return AskOutcome::Failed(AdvisoryError::Agent(message));
        }

        let parsed = parse_text_payload(reply.result_text());
        let answer = normalize::advisory_reply(&parsed);
        info!(
            inspection = %self.inspection.id,
            key_points = answer.key_points.len(),
            corrective_actions = answer.corrective_actions.len(),
            "advisory question answered"
        );
        self.conclude(ChatMessage::agent_answer(
            answer.answer,
            answer.key_points,
            answer.corrective_actions,
            answer.preventive_measures,
            answer.industry_references,
        ));
        AskOutcome::Answered
    }
}
