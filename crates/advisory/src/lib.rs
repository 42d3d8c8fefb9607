//! Post-inspection advisory chat.
//!
//! An [`AdvisorySession`] is bound to one finished inspection report and
//! holds its transcript. Each question is grounded in the report by a context
//! preamble, sent to the conversational agent, and answered in place of an
//! optimistic loading placeholder.

mod session;

pub use session::{AdvisoryError, AdvisorySession, AskOutcome, QUESTION_FAILURE_MESSAGE};
