//! `textilevision-core` — domain foundation for the inspection system.
//!
//! This crate contains **pure domain** primitives: strongly-typed ids, the
//! report model produced by normalization, the chat transcript model, and the
//! in-memory inspection log. No agent transport, no async, no rendering.

pub mod chat;
pub mod error;
pub mod fabric;
pub mod id;
pub mod inspection;
pub mod store;

pub use chat::{ChatMessage, ChatRole, CorrectiveAction};
pub use error::{DomainError, DomainResult};
pub use fabric::{FabricType, InspectionStatus, Priority, Severity, Verdict};
pub use id::{InspectionId, MessageId};
pub use inspection::{Defect, Inspection, Recommendation};
pub use store::InspectionLog;
