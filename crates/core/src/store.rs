//! In-memory inspection log.
//!
//! Session-scoped, most-recent-first. Appended to only by the pipeline's
//! success path; read by the dashboard and history views. No persistence.

use crate::id::InspectionId;
use crate::inspection::Inspection;

/// Ordered collection of completed inspections, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionLog {
    items: Vec<Inspection>,
}

impl InspectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly completed inspection at the head of the log.
    pub fn insert_head(&mut self, inspection: Inspection) {
        self.items.insert(0, inspection);
    }

    pub fn get(&self, id: InspectionId) -> Option<&Inspection> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Newest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &Inspection> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The most recent `n` inspections.
    pub fn recent(&self, n: usize) -> &[Inspection] {
        &self.items[..self.items.len().min(n)]
    }
}
