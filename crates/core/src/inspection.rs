//! The inspection report model.
//!
//! An `Inspection` is created once, by the pipeline's success path, and never
//! mutated afterwards. The reported totals (`total_defects`, per-severity
//! counts) come from the agent independently of the defect list and are
//! allowed to disagree with it; `counts_are_consistent` reports the invariant
//! without repairing it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fabric::{FabricType, InspectionStatus, Priority, Severity, Verdict};
use crate::id::InspectionId;

/// A single defect found on the sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    /// Unique within one inspection.
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub location: String,
    pub description: String,
    pub affected_area_percentage: f64,
}

/// A recommended corrective action for a defect.
///
/// `defect_id` references a `Defect::id` but is not referentially enforced at
/// parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub defect_id: i64,
    pub action: String,
    pub priority: Priority,
    pub details: String,
}

/// Aggregate root: a completed fabric inspection report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inspection {
    pub id: InspectionId,
    /// Operator-supplied batch identifier, non-empty.
    pub batch_id: String,
    pub fabric_type: FabricType,
    pub date: NaiveDate,
    /// Local reference to the uploaded image.
    pub image_url: String,
    /// Agent-produced overlay image, when the agent returned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_image_url: Option<String>,
    /// 0-100.
    pub quality_score: u8,
    pub verdict: Verdict,
    pub total_defects: u32,
    pub critical_count: u32,
    pub major_count: u32,
    pub minor_count: u32,
    pub fabric_condition: String,
    pub defects: Vec<Defect>,
    pub recommendations: Vec<Recommendation>,
    pub status: InspectionStatus,
}

impl Inspection {
    /// The image to show for this report: the annotated overlay when the
    /// agent produced one, otherwise the originally uploaded image.
    pub fn display_image(&self) -> &str {
        self.annotated_image_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.image_url)
    }

    /// Whether the reported totals agree with each other and with the defect
    /// list. Disagreement is tolerated, not repaired; callers may surface it.
    pub fn counts_are_consistent(&self) -> bool {
        let summed = self.critical_count + self.major_count + self.minor_count;
        self.total_defects == summed && self.total_defects as usize == self.defects.len()
    }

    /// Count of defects in the list with the given severity (derived from the
    /// list, not the reported counters).
    pub fn listed_count(&self, severity: Severity) -> usize {
        self.defects.iter().filter(|d| d.severity == severity).count()
    }
}
