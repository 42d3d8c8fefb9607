//! Response normalizer: untrusted parsed JSON → strict report values.
//!
//! The input is whatever [`crate::payload::parse_text_payload`] recovered from
//! the model's text — possibly `Null`, possibly the wrong shape in any field.
//! Every extraction here is an independent try/default; normalization never
//! fails and never panics. Type-shape surprises must not cross this boundary.

use serde_json::Value;
use tracing::debug;

use textilevision_core::{
    CorrectiveAction, Defect, Priority, Recommendation, Severity, Verdict,
};

/// The normalized body of an analysis reply, before the pipeline attaches
/// run-specific fields (id, batch, image references, status).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportDraft {
    pub quality_score: u8,
    pub verdict: Verdict,
    pub total_defects: u32,
    pub critical_count: u32,
    pub major_count: u32,
    pub minor_count: u32,
    pub fabric_condition: String,
    pub defects: Vec<Defect>,
    pub recommendations: Vec<Recommendation>,
}

/// The normalized body of an advisory reply. Each section is independently
/// defaulted to empty when absent or malformed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdvisoryReply {
    pub answer: String,
    pub key_points: Vec<String>,
    pub corrective_actions: Vec<CorrectiveAction>,
    pub preventive_measures: Vec<String>,
    pub industry_references: Vec<String>,
}

/// Normalize an analysis payload into a [`ReportDraft`]. Total: any input
/// value yields a well-typed draft.
pub fn inspection_report(value: &Value) -> ReportDraft {
    let summary = value.get("inspection_summary");

    let defects: Vec<Defect> = seq(value.get("defects")).iter().map(defect).collect();
    let recommendations: Vec<Recommendation> = seq(value.get("recommendations"))
        .iter()
        .map(recommendation)
        .collect();

    // The agent's explicit total wins; absence (or a zero/unparsable value)
    // falls back to the parsed defect count. Per-severity counts are taken
    // as reported and may disagree with the list.
    let explicit_total = num_u32(field(summary, "total_defects"));
    let total_defects = if explicit_total == 0 {
        defects.len() as u32
    } else {
        explicit_total
    };

    if value.is_null() {
        debug!("analysis payload was empty; report defaults applied");
    }

    ReportDraft {
        quality_score: num_u32(field(summary, "quality_score")).min(100) as u8,
        verdict: Verdict::from_label(&text(field(summary, "verdict"), "Unknown")),
        total_defects,
        critical_count: num_u32(field(summary, "critical_count")),
        major_count: num_u32(field(summary, "major_count")),
        minor_count: num_u32(field(summary, "minor_count")),
        fabric_condition: text(field(summary, "fabric_condition"), ""),
        defects,
        recommendations,
    }
}

/// Normalize an advisory payload into an [`AdvisoryReply`]. Total.
pub fn advisory_reply(value: &Value) -> AdvisoryReply {
    // `answer` is only accepted as a plain string; anything else is treated
    // as absent rather than stringified.
    let answer = value
        .get("answer")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    AdvisoryReply {
        answer,
        key_points: string_seq(value.get("key_points")),
        corrective_actions: seq(value.get("corrective_actions"))
            .iter()
            .map(corrective_action)
            .collect(),
        preventive_measures: string_seq(value.get("preventive_measures")),
        industry_references: string_seq(value.get("industry_references")),
    }
}

fn defect(value: &Value) -> Defect {
    Defect {
        id: num_i64(value.get("id")),
        kind: text(value.get("type"), ""),
        severity: Severity::from_label(&text(value.get("severity"), "")),
        location: text(value.get("location"), ""),
        description: text(value.get("description"), ""),
        affected_area_percentage: num_f64(value.get("affected_area_percentage")).max(0.0),
    }
}

fn recommendation(value: &Value) -> Recommendation {
    Recommendation {
        defect_id: num_i64(value.get("defect_id")),
        action: text(value.get("action"), ""),
        priority: Priority::from_label(&text(value.get("priority"), "")),
        details: text(value.get("details"), ""),
    }
}

fn corrective_action(value: &Value) -> CorrectiveAction {
    CorrectiveAction {
        action: text(value.get("action"), ""),
        priority: Priority::from_label(&text(value.get("priority"), "")),
        expected_impact: text(value.get("expected_impact"), ""),
    }
}

fn field<'a>(object: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    object?.get(key)
}

/// Numeric coercion: numbers pass through, numeric strings parse, everything
/// else is 0.
fn num_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn num_u32(value: Option<&Value>) -> u32 {
    let n = num_f64(value);
    if n.is_finite() && n > 0.0 {
        n.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn num_i64(value: Option<&Value>) -> i64 {
    let n = num_f64(value);
    if n.is_finite() {
        n.clamp(i64::MIN as f64, i64::MAX as f64) as i64
    } else {
        0
    }
}

/// String coercion: strings pass through, numbers and bools render, the rest
/// takes the domain default.
fn text(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

const EMPTY: &[Value] = &[];

/// Sequence coercion: non-arrays become the empty slice, never an error.
fn seq(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(EMPTY)
}

fn string_seq(value: Option<&Value>) -> Vec<String> {
    seq(value)
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}
