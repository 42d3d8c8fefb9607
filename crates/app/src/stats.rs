//! Read models over the inspection log: dashboard statistics and history
//! filtering.

use serde::Serialize;

use textilevision_core::{FabricType, Inspection, InspectionLog, InspectionStatus, Verdict};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardStats {
    pub total_inspections: usize,
    /// Share of completed inspections with a passing verdict, rounded down.
    /// Zero when nothing has completed.
    pub pass_rate_percent: u8,
    pub total_defects: u64,
    pub pending: usize,
}

impl DashboardStats {
    pub fn compute(log: &InspectionLog) -> Self {
        let completed: Vec<&Inspection> = log
            .iter()
            .filter(|i| i.status == InspectionStatus::Completed)
            .collect();
        let passed = completed
            .iter()
            .filter(|i| i.verdict == Verdict::Pass)
            .count();
        let pass_rate_percent = if completed.is_empty() {
            0
        } else {
            (passed * 100 / completed.len()) as u8
        };

        Self {
            total_inspections: log.len(),
            pass_rate_percent,
            total_defects: log.iter().map(|i| u64::from(i.total_defects)).sum(),
            pending: log
                .iter()
                .filter(|i| i.status == InspectionStatus::Pending)
                .count(),
        }
    }
}

/// History view: newest-first, filtered by a case-insensitive batch-id
/// substring and an optional fabric type.
pub fn filter_history<'a>(
    log: &'a InspectionLog,
    query: &str,
    fabric: Option<FabricType>,
) -> Vec<&'a Inspection> {
    let query = query.trim().to_lowercase();
    log.iter()
        .filter(|i| query.is_empty() || i.batch_id.to_lowercase().contains(&query))
        .filter(|i| fabric.is_none_or(|f| i.fabric_type == f))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use textilevision_core::InspectionId;

    fn inspection(batch: &str, fabric: FabricType, verdict: Verdict, defects: u32) -> Inspection {
        Inspection {
            id: InspectionId::new(),
            batch_id: batch.to_string(),
            fabric_type: fabric,
            date: Utc::now().date_naive(),
            image_url: String::new(),
            annotated_image_url: None,
            quality_score: 80,
            verdict,
            total_defects: defects,
            critical_count: 0,
            major_count: 0,
            minor_count: defects,
            fabric_condition: String::new(),
            defects: vec![],
            recommendations: vec![],
            status: InspectionStatus::Completed,
        }
    }

    fn log() -> InspectionLog {
        let mut log = InspectionLog::new();
        log.insert_head(inspection("BT-2024-0001", FabricType::Denim, Verdict::Pass, 0));
        log.insert_head(inspection("BT-2024-0002", FabricType::Silk, Verdict::Fail, 5));
        log.insert_head(inspection("bt-2025-0003", FabricType::Denim, Verdict::Pass, 1));
        log
    }

    #[test]
    fn empty_log_yields_zeroed_stats() {
        assert_eq!(
            DashboardStats::compute(&InspectionLog::new()),
            DashboardStats::default()
        );
    }

    #[test]
    fn stats_aggregate_over_the_whole_log() {
        let stats = DashboardStats::compute(&log());
        assert_eq!(stats.total_inspections, 3);
        assert_eq!(stats.pass_rate_percent, 66); // 2 of 3, rounded down
        assert_eq!(stats.total_defects, 6);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn conditional_pass_does_not_count_toward_the_pass_rate() {
        let mut log = InspectionLog::new();
        log.insert_head(inspection("BT-1", FabricType::Woven, Verdict::Pass, 0));
        log.insert_head(inspection(
            "BT-2",
            FabricType::Woven,
            Verdict::ConditionalPass,
            2,
        ));
        assert_eq!(DashboardStats::compute(&log).pass_rate_percent, 50);
    }

    #[test]
    fn history_filter_matches_batch_substring_case_insensitively() {
        let log = log();
        let hits = filter_history(&log, "2024", None);
        assert_eq!(hits.len(), 2);

        let hits = filter_history(&log, "BT-2025", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].batch_id, "bt-2025-0003");
    }

    #[test]
    fn history_filter_combines_query_and_fabric() {
        let log = log();
        let hits = filter_history(&log, "bt", Some(FabricType::Denim));
        assert_eq!(hits.len(), 2);

        let hits = filter_history(&log, "0002", Some(FabricType::Denim));
        assert!(hits.is_empty());
    }

    #[test]
    fn blank_query_returns_everything_newest_first() {
        let log = log();
        let hits = filter_history(&log, "   ", None);
        let batches: Vec<&str> = hits.iter().map(|i| i.batch_id.as_str()).collect();
        assert_eq!(batches, ["bt-2025-0003", "BT-2024-0002", "BT-2024-0001"]);
    }
}
