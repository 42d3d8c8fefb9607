//! Classification enums for fabric inspections.
//!
//! Agent-produced labels (`Severity`, `Priority`, `Verdict`) parse leniently:
//! any unrecognized label collapses into the `Unknown` variant instead of
//! failing, because the upstream payload is free-form model output. The
//! operator-chosen `FabricType` is a closed set and parses strictly.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Fabric type chosen by the operator when starting an inspection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FabricType {
    Woven,
    Knitted,
    #[serde(rename = "Non-Woven")]
    NonWoven,
    Denim,
    Silk,
}

impl FabricType {
    pub const ALL: [FabricType; 5] = [
        FabricType::Woven,
        FabricType::Knitted,
        FabricType::NonWoven,
        FabricType::Denim,
        FabricType::Silk,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FabricType::Woven => "Woven",
            FabricType::Knitted => "Knitted",
            FabricType::NonWoven => "Non-Woven",
            FabricType::Denim => "Denim",
            FabricType::Silk => "Silk",
        }
    }
}

impl core::fmt::Display for FabricType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for FabricType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FabricType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::unknown_label(format!("fabric type: {s}")))
    }
}

/// Defect criticality tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    #[default]
    Unknown,
}

impl Severity {
    /// Lenient parse of an agent-produced label. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "major" => Severity::Major,
            "minor" => Severity::Minor,
            _ => Severity::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Priority of a recommended corrective action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl Priority {
    /// Lenient parse of an agent-produced label. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unknown => "Unknown",
        }
    }
}

impl core::fmt::Display for Priority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Overall pass/fail classification of an inspection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Verdict {
    Pass,
    #[serde(rename = "Conditional Pass")]
    ConditionalPass,
    Fail,
    #[default]
    Unknown,
}

impl Verdict {
    /// Lenient parse of an agent-produced label. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "pass" => Verdict::Pass,
            "conditional pass" => Verdict::ConditionalPass,
            "fail" => Verdict::Fail,
            _ => Verdict::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pass => "Pass",
            Verdict::ConditionalPass => "Conditional Pass",
            Verdict::Fail => "Fail",
            Verdict::Unknown => "Unknown",
        }
    }
}

impl core::fmt::Display for Verdict {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of an inspection record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionStatus {
    Completed,
    Pending,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fabric_type_parses_its_own_labels() {
        for t in FabricType::ALL {
            assert_eq!(t.label().parse::<FabricType>().unwrap(), t);
        }
        assert_eq!("non-woven".parse::<FabricType>().unwrap(), FabricType::NonWoven);
        assert!("Leather".parse::<FabricType>().is_err());
    }

    #[test]
    fn severity_labels_collapse_to_unknown() {
        assert_eq!(Severity::from_label("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::from_label(" minor "), Severity::Minor);
        assert_eq!(Severity::from_label("catastrophic"), Severity::Unknown);
        assert_eq!(Severity::from_label(""), Severity::Unknown);
    }

    #[test]
    fn verdict_parses_conditional_pass_case_insensitively() {
        assert_eq!(Verdict::from_label("Conditional Pass"), Verdict::ConditionalPass);
        assert_eq!(Verdict::from_label("conditional pass"), Verdict::ConditionalPass);
        assert_eq!(Verdict::from_label("maybe"), Verdict::Unknown);
    }

    #[test]
    fn verdict_serializes_with_display_labels() {
        let json = serde_json::to_string(&Verdict::ConditionalPass).unwrap();
        assert_eq!(json, "\"Conditional Pass\"");
    }

    #[test]
    fn priority_parse_is_lenient() {
        assert_eq!(Priority::from_label("HIGH"), Priority::High);
        assert_eq!(Priority::from_label("whenever"), Priority::Unknown);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: label parsing never panics and own labels roundtrip.
            #[test]
            fn lenient_parses_are_total(label in "\\PC{0,32}") {
                let _ = Severity::from_label(&label);
                let _ = Priority::from_label(&label);
                let _ = Verdict::from_label(&label);
            }

            #[test]
            fn verdict_labels_roundtrip(v in prop_oneof![
                Just(Verdict::Pass),
                Just(Verdict::ConditionalPass),
                Just(Verdict::Fail),
                Just(Verdict::Unknown),
            ]) {
                prop_assert_eq!(Verdict::from_label(v.label()), v);
            }
        }
    }
}
