// Core types for the insight engine

use serde::Serialize;
use std::fmt;

/// Rule categories, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    StaffingMismatch,
    ProfitLeak,
    ServiceMix,
    OverloadRisk,
    ClientConcentration,
    EffortOverrun,
    /// Synthetic finding when nothing else fired
    AllClear,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::StaffingMismatch => "staffing_mismatch",
            InsightCategory::ProfitLeak => "profit_leak",
            InsightCategory::ServiceMix => "service_mix",
            InsightCategory::OverloadRisk => "overload_risk",
            InsightCategory::ClientConcentration => "client_concentration",
            InsightCategory::EffortOverrun => "effort_overrun",
            InsightCategory::AllClear => "all_clear",
        }
    }

    /// Short label shown next to the finding title.
    pub fn icon(&self) -> &'static str {
        match self {
            InsightCategory::StaffingMismatch => "[STAFF]",
            InsightCategory::ProfitLeak => "[LEAK]",
            InsightCategory::ServiceMix => "[MIX]",
            InsightCategory::OverloadRisk => "[LOAD]",
            InsightCategory::ClientConcentration => "[CLIENT]",
            InsightCategory::EffortOverrun => "[EFFORT]",
            InsightCategory::AllClear => "[OK]",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The computed quantities behind a finding, free of any wording.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    StaffingMismatch {
        offenders: usize,
        consultant: String,
        consultant_level: String,
        required_seniority: String,
        complexity: String,
        client: String,
        project_id: String,
        mismatch: i32,
        risk_score: f64,
        delay_days: f64,
    },
    ProfitLeak {
        records: usize,
        at_risk_revenue: f64,
        mean_margin: f64,
        mean_delay: f64,
    },
    ServiceMix {
        best_type: String,
        best_roi: f64,
        worst_type: String,
        worst_roi: f64,
        ratio: f64,
    },
    OverloadRisk {
        consultant: String,
        hours: f64,
        threshold: f64,
        overloaded: usize,
        month: u32,
        year: Option<i32>,
    },
    ClientConcentration {
        client: String,
        revenue: f64,
        share_pct: f64,
        clients: usize,
    },
    EffortOverrun {
        project_type: String,
        planned_hours: f64,
        actual_hours: f64,
        overrun_pct: f64,
    },
    AllClear {
        records: usize,
    },
}

/// What a rule emits: a category, a severity and the numbers behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub category: InsightCategory,
    pub severity: Severity,
    pub signal: Signal,
}

impl Detection {
    pub fn new(category: InsightCategory, severity: Severity, signal: Signal) -> Self {
        Self {
            category,
            severity,
            signal,
        }
    }
}

/// A rendered finding ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub category: InsightCategory,
    pub severity: Severity,
    pub icon: &'static str,
    pub title: String,
    pub narrative: String,
    pub actions: Vec<String>,
    pub signal: Signal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_priority_orders_tiers() {
        assert!(Severity::Critical.priority() > Severity::High.priority());
        assert!(Severity::High.priority() > Severity::Medium.priority());
        assert!(Severity::Medium.priority() > Severity::Low.priority());
    }

    #[test]
    fn signal_serializes_with_kind_tag() {
        let json = serde_json::to_value(Signal::AllClear { records: 3 }).unwrap();
        assert_eq!(json["kind"], "all_clear");
        assert_eq!(json["records"], 3);
    }
}
