// Record shapes: raw CSV rows, cleaned records, derived records and report rows.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Columns every raw table must carry, in export order.
pub const REQUIRED_COLUMNS: [&str; 15] = [
    "consultant",
    "client",
    "project_id",
    "project_type",
    "required_seniority",
    "consultant_level",
    "complexity",
    "start_date",
    "planned_duration_days",
    "planned_end_date",
    "actual_end_date",
    "planned_hours",
    "actual_hours",
    "sell_rate",
    "cost_rate",
];

#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub consultant: Option<String>,
    pub client: Option<String>,
    pub project_id: Option<String>,
    pub project_type: Option<String>,
    pub required_seniority: Option<String>,
    pub consultant_level: Option<String>,
    pub complexity: Option<String>,
    pub start_date: Option<String>,
    pub planned_duration_days: Option<String>,
    pub planned_end_date: Option<String>,
    pub actual_end_date: Option<String>,
    pub planned_hours: Option<String>,
    pub actual_hours: Option<String>,
    pub sell_rate: Option<String>,
    pub cost_rate: Option<String>,
}

/// Ordinal seniority scale shared by consultants and project requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl Seniority {
    pub const ALL: [Seniority; 4] = [
        Seniority::Junior,
        Seniority::Mid,
        Seniority::Senior,
        Seniority::Lead,
    ];

    pub fn rank(self) -> i32 {
        match self {
            Seniority::Junior => 1,
            Seniority::Mid => 2,
            Seniority::Senior => 3,
            Seniority::Lead => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Seniority::Junior => "JUNIOR",
            Seniority::Mid => "MID",
            Seniority::Senior => "SENIOR",
            Seniority::Lead => "LEAD",
        }
    }

    /// Case-insensitive label lookup. Unknown labels map to `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "JUNIOR" | "JR" => Some(Seniority::Junior),
            "MID" | "MID-LEVEL" | "MIDLEVEL" => Some(Seniority::Mid),
            "SENIOR" | "SR" => Some(Seniority::Senior),
            "LEAD" | "PRINCIPAL" | "SPECIALIST" => Some(Seniority::Lead),
            _ => None,
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
    Critical,
}

impl Complexity {
    pub const ALL: [Complexity; 4] = [
        Complexity::Low,
        Complexity::Medium,
        Complexity::High,
        Complexity::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
            Complexity::Critical => "Critical",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Complexity::Low),
            "medium" => Some(Complexity::Medium),
            "high" => Some(Complexity::High),
            "critical" => Some(Complexity::Critical),
            _ => None,
        }
    }

    /// Rate multiplier applied by the synthetic generator.
    pub fn rate_multiplier(self) -> f64 {
        match self {
            Complexity::Low => 0.9,
            Complexity::Medium => 1.0,
            Complexity::High => 1.2,
            Complexity::Critical => 1.45,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One consultant-project-period unit of work, as loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub consultant: String,
    pub consultant_level: String,
    pub client: String,
    pub project_id: String,
    pub project_type: String,
    pub required_seniority: String,
    pub complexity: String,
    pub start_date: NaiveDate,
    pub planned_duration_days: i64,
    pub planned_end_date: NaiveDate,
    pub actual_end_date: NaiveDate,
    pub planned_hours: f64,
    pub actual_hours: f64,
    pub sell_rate: f64,
    pub cost_rate: f64,
}

/// A `Record` with every derived financial and operational field appended.
///
/// `performance_score` is relative to the population the record was derived
/// with; deriving the same record inside a different population changes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRecord {
    pub consultant: String,
    pub consultant_level: String,
    pub client: String,
    pub project_id: String,
    pub project_type: String,
    pub required_seniority: String,
    pub complexity: String,
    pub start_date: NaiveDate,
    pub planned_duration_days: i64,
    pub planned_end_date: NaiveDate,
    pub actual_end_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub planned_hours: f64,
    pub actual_hours: f64,
    pub sell_rate: f64,
    pub cost_rate: f64,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub margin: f64,
    pub efficiency: f64,
    pub delay_days: f64,
    pub mismatch: i32,
    pub roi_per_hour: f64,
    pub risk_score: f64,
    pub performance_score: f64,
}

impl DerivedRecord {
    pub fn required_level(&self) -> Option<Seniority> {
        Seniority::parse(&self.required_seniority)
    }

    pub fn complexity_tier(&self) -> Option<Complexity> {
        Complexity::parse(&self.complexity)
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GroupSummaryRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
    #[serde(rename = "Hours")]
    #[tabled(rename = "Hours")]
    pub hours: String,
    #[serde(rename = "Total Revenue")]
    #[tabled(rename = "Total Revenue")]
    pub total_revenue: String,
    #[serde(rename = "Total Cost")]
    #[tabled(rename = "Total Cost")]
    pub total_cost: String,
    #[serde(rename = "Total Profit")]
    #[tabled(rename = "Total Profit")]
    pub total_profit: String,
    #[serde(rename = "Avg Margin")]
    #[tabled(rename = "Avg Margin")]
    pub avg_margin: String,
    #[serde(rename = "Avg Efficiency")]
    #[tabled(rename = "Avg Efficiency")]
    pub avg_efficiency: String,
    #[serde(rename = "Avg Delay")]
    #[tabled(rename = "Avg Delay")]
    pub avg_delay: String,
    #[serde(rename = "Avg Risk")]
    #[tabled(rename = "Avg Risk")]
    pub avg_risk: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Baseline")]
    #[tabled(rename = "Baseline")]
    pub baseline: String,
    #[serde(rename = "Scenario")]
    #[tabled(rename = "Scenario")]
    pub scenario: String,
    #[serde(rename = "Delta")]
    #[tabled(rename = "Delta")]
    pub delta: String,
}
