// Small in-memory records shared by unit tests.

use crate::types::Record;
use chrono::NaiveDate;

/// On-time, correctly staffed record ending on 2024-03-31.
pub fn record(
    consultant: &str,
    client: &str,
    project_type: &str,
    hours: f64,
    sell_rate: f64,
    cost_rate: f64,
) -> Record {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    Record {
        consultant: consultant.to_string(),
        consultant_level: "MID".to_string(),
        client: client.to_string(),
        project_id: format!("{}-{}", client, project_type),
        project_type: project_type.to_string(),
        required_seniority: "MID".to_string(),
        complexity: "Medium".to_string(),
        start_date: start,
        planned_duration_days: 30,
        planned_end_date: end,
        actual_end_date: end,
        planned_hours: hours,
        actual_hours: hours,
        sell_rate,
        cost_rate,
    }
}

pub fn with_delay(mut r: Record, days: i64) -> Record {
    r.actual_end_date = r.planned_end_date + chrono::Duration::days(days);
    r
}

pub fn with_levels(mut r: Record, consultant_level: &str, required: &str) -> Record {
    r.consultant_level = consultant_level.to_string();
    r.required_seniority = required.to_string();
    r
}
