// Per-record derived financial and operational metrics.
//
// Derivation runs in two passes. The first pass computes population
// statistics over the whole input, the second computes each record's fields
// against them. `performance_score` normalizes ROI per hour by the
// population's mean rate spread, so the same record scores differently when
// derived inside a different population. Callers that re-derive a filtered
// subset therefore change the scores of every record in it.

use crate::types::{DerivedRecord, Record, Seniority};
use crate::util::{clip, days_diff, ratio_or};
use chrono::Datelike;

/// Delay (days) at which the delay half of the risk score saturates.
pub const RISK_DELAY_CAP_DAYS: f64 = 60.0;
/// Understaffing depth (levels) at which the staffing half saturates.
pub const RISK_MISMATCH_CAP: f64 = 3.0;
/// Ceiling of the normalized ROI term in the performance score.
pub const ROI_TERM_CAP: f64 = 1.5;

/// Statistics of the population a table is derived against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub records: usize,
    /// Mean of `sell_rate - cost_rate`.
    pub mean_rate_spread: f64,
}

impl PopulationStats {
    pub fn from_records(records: &[Record]) -> Self {
        let spread = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.sell_rate - r.cost_rate).sum::<f64>() / records.len() as f64
        };
        PopulationStats {
            records: records.len(),
            mean_rate_spread: spread,
        }
    }
}

/// Derive every record against its own population.
pub fn derive(records: &[Record]) -> Vec<DerivedRecord> {
    let stats = PopulationStats::from_records(records);
    derive_with_stats(records, &stats)
}

/// Derive every record against an explicitly supplied population.
pub fn derive_with_stats(records: &[Record], stats: &PopulationStats) -> Vec<DerivedRecord> {
    let derived: Vec<DerivedRecord> = records.iter().map(|r| derive_one(r, stats)).collect();
    log::debug!(
        "derived {} records (mean rate spread {:.2})",
        derived.len(),
        stats.mean_rate_spread
    );
    derived
}

/// Numeric seniority difference; unmapped labels yield 0.
pub fn seniority_mismatch(consultant_level: &str, required: &str) -> i32 {
    match (Seniority::parse(consultant_level), Seniority::parse(required)) {
        (Some(have), Some(need)) => have.rank() - need.rank(),
        _ => 0,
    }
}

pub fn margin_pct(profit: f64, revenue: f64) -> f64 {
    100.0 * ratio_or(profit, revenue, 0.0)
}

pub fn efficiency_pct(actual_hours: f64, planned_hours: f64) -> f64 {
    ratio_or(100.0 * actual_hours, planned_hours, 100.0)
}

pub fn roi_per_hour(profit: f64, actual_hours: f64) -> f64 {
    ratio_or(profit, actual_hours, 0.0)
}

/// Only late finishes and understaffing add risk.
pub fn risk_score(delay_days: f64, mismatch: i32) -> f64 {
    let delay_part = clip(delay_days, 0.0, RISK_DELAY_CAP_DAYS) / RISK_DELAY_CAP_DAYS;
    let staffing_part = clip(-(mismatch as f64), 0.0, RISK_MISMATCH_CAP) / RISK_MISMATCH_CAP;
    100.0 * (0.5 * delay_part + 0.5 * staffing_part)
}

pub fn performance_score(
    margin: f64,
    efficiency: f64,
    roi_per_hour: f64,
    risk_score: f64,
    stats: &PopulationStats,
) -> f64 {
    let margin_term = clip(margin, 0.0, 100.0) / 100.0;
    let efficiency_term = clip(100.0 - (efficiency - 100.0).abs(), 0.0, 100.0) / 100.0;
    let roi_ratio = ratio_or(roi_per_hour, stats.mean_rate_spread, 0.0);
    let roi_term = clip(roi_ratio, 0.0, ROI_TERM_CAP) / ROI_TERM_CAP;
    let risk_term = clip(100.0 - risk_score, 0.0, 100.0) / 100.0;
    100.0 * (0.4 * margin_term + 0.2 * efficiency_term + 0.2 * roi_term + 0.2 * risk_term)
}

fn derive_one(r: &Record, stats: &PopulationStats) -> DerivedRecord {
    let revenue = r.actual_hours * r.sell_rate;
    let cost = r.actual_hours * r.cost_rate;
    let profit = revenue - cost;
    let margin = margin_pct(profit, revenue);
    let efficiency = efficiency_pct(r.actual_hours, r.planned_hours);
    let delay_days = days_diff(r.planned_end_date, r.actual_end_date);
    let mismatch = seniority_mismatch(&r.consultant_level, &r.required_seniority);
    let roi = roi_per_hour(profit, r.actual_hours);
    let risk = risk_score(delay_days, mismatch);
    let performance = performance_score(margin, efficiency, roi, risk, stats);

    DerivedRecord {
        consultant: r.consultant.clone(),
        consultant_level: r.consultant_level.clone(),
        client: r.client.clone(),
        project_id: r.project_id.clone(),
        project_type: r.project_type.clone(),
        required_seniority: r.required_seniority.clone(),
        complexity: r.complexity.clone(),
        start_date: r.start_date,
        planned_duration_days: r.planned_duration_days,
        planned_end_date: r.planned_end_date,
        actual_end_date: r.actual_end_date,
        year: r.actual_end_date.year(),
        month: r.actual_end_date.month(),
        planned_hours: r.planned_hours,
        actual_hours: r.actual_hours,
        sell_rate: r.sell_rate,
        cost_rate: r.cost_rate,
        revenue,
        cost,
        profit,
        margin,
        efficiency,
        delay_days,
        mismatch,
        roi_per_hour: roi,
        risk_score: risk,
        performance_score: performance,
    }
}

/// Re-derive the financial columns after revenue or cost were changed in place.
pub(crate) fn refresh_financials(r: &mut DerivedRecord) {
    r.profit = r.revenue - r.cost;
    r.margin = margin_pct(r.profit, r.revenue);
    r.roi_per_hour = roi_per_hour(r.profit, r.actual_hours);
}
