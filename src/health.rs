// Weighted composite health index for a filtered view.
//
// Each governing mean is normalized to `[0, 1.5]`, where `1.0` is "on
// target", then blended and scaled to `[0, 100]`.

use crate::types::DerivedRecord;
use crate::util::{clip, mean_by};
use serde::Serialize;
use std::fmt;

pub const W_MARGIN: f64 = 0.40;
pub const W_EFFICIENCY: f64 = 0.20;
pub const W_DELAY: f64 = 0.25;
pub const W_MISMATCH: f64 = 0.15;

pub const MARGIN_TARGET: f64 = 35.0;
pub const EFFICIENCY_TOLERANCE: f64 = 50.0;
pub const DELAY_TARGET_DAYS: f64 = 30.0;
pub const MISMATCH_TARGET: f64 = 1.5;

const NORM_CAP: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    Attention,
    Critical,
    /// No data in the view.
    Indeterminate,
}

impl HealthStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            HealthStatus::Healthy
        } else if score >= 50.0 {
            HealthStatus::Attention
        } else {
            HealthStatus::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Attention => "Attention",
            HealthStatus::Critical => "Critical",
            HealthStatus::Indeterminate => "Indeterminate",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            HealthStatus::Healthy => {
                "Operation is profitable, on schedule and correctly staffed. Keep the current course."
            }
            HealthStatus::Attention => {
                "Some indicators are drifting from target. Review margins, schedules and staffing before they compound."
            }
            HealthStatus::Critical => {
                "Profitability or delivery is structurally at risk. Immediate corrective action is required."
            }
            HealthStatus::Indeterminate => "No records match the current filters.",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Population means the index is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthInputs {
    pub mean_margin: f64,
    pub mean_efficiency: f64,
    pub mean_delay: f64,
    pub mean_mismatch: f64,
}

impl HealthInputs {
    pub fn from_view(view: &[DerivedRecord]) -> Option<Self> {
        if view.is_empty() {
            return None;
        }
        Some(HealthInputs {
            mean_margin: mean_by(view, |r| r.margin),
            mean_efficiency: mean_by(view, |r| r.efficiency),
            mean_delay: mean_by(view, |r| r.delay_days),
            mean_mismatch: mean_by(view, |r| r.mismatch as f64),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthIndex {
    /// `None` when the view is empty.
    pub score: Option<f64>,
    pub status: HealthStatus,
    pub description: &'static str,
    pub inputs: Option<HealthInputs>,
}

impl HealthIndex {
    pub fn indeterminate() -> Self {
        HealthIndex {
            score: None,
            status: HealthStatus::Indeterminate,
            description: HealthStatus::Indeterminate.description(),
            inputs: None,
        }
    }
}

pub fn health_index(view: &[DerivedRecord]) -> HealthIndex {
    match HealthInputs::from_view(view) {
        Some(inputs) => {
            let score = score_from_inputs(&inputs);
            let status = HealthStatus::from_score(score);
            HealthIndex {
                score: Some(score),
                status,
                description: status.description(),
                inputs: Some(inputs),
            }
        }
        None => HealthIndex::indeterminate(),
    }
}

pub fn score_from_inputs(inputs: &HealthInputs) -> f64 {
    let margin_n = clip(inputs.mean_margin / MARGIN_TARGET, 0.0, NORM_CAP);
    let efficiency_n = clip(
        1.0 - (inputs.mean_efficiency - 100.0).abs() / EFFICIENCY_TOLERANCE,
        0.0,
        NORM_CAP,
    );
    // Delay of twice the target scores zero.
    let delay_n = clip(
        (2.0 * DELAY_TARGET_DAYS - inputs.mean_delay) / DELAY_TARGET_DAYS,
        0.0,
        NORM_CAP,
    );
    let mismatch_n = clip(
        (2.0 * MISMATCH_TARGET - inputs.mean_mismatch.abs()) / MISMATCH_TARGET,
        0.0,
        NORM_CAP,
    );

    let raw = W_MARGIN * margin_n
        + W_EFFICIENCY * efficiency_n
        + W_DELAY * delay_n
        + W_MISMATCH * mismatch_n;
    clip(raw * 100.0, 0.0, 100.0)
}
