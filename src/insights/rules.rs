// Built-in business rules.
//
// Each rule is a pure function of the filtered view and the filters that
// produced it. Thresholds are fixed contract values.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Complexity, DerivedRecord, Seniority};
use crate::util::mean_by;

use super::engine::{AnalysisContext, Rule};
use super::types::{Detection, InsightCategory, Severity, Signal};

/// Mismatch strictly below this flags understaffing.
pub const MISMATCH_THRESHOLD: i32 = -1;
pub const LEAK_MARGIN_PCT: f64 = 15.0;
pub const LEAK_DELAY_DAYS: f64 = 20.0;
pub const SERVICE_MIX_RATIO: f64 = 2.0;
pub const DEFAULT_OVERLOAD_HOURS: f64 = 180.0;
pub const CONCENTRATION_SHARE_PCT: f64 = 50.0;
pub const CONCENTRATION_MIN_CLIENTS: usize = 3;
pub const EFFORT_OVERRUN_PCT: f64 = 25.0;

fn group_by<'a, F>(view: &'a [DerivedRecord], key: F) -> BTreeMap<&'a str, Vec<&'a DerivedRecord>>
where
    F: Fn(&'a DerivedRecord) -> &'a str,
{
    let mut groups: BTreeMap<&str, Vec<&DerivedRecord>> = BTreeMap::new();
    for r in view {
        groups.entry(key(r)).or_default().push(r);
    }
    groups
}

/// Understaffed work: any record more than one level below requirement.
pub struct StaffingMismatchRule;

impl Rule for StaffingMismatchRule {
    fn id(&self) -> InsightCategory {
        InsightCategory::StaffingMismatch
    }

    fn name(&self) -> &'static str {
        "Staffing mismatch"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Detection> {
        let offenders: Vec<&DerivedRecord> = ctx
            .view
            .iter()
            .filter(|r| r.mismatch < MISMATCH_THRESHOLD)
            .collect();

        // Highest risk wins; the first offender wins ties.
        let exemplar = offenders
            .iter()
            .copied()
            .fold(None::<&DerivedRecord>, |best, r| match best {
                Some(b) if b.risk_score >= r.risk_score => Some(b),
                _ => Some(r),
            })?;

        let critical = exemplar.complexity_tier() == Some(Complexity::Critical)
            || exemplar.required_level().map_or(false, |l| l >= Seniority::Senior);
        let severity = if critical {
            Severity::Critical
        } else {
            Severity::High
        };

        Some(Detection::new(
            self.id(),
            severity,
            Signal::StaffingMismatch {
                offenders: offenders.len(),
                consultant: exemplar.consultant.clone(),
                consultant_level: exemplar.consultant_level.clone(),
                required_seniority: exemplar.required_seniority.clone(),
                complexity: exemplar.complexity.clone(),
                client: exemplar.client.clone(),
                project_id: exemplar.project_id.clone(),
                mismatch: exemplar.mismatch,
                risk_score: exemplar.risk_score,
                delay_days: exemplar.delay_days,
            },
        ))
    }
}

/// Low-margin work that is also running late.
pub struct ProfitLeakRule;

impl Rule for ProfitLeakRule {
    fn id(&self) -> InsightCategory {
        InsightCategory::ProfitLeak
    }

    fn name(&self) -> &'static str {
        "Margin/delay collapse"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Detection> {
        let leaking: Vec<DerivedRecord> = ctx
            .view
            .iter()
            .filter(|r| r.margin < LEAK_MARGIN_PCT && r.delay_days > LEAK_DELAY_DAYS)
            .cloned()
            .collect();
        if leaking.is_empty() {
            return None;
        }

        Some(Detection::new(
            self.id(),
            Severity::Critical,
            Signal::ProfitLeak {
                records: leaking.len(),
                at_risk_revenue: leaking.iter().map(|r| r.revenue).sum(),
                mean_margin: mean_by(&leaking, |r| r.margin),
                mean_delay: mean_by(&leaking, |r| r.delay_days),
            },
        ))
    }
}

/// Large ROI/hour gap between the best and worst project types.
pub struct ServiceMixRule;

impl Rule for ServiceMixRule {
    fn id(&self) -> InsightCategory {
        InsightCategory::ServiceMix
    }

    fn name(&self) -> &'static str {
        "Service-mix opportunity"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Detection> {
        let groups = group_by(ctx.view, |r| r.project_type.as_str());
        if groups.len() < 2 {
            return None;
        }

        let roi: Vec<(&str, f64)> = groups
            .iter()
            .map(|(ty, rows)| {
                let mean = rows.iter().map(|r| r.roi_per_hour).sum::<f64>() / rows.len() as f64;
                (*ty, mean)
            })
            .collect();

        let (best_type, best_roi) = roi
            .iter()
            .copied()
            .fold(None::<(&str, f64)>, |acc, cur| match acc {
                Some(a) if a.1 >= cur.1 => Some(a),
                _ => Some(cur),
            })?;
        let (worst_type, worst_roi) = roi
            .iter()
            .copied()
            .fold(None::<(&str, f64)>, |acc, cur| match acc {
                Some(a) if a.1 <= cur.1 => Some(a),
                _ => Some(cur),
            })?;

        if worst_roi <= 0.0 {
            return None;
        }
        let ratio = best_roi / worst_roi;
        if ratio <= SERVICE_MIX_RATIO {
            return None;
        }

        Some(Detection::new(
            self.id(),
            Severity::Medium,
            Signal::ServiceMix {
                best_type: best_type.to_string(),
                best_roi,
                worst_type: worst_type.to_string(),
                worst_roi,
                ratio,
            },
        ))
    }
}

/// Consultant hours in a single selected month above capacity.
pub struct OverloadRule {
    threshold: f64,
}

impl OverloadRule {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for OverloadRule {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLOAD_HOURS)
    }
}

impl Rule for OverloadRule {
    fn id(&self) -> InsightCategory {
        InsightCategory::OverloadRisk
    }

    fn name(&self) -> &'static str {
        "Overload risk"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Detection> {
        // Only meaningful when a single month is selected.
        let month = ctx.filters.month?;

        let mut hours: BTreeMap<&str, f64> = BTreeMap::new();
        for r in ctx.view {
            *hours.entry(r.consultant.as_str()).or_insert(0.0) += r.actual_hours;
        }

        let overloaded = hours.values().filter(|h| **h > self.threshold).count();
        let (consultant, max_hours) = hours
            .iter()
            .fold(None::<(&str, f64)>, |acc, (c, h)| match acc {
                Some(a) if a.1 >= *h => Some(a),
                _ => Some((*c, *h)),
            })?;
        if max_hours <= self.threshold {
            return None;
        }

        Some(Detection::new(
            self.id(),
            Severity::High,
            Signal::OverloadRisk {
                consultant: consultant.to_string(),
                hours: max_hours,
                threshold: self.threshold,
                overloaded,
                month,
                year: ctx.filters.year,
            },
        ))
    }
}

/// One client carrying most of the revenue.
pub struct ClientConcentrationRule;

impl Rule for ClientConcentrationRule {
    fn id(&self) -> InsightCategory {
        InsightCategory::ClientConcentration
    }

    fn name(&self) -> &'static str {
        "Client concentration"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Detection> {
        let clients: BTreeSet<&str> = ctx.view.iter().map(|r| r.client.as_str()).collect();
        if clients.len() < CONCENTRATION_MIN_CLIENTS {
            return None;
        }
        let total: f64 = ctx.view.iter().map(|r| r.revenue).sum();
        if total <= 0.0 {
            return None;
        }

        let groups = group_by(ctx.view, |r| r.client.as_str());
        let (client, revenue) = groups
            .iter()
            .map(|(c, rows)| (*c, rows.iter().map(|r| r.revenue).sum::<f64>()))
            .fold(None::<(&str, f64)>, |acc, cur| match acc {
                Some(a) if a.1 >= cur.1 => Some(a),
                _ => Some(cur),
            })?;
        let share_pct = 100.0 * revenue / total;
        if share_pct <= CONCENTRATION_SHARE_PCT {
            return None;
        }

        Some(Detection::new(
            self.id(),
            Severity::Medium,
            Signal::ClientConcentration {
                client: client.to_string(),
                revenue,
                share_pct,
                clients: clients.len(),
            },
        ))
    }
}

/// A project type systematically burning more hours than planned.
pub struct EffortOverrunRule;

impl Rule for EffortOverrunRule {
    fn id(&self) -> InsightCategory {
        InsightCategory::EffortOverrun
    }

    fn name(&self) -> &'static str {
        "Effort overrun"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Detection> {
        let groups = group_by(ctx.view, |r| r.project_type.as_str());
        let (project_type, planned, actual, overrun_pct) = groups
            .iter()
            .filter_map(|(ty, rows)| {
                let planned: f64 = rows.iter().map(|r| r.planned_hours).sum();
                let actual: f64 = rows.iter().map(|r| r.actual_hours).sum();
                if planned <= 0.0 {
                    return None;
                }
                Some((*ty, planned, actual, 100.0 * (actual / planned - 1.0)))
            })
            .fold(None::<(&str, f64, f64, f64)>, |acc, cur| match acc {
                Some(a) if a.3 >= cur.3 => Some(a),
                _ => Some(cur),
            })?;
        if overrun_pct <= EFFORT_OVERRUN_PCT {
            return None;
        }

        Some(Detection::new(
            self.id(),
            Severity::Medium,
            Signal::EffortOverrun {
                project_type: project_type.to_string(),
                planned_hours: planned,
                actual_hours: actual,
                overrun_pct,
            },
        ))
    }
}
