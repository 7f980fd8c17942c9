// What-if scenarios over a filtered view.
//
// A scenario never touches its baseline: it returns a freshly derived
// counterfactual table, or the baseline unchanged with `success = false`
// when the scenario cannot be applied. Only financial columns change;
// delay, efficiency, risk and performance are passed through as they were.

use crate::metrics::{margin_pct, refresh_financials};
use crate::types::{ComparisonRow, DerivedRecord};
use crate::util::{format_currency, format_for_column};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scenario {
    /// Uniform percentage change of every cost rate.
    Cost { delta_pct: f64 },
    /// Move `pct` percent of the source group's hours to the target group.
    Reallocate {
        source_type: String,
        target_type: String,
        pct: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Infeasible {
    CostBelowFloor { delta_pct: f64 },
    PercentOutOfRange { pct: f64 },
    SameType { project_type: String },
    EmptyTarget { target_type: String },
    NothingToMove { source_type: String },
}

impl fmt::Display for Infeasible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infeasible::CostBelowFloor { delta_pct } => {
                write!(f, "cost change of {}% would make costs negative", delta_pct)
            }
            Infeasible::PercentOutOfRange { pct } => {
                write!(f, "reallocation percentage {} is outside 0-100", pct)
            }
            Infeasible::SameType { project_type } => {
                write!(f, "source and target are both '{}'", project_type)
            }
            Infeasible::EmptyTarget { target_type } => {
                write!(f, "target '{}' has no baseline hours to price the move", target_type)
            }
            Infeasible::NothingToMove { source_type } => {
                write!(f, "no hours to move out of '{}'", source_type)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub success: bool,
    pub table: Vec<DerivedRecord>,
    pub infeasible: Option<Infeasible>,
}

impl SimulationOutcome {
    fn applied(table: Vec<DerivedRecord>) -> Self {
        Self {
            success: true,
            table,
            infeasible: None,
        }
    }

    fn rejected(baseline: &[DerivedRecord], reason: Infeasible) -> Self {
        log::warn!("scenario rejected: {}", reason);
        Self {
            success: false,
            table: baseline.to_vec(),
            infeasible: Some(reason),
        }
    }
}

pub fn simulate(baseline: &[DerivedRecord], scenario: &Scenario) -> SimulationOutcome {
    match scenario {
        Scenario::Cost { delta_pct } => shift_costs(baseline, *delta_pct),
        Scenario::Reallocate {
            source_type,
            target_type,
            pct,
        } => reallocate(baseline, source_type, target_type, *pct),
    }
}

fn shift_costs(baseline: &[DerivedRecord], delta_pct: f64) -> SimulationOutcome {
    if !delta_pct.is_finite() || delta_pct < -100.0 {
        return SimulationOutcome::rejected(baseline, Infeasible::CostBelowFloor { delta_pct });
    }
    let factor = 1.0 + delta_pct / 100.0;
    let table = baseline
        .iter()
        .cloned()
        .map(|mut r| {
            r.cost_rate *= factor;
            r.cost = r.actual_hours * r.cost_rate;
            refresh_financials(&mut r);
            r
        })
        .collect();
    SimulationOutcome::applied(table)
}

/// Removes `pct` of the source group's hours, revenue and cost row by row,
/// then prices the moved hours at the target group's average revenue and cost
/// per hour and spreads them evenly over the existing target rows. Aggregate
/// totals are exact; no rows are created.
fn reallocate(baseline: &[DerivedRecord], source: &str, target: &str, pct: f64) -> SimulationOutcome {
    if !(0.0..=100.0).contains(&pct) {
        return SimulationOutcome::rejected(baseline, Infeasible::PercentOutOfRange { pct });
    }
    if source == target {
        return SimulationOutcome::rejected(
            baseline,
            Infeasible::SameType {
                project_type: source.to_string(),
            },
        );
    }

    let target_rows = baseline.iter().filter(|r| r.project_type == target).count();
    let target_hours: f64 = baseline
        .iter()
        .filter(|r| r.project_type == target)
        .map(|r| r.actual_hours)
        .sum();
    if target_rows == 0 || target_hours <= 0.0 {
        return SimulationOutcome::rejected(
            baseline,
            Infeasible::EmptyTarget {
                target_type: target.to_string(),
            },
        );
    }

    let source_hours: f64 = baseline
        .iter()
        .filter(|r| r.project_type == source)
        .map(|r| r.actual_hours)
        .sum();
    let share = pct / 100.0;
    let hours_to_move = source_hours * share;
    if hours_to_move <= 0.0 {
        return SimulationOutcome::rejected(
            baseline,
            Infeasible::NothingToMove {
                source_type: source.to_string(),
            },
        );
    }

    let target_revenue: f64 = baseline
        .iter()
        .filter(|r| r.project_type == target)
        .map(|r| r.revenue)
        .sum();
    let target_cost: f64 = baseline
        .iter()
        .filter(|r| r.project_type == target)
        .map(|r| r.cost)
        .sum();
    let revenue_per_hour = target_revenue / target_hours;
    let cost_per_hour = target_cost / target_hours;
    let added_hours = hours_to_move / target_rows as f64;

    let table: Vec<DerivedRecord> = baseline
        .iter()
        .cloned()
        .map(|mut r| {
            if r.project_type == source {
                r.actual_hours *= 1.0 - share;
                r.revenue *= 1.0 - share;
                r.cost *= 1.0 - share;
                refresh_financials(&mut r);
            } else if r.project_type == target {
                r.actual_hours += added_hours;
                r.revenue += added_hours * revenue_per_hour;
                r.cost += added_hours * cost_per_hour;
                refresh_financials(&mut r);
            }
            r
        })
        .collect();

    log::info!(
        "moved {:.1}h from {} to {} ({} rows)",
        hours_to_move,
        source,
        target,
        target_rows
    );
    SimulationOutcome::applied(table)
}

/// Aggregate financials of a table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub hours: f64,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub margin: f64,
}

impl Totals {
    pub fn of(table: &[DerivedRecord]) -> Self {
        let hours: f64 = table.iter().map(|r| r.actual_hours).sum();
        let revenue: f64 = table.iter().map(|r| r.revenue).sum();
        let cost: f64 = table.iter().map(|r| r.cost).sum();
        let profit = revenue - cost;
        Totals {
            hours,
            revenue,
            cost,
            profit,
            margin: margin_pct(profit, revenue),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub baseline: Totals,
    pub scenario: Totals,
    pub profit_delta: f64,
    pub margin_delta: f64,
}

impl ScenarioComparison {
    pub fn new(baseline: &[DerivedRecord], scenario: &[DerivedRecord]) -> Self {
        let b = Totals::of(baseline);
        let s = Totals::of(scenario);
        ScenarioComparison {
            baseline: b,
            scenario: s,
            profit_delta: s.profit - b.profit,
            margin_delta: s.margin - b.margin,
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "Profit moves from {} to {} ({}{}).",
            format_currency(self.baseline.profit),
            format_currency(self.scenario.profit),
            if self.profit_delta >= 0.0 { "+" } else { "" },
            format_currency(self.profit_delta)
        )
    }

    pub fn rows(&self) -> Vec<ComparisonRow> {
        let metrics = [
            ("Hours", self.baseline.hours, self.scenario.hours),
            ("Total Revenue", self.baseline.revenue, self.scenario.revenue),
            ("Total Cost", self.baseline.cost, self.scenario.cost),
            ("Total Profit", self.baseline.profit, self.scenario.profit),
            ("Margin", self.baseline.margin, self.scenario.margin),
        ];
        metrics
            .iter()
            .map(|(name, b, s)| ComparisonRow {
                metric: name.to_string(),
                baseline: format_for_column(name, *b),
                scenario: format_for_column(name, *s),
                delta: format_for_column(name, s - b),
            })
            .collect()
    }
}
