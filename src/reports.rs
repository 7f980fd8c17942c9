// Consolidated KPIs and grouped summaries over a derived view.
use crate::types::{DerivedRecord, GroupSummaryRow};
use crate::util::{average, format_for_column, format_number, ratio_or};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Headline KPIs for a filtered view. All zeros for an empty view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsolidatedMetrics {
    pub records: usize,
    pub consultants: usize,
    pub clients: usize,
    pub projects: usize,
    pub total_hours: f64,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    /// Profit over revenue for the whole view, not a mean of record margins.
    pub overall_margin: f64,
    pub avg_efficiency: f64,
    pub avg_delay: f64,
    pub avg_risk: f64,
    pub avg_performance: f64,
}

pub fn consolidate(view: &[DerivedRecord]) -> ConsolidatedMetrics {
    if view.is_empty() {
        return ConsolidatedMetrics::default();
    }
    let consultants: HashSet<&str> = view.iter().map(|r| r.consultant.as_str()).collect();
    let clients: HashSet<&str> = view.iter().map(|r| r.client.as_str()).collect();
    let projects: HashSet<&str> = view.iter().map(|r| r.project_id.as_str()).collect();

    let total_revenue: f64 = view.iter().map(|r| r.revenue).sum();
    let total_cost: f64 = view.iter().map(|r| r.cost).sum();
    let total_profit = total_revenue - total_cost;

    ConsolidatedMetrics {
        records: view.len(),
        consultants: consultants.len(),
        clients: clients.len(),
        projects: projects.len(),
        total_hours: view.iter().map(|r| r.actual_hours).sum(),
        total_revenue,
        total_cost,
        total_profit,
        overall_margin: 100.0 * ratio_or(total_profit, total_revenue, 0.0),
        avg_efficiency: average(&view.iter().map(|r| r.efficiency).collect::<Vec<_>>()),
        avg_delay: average(&view.iter().map(|r| r.delay_days).collect::<Vec<_>>()),
        avg_risk: average(&view.iter().map(|r| r.risk_score).collect::<Vec<_>>()),
        avg_performance: average(&view.iter().map(|r| r.performance_score).collect::<Vec<_>>()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    ProjectType,
    Consultant,
    Client,
}

impl GroupBy {
    pub fn title(self) -> &'static str {
        match self {
            GroupBy::ProjectType => "Profitability by Project Type",
            GroupBy::Consultant => "Profitability by Consultant",
            GroupBy::Client => "Profitability by Client",
        }
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            GroupBy::ProjectType => "by_project_type",
            GroupBy::Consultant => "by_consultant",
            GroupBy::Client => "by_client",
        }
    }

    fn key(self, r: &DerivedRecord) -> &str {
        match self {
            GroupBy::ProjectType => &r.project_type,
            GroupBy::Consultant => &r.consultant,
            GroupBy::Client => &r.client,
        }
    }
}

/// Grouped profitability table, most profitable group first.
pub fn group_summary(view: &[DerivedRecord], by: GroupBy) -> Vec<GroupSummaryRow> {
    #[derive(Default)]
    struct Acc {
        records: usize,
        hours: f64,
        revenue: f64,
        cost: f64,
        margins: Vec<f64>,
        efficiencies: Vec<f64>,
        delays: Vec<f64>,
        risks: Vec<f64>,
    }

    let mut map: HashMap<String, Acc> = HashMap::new();
    for r in view {
        let e = map.entry(by.key(r).to_string()).or_default();
        e.records += 1;
        e.hours += r.actual_hours;
        e.revenue += r.revenue;
        e.cost += r.cost;
        e.margins.push(r.margin);
        e.efficiencies.push(r.efficiency);
        e.delays.push(r.delay_days);
        e.risks.push(r.risk_score);
    }

    let mut rows: Vec<(f64, String, GroupSummaryRow)> = map
        .into_iter()
        .map(|(group, acc)| {
            let profit = acc.revenue - acc.cost;
            let row = GroupSummaryRow {
                group: group.clone(),
                records: acc.records,
                hours: format_for_column("Hours", acc.hours),
                total_revenue: format_for_column("Total Revenue", acc.revenue),
                total_cost: format_for_column("Total Cost", acc.cost),
                total_profit: format_for_column("Total Profit", profit),
                avg_margin: format_for_column("Avg Margin", average(&acc.margins)),
                avg_efficiency: format_number(average(&acc.efficiencies), 1),
                avg_delay: format_number(average(&acc.delays), 1),
                avg_risk: format_number(average(&acc.risks), 1),
            };
            (profit, group, row)
        })
        .collect();

    rows.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });
    rows.into_iter().map(|(_, _, row)| row).collect()
}
