// One pass of the analysis pipeline over the raw table.
//
// The raw table is filtered first and the view is derived against itself, so
// performance scores are relative to the selected population and move when
// the filters move. The view is then handed explicitly to every consumer.

use crate::filter::{apply_filters, FilterSpec};
use crate::metrics::derive;
use crate::health::{health_index, HealthIndex};
use crate::insights::{AnalysisContext, Finding, InsightEngine, Severity};
use crate::questions::{generate_questions, ReflectiveQuestion};
use crate::reports::{consolidate, ConsolidatedMetrics};
use crate::types::{DerivedRecord, Record};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub filters: FilterSpec,
    pub metrics: ConsolidatedMetrics,
    pub health: HealthIndex,
    pub findings: Vec<Finding>,
    /// Empty whenever a Critical finding is present.
    pub questions: Vec<ReflectiveQuestion>,
}

impl DashboardReport {
    pub fn has_critical(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Critical)
    }
}

/// Filter the raw table, then derive the view against its own population.
pub fn derived_view(table: &[Record], filters: &FilterSpec) -> Vec<DerivedRecord> {
    derive(&apply_filters(table, filters))
}

/// Filter `table` and compute every view-level aggregate from the result.
pub fn build(table: &[Record], filters: &FilterSpec, engine: &InsightEngine) -> (Vec<DerivedRecord>, DashboardReport) {
    let view = derived_view(table, filters);
    let report = analyze_view(&view, filters, engine);
    (view, report)
}

pub fn analyze_view(view: &[DerivedRecord], filters: &FilterSpec, engine: &InsightEngine) -> DashboardReport {
    let findings = engine.analyze(&AnalysisContext::new(view, filters));
    let mut report = DashboardReport {
        filters: filters.clone(),
        metrics: consolidate(view),
        health: health_index(view),
        findings,
        questions: vec![],
    };
    if !report.has_critical() {
        report.questions = generate_questions(view, &report.findings);
    }
    report
}
