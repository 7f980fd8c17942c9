// Insight Engine - evaluates the ordered rule list over a filtered view

use crate::filter::FilterSpec;
use crate::types::DerivedRecord;

use super::narrative;
use super::rules::{
    ClientConcentrationRule, EffortOverrunRule, OverloadRule, ProfitLeakRule, ServiceMixRule,
    StaffingMismatchRule, DEFAULT_OVERLOAD_HOURS,
};
use super::types::{Detection, Finding, InsightCategory, Severity, Signal};

/// Context provided to every rule
pub struct AnalysisContext<'a> {
    /// The current filtered view
    pub view: &'a [DerivedRecord],
    /// The filters that produced it
    pub filters: &'a FilterSpec,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(view: &'a [DerivedRecord], filters: &'a FilterSpec) -> Self {
        Self { view, filters }
    }
}

/// One independent business rule. Emits at most one detection.
pub trait Rule: Send + Sync {
    fn id(&self) -> InsightCategory;

    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Detection>;
}

pub struct InsightEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Engine with the built-in rules in declaration order.
    pub fn new() -> Self {
        Self::with_overload_threshold(DEFAULT_OVERLOAD_HOURS)
    }

    pub fn with_overload_threshold(overload_hours: f64) -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(StaffingMismatchRule));
        engine.register(Box::new(ProfitLeakRule));
        engine.register(Box::new(ServiceMixRule));
        engine.register(Box::new(OverloadRule::new(overload_hours)));
        engine.register(Box::new(ClientConcentrationRule));
        engine.register(Box::new(EffortOverrunRule));

        engine
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rule_ids(&self) -> Vec<InsightCategory> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Raw detections in declaration order, without the all-clear fallback.
    pub fn detect(&self, ctx: &AnalysisContext<'_>) -> Vec<Detection> {
        if ctx.view.is_empty() {
            return vec![];
        }
        let mut detections = vec![];
        for rule in &self.rules {
            if let Some(d) = rule.evaluate(ctx) {
                log::debug!("rule '{}' fired ({})", rule.name(), d.severity);
                detections.push(d);
            }
        }
        detections
    }

    /// Rendered findings, most severe first.
    ///
    /// An empty view yields nothing. A non-empty view with no detections
    /// yields a single Low "all clear" finding.
    pub fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        if ctx.view.is_empty() {
            return vec![];
        }

        let mut detections = self.detect(ctx);
        if detections.is_empty() {
            detections.push(Detection::new(
                InsightCategory::AllClear,
                Severity::Low,
                Signal::AllClear {
                    records: ctx.view.len(),
                },
            ));
        }

        let mut findings: Vec<Finding> = detections.iter().map(narrative::render).collect();
        // Stable: declaration order is kept within a tier.
        findings.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));

        log::info!(
            "insight analysis: {} findings over {} records",
            findings.len(),
            ctx.view.len()
        );
        findings
    }
}
