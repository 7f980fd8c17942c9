// Insight Engine - rule-based findings and prescriptions
//
// An ordered list of independent rules is evaluated over the filtered view.
// Detection (which numbers triggered a rule) is kept apart from wording
// (`narrative`), so each rule can be tested on its numbers alone.
//
// ```rust,ignore
// use bizpulse::insights::{AnalysisContext, InsightEngine};
//
// let engine = InsightEngine::new();
// let findings = engine.analyze(&AnalysisContext::new(&view, &filters));
// ```

pub mod engine;
pub mod narrative;
pub mod rules;
pub mod types;

pub use engine::{AnalysisContext, InsightEngine, Rule};
pub use types::{Detection, Finding, InsightCategory, Severity, Signal};
