// Open-ended strategic questions.
//
// Lower priority than findings: these never carry actions. The view needs
// at least two records across at least two project types.

use crate::insights::{Finding, InsightCategory};
use crate::types::DerivedRecord;
use crate::util::{format_number, format_percent, mean_by};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MIX_DISPARITY_POINTS: f64 = 10.0;
pub const GROWTH_MARGIN_PCT: f64 = 35.0;
pub const LEVERAGE_MISMATCH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionTopic {
    MixDisparity,
    GrowthHorizon,
    SeniorityLeverage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReflectiveQuestion {
    pub topic: QuestionTopic,
    pub question: String,
    pub context: String,
}

struct TypeStats {
    revenue: f64,
    profit: f64,
}

impl TypeStats {
    fn margin(&self) -> f64 {
        crate::metrics::margin_pct(self.profit, self.revenue)
    }
}

pub fn generate_questions(view: &[DerivedRecord], findings: &[Finding]) -> Vec<ReflectiveQuestion> {
    let mut by_type: BTreeMap<&str, TypeStats> = BTreeMap::new();
    for r in view {
        let e = by_type.entry(r.project_type.as_str()).or_insert(TypeStats {
            revenue: 0.0,
            profit: 0.0,
        });
        e.revenue += r.revenue;
        e.profit += r.profit;
    }
    if view.len() < 2 || by_type.len() < 2 {
        return vec![];
    }

    let mut questions = vec![];

    let top_revenue = by_type
        .iter()
        .fold(None::<(&str, &TypeStats)>, |acc, (ty, s)| match acc {
            Some(a) if a.1.revenue >= s.revenue => Some(a),
            _ => Some((*ty, s)),
        });
    let top_margin = by_type
        .iter()
        .fold(None::<(&str, &TypeStats)>, |acc, (ty, s)| match acc {
            Some(a) if a.1.margin() >= s.margin() => Some(a),
            _ => Some((*ty, s)),
        });
    if let (Some((rev_type, rev)), Some((mar_type, mar))) = (top_revenue, top_margin) {
        let gap = mar.margin() - rev.margin();
        if gap > MIX_DISPARITY_POINTS {
            questions.push(ReflectiveQuestion {
                topic: QuestionTopic::MixDisparity,
                question: format!(
                    "Is {} volume worth it when {} earns {} more margin per unit of revenue?",
                    rev_type,
                    mar_type,
                    format_number(gap, 1)
                ),
                context: format!(
                    "{} leads revenue at {} margin; {} leads margin at {}.",
                    rev_type,
                    format_percent(rev.margin()),
                    mar_type,
                    format_percent(mar.margin())
                ),
            });
        }
    }

    let mean_margin = mean_by(view, |r| r.margin);
    let leaking = findings.iter().any(|f| f.category == InsightCategory::ProfitLeak);
    if mean_margin > GROWTH_MARGIN_PCT && !leaking {
        questions.push(ReflectiveQuestion {
            topic: QuestionTopic::GrowthHorizon,
            question: "With margins this healthy, what is the next growth horizon: new service lines, new markets or more capacity?".to_string(),
            context: format!("Average margin is {}.", format_percent(mean_margin)),
        });
    }

    let mean_mismatch = mean_by(view, |r| r.mismatch as f64);
    if mean_mismatch > LEVERAGE_MISMATCH {
        questions.push(ReflectiveQuestion {
            topic: QuestionTopic::SeniorityLeverage,
            question: "Are senior consultants absorbing work a more junior team could deliver?".to_string(),
            context: format!(
                "Consultants sit {} levels above requirement on average.",
                format_number(mean_mismatch, 2)
            ),
        });
    }

    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, with_levels};
    use crate::insights::{Detection, Severity, Signal};
    use crate::metrics::derive;

    fn topics(q: &[ReflectiveQuestion]) -> Vec<QuestionTopic> {
        q.iter().map(|q| q.topic).collect()
    }

    #[test]
    fn needs_two_records_and_two_types() {
        assert!(generate_questions(&[], &[]).is_empty());
        let one_type = derive(&[
            record("Ana", "Acme", "Audit", 10.0, 100.0, 10.0),
            record("Bo", "Acme", "Audit", 10.0, 100.0, 10.0),
        ]);
        assert!(generate_questions(&one_type, &[]).is_empty());
    }

    #[test]
    fn flags_revenue_leader_trailing_on_margin() {
        let view = derive(&[
            record("Ana", "Acme", "Implementation", 100.0, 100.0, 80.0),
            record("Bo", "Acme", "Strategy", 10.0, 100.0, 60.0),
        ]);
        let q = generate_questions(&view, &[]);
        assert_eq!(topics(&q), vec![QuestionTopic::MixDisparity]);
        assert!(q[0].question.starts_with("Is Implementation volume"));
    }

    #[test]
    fn growth_question_suppressed_by_profit_leak() {
        let view = derive(&[
            record("Ana", "Acme", "Audit", 10.0, 100.0, 50.0),
            record("Bo", "Acme", "Strategy", 10.0, 100.0, 50.0),
        ]);
        assert_eq!(topics(&generate_questions(&view, &[])), vec![QuestionTopic::GrowthHorizon]);

        let leak = crate::insights::narrative::render(&Detection::new(
            InsightCategory::ProfitLeak,
            Severity::Critical,
            Signal::ProfitLeak {
                records: 1,
                at_risk_revenue: 10.0,
                mean_margin: 5.0,
                mean_delay: 30.0,
            },
        ));
        assert!(generate_questions(&view, &[leak]).is_empty());
    }

    #[test]
    fn overstaffing_prompts_leverage_question() {
        let view = derive(&[
            with_levels(record("Ana", "Acme", "Audit", 10.0, 100.0, 90.0), "LEAD", "JUNIOR"),
            with_levels(record("Bo", "Acme", "Strategy", 10.0, 100.0, 90.0), "SENIOR", "JUNIOR"),
        ]);
        assert_eq!(
            topics(&generate_questions(&view, &[])),
            vec![QuestionTopic::SeniorityLeverage]
        );
    }
}
