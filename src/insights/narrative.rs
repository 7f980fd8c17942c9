// Wording for detections. Pure formatting over already-computed numbers.

use crate::util::{format_currency, format_number, format_percent};

use super::types::{Detection, Finding, Signal};

pub fn render(detection: &Detection) -> Finding {
    let (title, narrative, actions) = match &detection.signal {
        Signal::StaffingMismatch {
            offenders,
            consultant,
            consultant_level,
            required_seniority,
            complexity,
            client,
            project_id,
            mismatch,
            risk_score,
            delay_days,
        } => (
            "Under-qualified staffing".to_string(),
            format!(
                "{} record(s) are staffed more than one level below requirement. \
                 Worst case: {} ({}) on {} for {}, which requires {} at {} complexity \
                 (gap {} levels, risk {}, delay {} days).",
                offenders,
                consultant,
                consultant_level,
                project_id,
                client,
                required_seniority,
                complexity,
                mismatch,
                format_number(*risk_score, 1),
                format_number(*delay_days, 0)
            ),
            vec![
                format!("Pair {} with a {} reviewer on {}.", consultant, required_seniority, project_id),
                "Re-run staffing allocation against required seniority before kickoff.".to_string(),
                "Schedule targeted training for consultants repeatedly placed above their level.".to_string(),
            ],
        ),
        Signal::ProfitLeak {
            records,
            at_risk_revenue,
            mean_margin,
            mean_delay,
        } => (
            "Profit leak: low margin and late delivery".to_string(),
            format!(
                "{} record(s) combine a margin under 15% with more than 20 days of delay, \
                 putting {} of revenue at risk (average margin {}, average delay {} days).",
                records,
                format_currency(*at_risk_revenue),
                format_percent(*mean_margin),
                format_number(*mean_delay, 1)
            ),
            vec![
                "Review change-request and scope control on the affected projects.".to_string(),
                "Renegotiate rates or milestones with the clients involved.".to_string(),
                "Escalate delivery recovery plans for projects more than 20 days late.".to_string(),
            ],
        ),
        Signal::ServiceMix {
            best_type,
            best_roi,
            worst_type,
            worst_roi,
            ratio,
        } => (
            "Service-mix opportunity".to_string(),
            format!(
                "{} returns {}/hour against {}/hour for {}, a {}x gap.",
                best_type,
                format_currency(*best_roi),
                format_currency(*worst_roi),
                worst_type,
                format_number(*ratio, 1)
            ),
            vec![
                format!("Shift sales focus toward {} engagements.", best_type),
                format!("Reprice or repackage {} work.", worst_type),
            ],
        ),
        Signal::OverloadRisk {
            consultant,
            hours,
            threshold,
            overloaded,
            month,
            year,
        } => {
            let period = match year {
                Some(y) => format!("{:02}/{}", month, y),
                None => format!("month {}", month),
            };
            (
                "Consultant overload risk".to_string(),
                format!(
                    "{} logged {} hours in {}, above the {} hour capacity. \
                     {} consultant(s) exceed capacity in this period.",
                    consultant,
                    format_number(*hours, 0),
                    period,
                    format_number(*threshold, 0),
                    overloaded
                ),
                vec![
                    format!("Rebalance {}'s allocation across the team.", consultant),
                    "Check for burnout signals and unplanned overtime cost.".to_string(),
                ],
            )
        }
        Signal::ClientConcentration {
            client,
            revenue,
            share_pct,
            clients,
        } => (
            "Client concentration".to_string(),
            format!(
                "{} accounts for {} of revenue ({}) across {} clients.",
                client,
                format_percent(*share_pct),
                format_currency(*revenue),
                clients
            ),
            vec![
                "Develop pipeline with secondary accounts.".to_string(),
                format!("Secure a multi-period agreement with {}.", client),
            ],
        ),
        Signal::EffortOverrun {
            project_type,
            planned_hours,
            actual_hours,
            overrun_pct,
        } => (
            "Effort overrun".to_string(),
            format!(
                "{} work used {} hours against {} planned, {} over estimate.",
                project_type,
                format_number(*actual_hours, 0),
                format_number(*planned_hours, 0),
                format_percent(*overrun_pct)
            ),
            vec![
                format!("Recalibrate estimation templates for {} projects.", project_type),
                "Track burn against plan weekly on open engagements.".to_string(),
            ],
        ),
        Signal::AllClear { records } => (
            "All clear".to_string(),
            format!(
                "No rule fired across {} record(s). Margins, schedules and staffing are within tolerance.",
                records
            ),
            vec!["Keep monitoring; re-run after the next data load.".to_string()],
        ),
    };

    Finding {
        category: detection.category,
        severity: detection.severity,
        icon: detection.category.icon(),
        title,
        narrative,
        actions,
        signal: detection.signal.clone(),
    }
}
