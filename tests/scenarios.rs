use bizpulse::dashboard;
use bizpulse::filter::{apply_filters, FilterSpec, Selection};
use bizpulse::health::HealthStatus;
use bizpulse::insights::{AnalysisContext, InsightCategory, InsightEngine, Severity, Signal};
use bizpulse::loader::{load_from_reader, load_or_empty};
use bizpulse::metrics::derive;
use bizpulse::reports::ConsolidatedMetrics;
use bizpulse::simulator::{simulate, Scenario, Totals};
use bizpulse::types::{DerivedRecord, Record};
use bizpulse::Error;
use chrono::NaiveDate;

fn record(consultant: &str, client: &str, project_type: &str, hours: f64, sell: f64, cost: f64) -> Record {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
    Record {
        consultant: consultant.to_string(),
        consultant_level: "MID".to_string(),
        client: client.to_string(),
        project_id: format!("{}-{}", client, project_type),
        project_type: project_type.to_string(),
        required_seniority: "MID".to_string(),
        complexity: "Medium".to_string(),
        start_date: start,
        planned_duration_days: 19,
        planned_end_date: end,
        actual_end_date: end,
        planned_hours: hours,
        actual_hours: hours,
        sell_rate: sell,
        cost_rate: cost,
    }
}

fn ending(mut r: Record, year: i32, month: u32, day: u32) -> Record {
    let end = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    r.start_date = end - chrono::Duration::days(r.planned_duration_days);
    r.planned_end_date = end;
    r.actual_end_date = end;
    r
}

fn analyze(view: &[DerivedRecord], filters: &FilterSpec) -> Vec<bizpulse::insights::Finding> {
    InsightEngine::new().analyze(&AnalysisContext::new(view, filters))
}

#[test]
fn understaffed_critical_work_is_flagged_with_its_exemplar() {
    let mut risky = record("Cai", "Initech", "Implementation", 40.0, 150.0, 80.0);
    risky.consultant_level = "JUNIOR".to_string();
    risky.required_seniority = "SENIOR".to_string();
    risky.complexity = "Critical".to_string();
    risky.actual_end_date = risky.planned_end_date + chrono::Duration::days(25);

    let table = derive(&[
        record("Ana", "Acme", "Audit", 40.0, 120.0, 60.0),
        record("Bo", "Globex", "Audit", 40.0, 120.0, 60.0),
        risky,
    ]);
    assert_eq!(table[2].mismatch, -2);

    let findings = analyze(&table, &FilterSpec::all());
    let staffing = findings
        .iter()
        .find(|f| f.category == InsightCategory::StaffingMismatch)
        .expect("staffing finding");
    assert_eq!(staffing.severity, Severity::Critical);
    match &staffing.signal {
        Signal::StaffingMismatch {
            consultant,
            mismatch,
            offenders,
            ..
        } => {
            assert_eq!(consultant, "Cai");
            assert_eq!(*mismatch, -2);
            assert_eq!(*offenders, 1);
        }
        other => panic!("unexpected signal {:?}", other),
    }
    assert_eq!(findings[0].severity, Severity::Critical);
}

#[test]
fn wide_roi_gap_between_types_cites_the_best_type() {
    let table = derive(&[
        record("Ana", "Acme", "Strategy", 20.0, 100.0, 50.0),
        record("Bo", "Globex", "Support", 20.0, 30.0, 20.0),
    ]);
    let findings = analyze(&table, &FilterSpec::all());
    let mix = findings
        .iter()
        .find(|f| f.category == InsightCategory::ServiceMix)
        .expect("service mix finding");
    assert!(mix.narrative.contains("Strategy"));
    match &mix.signal {
        Signal::ServiceMix {
            best_type,
            worst_type,
            ratio,
            ..
        } => {
            assert_eq!(best_type, "Strategy");
            assert_eq!(worst_type, "Support");
            assert!((ratio - 5.0).abs() < 1e-9);
        }
        other => panic!("unexpected signal {:?}", other),
    }
}

#[test]
fn overload_needs_a_single_month_selection() {
    let table = derive(&[
        record("Ana", "Acme", "Audit", 120.0, 120.0, 60.0),
        record("Ana", "Globex", "Audit", 80.0, 120.0, 60.0),
        record("Bo", "Acme", "Audit", 60.0, 120.0, 60.0),
    ]);

    let all = analyze(&table, &FilterSpec::all());
    assert!(all.iter().all(|f| f.category != InsightCategory::OverloadRisk));

    let march = FilterSpec {
        month: Some(3),
        ..FilterSpec::all()
    };
    let view = apply_filters(&table, &march);
    let findings = analyze(&view, &march);
    let overload = findings
        .iter()
        .find(|f| f.category == InsightCategory::OverloadRisk)
        .expect("overload finding");
    assert_eq!(overload.severity, Severity::High);
    match &overload.signal {
        Signal::OverloadRisk { consultant, hours, .. } => {
            assert_eq!(consultant, "Ana");
            assert!((hours - 200.0).abs() < 1e-9);
        }
        other => panic!("unexpected signal {:?}", other),
    }
}

#[test]
fn empty_view_has_no_findings_and_clean_view_is_all_clear() {
    let table = derive(&[
        record("Ana", "Acme", "Audit", 40.0, 120.0, 60.0),
        record("Bo", "Globex", "Audit", 40.0, 120.0, 60.0),
    ]);

    let none = FilterSpec {
        year: Some(2001),
        ..FilterSpec::all()
    };
    let view = apply_filters(&table, &none);
    assert!(view.is_empty());
    assert!(analyze(&view, &none).is_empty());

    let findings = analyze(&table, &FilterSpec::all());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, InsightCategory::AllClear);
    assert_eq!(findings[0].severity, Severity::Low);
}

#[test]
fn filtering_is_identity_under_all_idempotent_and_narrowing() {
    let table = vec![
        record("Ana", "Acme", "Audit", 40.0, 120.0, 60.0),
        record("Bo", "Globex", "Strategy", 40.0, 200.0, 60.0),
        record("Cai", "Acme", "Support", 40.0, 80.0, 50.0),
        record("Dee", "Initech", "Audit", 40.0, 120.0, 60.0),
    ];

    assert_eq!(apply_filters(&table, &FilterSpec::all()), table);

    let several = FilterSpec {
        clients: Selection::only(["Acme".to_string(), "Globex".to_string()]),
        project_types: Selection::only(["Audit".to_string(), "Strategy".to_string()]),
        month: Some(3),
        year: Some(2024),
        ..FilterSpec::all()
    };
    let once = apply_filters(&table, &several);
    let twice = apply_filters(&once, &several);
    assert_eq!(once.len(), 2);
    assert_eq!(once, twice);

    let acme = FilterSpec {
        clients: Selection::only(["Acme".to_string()]),
        ..FilterSpec::all()
    };
    let acme_view = apply_filters(&table, &acme);
    assert_eq!(acme_view.len(), 2);
    assert!(acme_view.iter().all(|r| r.client == "Acme"));

    let acme_ana = FilterSpec {
        consultants: Selection::only(["Ana".to_string()]),
        ..acme.clone()
    };
    let narrower = apply_filters(&table, &acme_ana);
    assert_eq!(narrower.len(), 1);
    assert!(narrower.iter().all(|r| acme_view.contains(r)));
}

#[test]
fn performance_scores_follow_the_selected_population() {
    let table = vec![
        record("Ana", "Acme", "Audit", 40.0, 120.0, 60.0),
        record("Bo", "Globex", "Strategy", 40.0, 300.0, 60.0),
        record("Cai", "Acme", "Support", 40.0, 80.0, 50.0),
    ];
    let everyone = dashboard::derived_view(&table, &FilterSpec::all());
    let acme = FilterSpec {
        clients: Selection::only(["Acme".to_string()]),
        ..FilterSpec::all()
    };
    let acme_view = dashboard::derived_view(&table, &acme);

    let ana_everyone = everyone.iter().find(|r| r.consultant == "Ana").unwrap();
    let ana_acme = acme_view.iter().find(|r| r.consultant == "Ana").unwrap();
    assert!((ana_everyone.performance_score - ana_acme.performance_score).abs() > 1.0);
    // Only the population-relative score moves.
    assert_eq!(ana_everyone.margin, ana_acme.margin);
    assert_eq!(ana_everyone.risk_score, ana_acme.risk_score);

    let engine = InsightEngine::new();
    let (_, all_report) = dashboard::build(&table, &FilterSpec::all(), &engine);
    let (_, acme_report) = dashboard::build(&table, &acme, &engine);
    let acme_mean = acme_view.iter().map(|r| r.performance_score).sum::<f64>() / acme_view.len() as f64;
    assert!((acme_report.metrics.avg_performance - acme_mean).abs() < 1e-9);
    assert!((all_report.metrics.avg_performance - acme_report.metrics.avg_performance).abs() > 1e-6);
}

#[test]
fn month_and_year_selection_drives_overload_and_staffing_together() {
    let mut understaffed = record("Cai", "Initech", "Implementation", 30.0, 150.0, 80.0);
    understaffed.consultant_level = "JUNIOR".to_string();
    understaffed.required_seniority = "SENIOR".to_string();
    understaffed.complexity = "Critical".to_string();
    understaffed.actual_end_date = understaffed.planned_end_date + chrono::Duration::days(5);

    let table = vec![
        record("Ana", "Acme", "Audit", 120.0, 120.0, 60.0),
        record("Ana", "Globex", "Audit", 80.0, 120.0, 60.0),
        ending(record("Ana", "Acme", "Audit", 100.0, 120.0, 60.0), 2023, 3, 20),
        ending(record("Ana", "Acme", "Audit", 100.0, 120.0, 60.0), 2024, 4, 10),
        record("Bo", "Acme", "Audit", 60.0, 120.0, 60.0),
        understaffed,
    ];
    let march_2024 = FilterSpec {
        month: Some(3),
        year: Some(2024),
        ..FilterSpec::all()
    };

    let (view, report) = dashboard::build(&table, &march_2024, &InsightEngine::new());
    assert_eq!(view.len(), 4);

    let overload = report
        .findings
        .iter()
        .find(|f| f.category == InsightCategory::OverloadRisk)
        .expect("overload finding");
    match &overload.signal {
        Signal::OverloadRisk {
            consultant,
            hours,
            month,
            year,
            ..
        } => {
            assert_eq!(consultant, "Ana");
            assert!((hours - 200.0).abs() < 1e-9);
            assert_eq!(*month, 3);
            assert_eq!(*year, Some(2024));
        }
        other => panic!("unexpected signal {:?}", other),
    }

    assert_eq!(report.findings[0].category, InsightCategory::StaffingMismatch);
    assert_eq!(report.findings[0].severity, Severity::Critical);
    assert!(report.has_critical());
    assert!(report.questions.is_empty());
}

#[test]
fn unavailable_source_behaves_as_an_empty_universe() {
    let (records, load) = load_or_empty("/no/such/dir/timesheets.csv").unwrap();
    assert!(load.source_unavailable);
    assert!(records.is_empty());

    let (view, report) = dashboard::build(&records, &FilterSpec::all(), &InsightEngine::new());
    assert!(view.is_empty());
    assert_eq!(report.health.status, HealthStatus::Indeterminate);
    assert!(report.health.score.is_none());
    assert!(report.findings.is_empty());
    assert!(report.questions.is_empty());
    assert_eq!(report.metrics, ConsolidatedMetrics::default());
}

#[test]
fn zero_cost_change_is_identity_and_reallocation_keeps_hours() {
    let table = derive(&[
        record("Ana", "Acme", "Strategy", 40.0, 200.0, 90.0),
        record("Bo", "Globex", "Support", 60.0, 60.0, 40.0),
        record("Cai", "Acme", "Support", 20.0, 60.0, 40.0),
    ]);

    let same = simulate(&table, &Scenario::Cost { delta_pct: 0.0 });
    assert!(same.success);
    assert_eq!(Totals::of(&same.table), Totals::of(&table));

    let moved = simulate(
        &table,
        &Scenario::Reallocate {
            source_type: "Support".to_string(),
            target_type: "Strategy".to_string(),
            pct: 50.0,
        },
    );
    assert!(moved.success);
    let before = Totals::of(&table);
    let after = Totals::of(&moved.table);
    assert!((before.hours - after.hours).abs() < 1e-9);
    assert!(after.profit > before.profit);

    let rejected = simulate(
        &table,
        &Scenario::Reallocate {
            source_type: "Support".to_string(),
            target_type: "Training".to_string(),
            pct: 50.0,
        },
    );
    assert!(!rejected.success);
    assert_eq!(rejected.table, table);
}

#[test]
fn csv_text_flows_through_to_a_dashboard() {
    let csv = "\
consultant,client,project_id,project_type,required_seniority,consultant_level,complexity,start_date,planned_duration_days,planned_end_date,actual_end_date,planned_hours,actual_hours,sell_rate,cost_rate
Ana,Acme,P1,Audit,MID,SENIOR,Medium,2024-01-08,30,,,100,110,150,70
Bo,Globex,P2,Strategy,SENIOR,SENIOR,High,2024-01-15,20,2024-02-04,2024-02-10,80,80,220,95
";
    let (records, report) = load_from_reader(csv.as_bytes()).unwrap();
    assert_eq!(report.total_rows, 2);
    assert_eq!(records[0].planned_end_date, NaiveDate::from_ymd_opt(2024, 2, 7).unwrap());
    assert_eq!(records[0].actual_end_date, records[0].planned_end_date);

    let (view, dash) = dashboard::build(&records, &FilterSpec::all(), &InsightEngine::new());
    assert!((view[1].delay_days - 6.0).abs() < 1e-9);
    assert_eq!(view.len(), 2);
    assert_eq!(dash.metrics.records, 2);
    assert!(dash.health.score.is_some());
    assert_ne!(dash.health.status, HealthStatus::Indeterminate);
    assert!(!dash.findings.is_empty());
}

#[test]
fn bad_numeric_cell_is_a_schema_error() {
    let csv = "\
consultant,client,project_id,project_type,required_seniority,consultant_level,complexity,start_date,planned_duration_days,planned_end_date,actual_end_date,planned_hours,actual_hours,sell_rate,cost_rate
Ana,Acme,P1,Audit,MID,MID,Medium,2024-01-08,30,,,100,lots,150,70
";
    match load_from_reader(csv.as_bytes()) {
        Err(Error::Schema { row, column, .. }) => {
            assert_eq!(row, 1);
            assert_eq!(column, "actual_hours");
        }
        other => panic!("expected schema error, got {:?}", other.map(|(r, _)| r.len())),
    }
}
