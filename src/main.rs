// Entry point and interactive session flow.
//
// - Option [1] loads the timesheet CSV, option [2] generates a synthetic
//   table instead. Either one becomes the session's raw table, cached for the
//   configured TTL and reloaded from the same source once it expires.
// - Filters are session parameters. Every other option filters the raw table
//   from scratch and derives the view against that selection, so scores are
//   relative to what is on screen.
use anyhow::Result;
use bizpulse::cache::RawTableCache;
use bizpulse::cli::Cli;
use bizpulse::config::AppConfig;
use bizpulse::dashboard::{self, DashboardReport};
use bizpulse::filter::{parse_month, parse_year, FilterSpec, Selection};
use bizpulse::insights::InsightEngine;
use bizpulse::reports::{group_summary, GroupBy};
use bizpulse::simulator::{simulate, Scenario, ScenarioComparison};
use bizpulse::types::{DerivedRecord, Record};
use bizpulse::{generator, loader, output, util};
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        config: AppConfig::default(),
        cache: RawTableCache::default(),
        source: None,
        filters: FilterSpec::all(),
    })
});

#[derive(Debug, Clone)]
enum Source {
    Csv(String),
    Synthetic { rows: usize, seed: u64 },
}

struct AppState {
    config: AppConfig,
    cache: RawTableCache,
    source: Option<Source>,
    filters: FilterSpec,
}

/// Read a single trimmed line after printing `label`.
fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

fn fetch(source: &Source) -> bizpulse::Result<Vec<Record>> {
    match source {
        Source::Csv(path) => loader::load_or_empty(path).map(|(records, _)| records),
        Source::Synthetic { rows, seed } => Ok(generator::generate(*rows, *seed)),
    }
}

/// Raw table for the session, reloaded if the cache expired.
fn session_table(state: &AppState) -> Option<Arc<Vec<Record>>> {
    let source = match &state.source {
        Some(s) => s.clone(),
        None => {
            println!("Error: No data loaded. Please load the CSV file or generate data first.\n");
            return None;
        }
    };
    match state.cache.get_or_load(|| fetch(&source)) {
        Ok(raw) => Some(raw),
        Err(e) => {
            eprintln!("Failed to reload data: {}\n", e);
            None
        }
    }
}

fn handle_load(state: &mut AppState) {
    let path = state.config.data_path.clone();
    state.cache.invalidate();
    match loader::load_or_empty(&path) {
        Ok((_, report)) if report.source_unavailable => {
            println!("Warning: data source '{}' unavailable. Continuing with no data.\n", path);
            state.cache.put(Vec::new());
            state.source = Some(Source::Csv(path));
        }
        Ok((records, report)) => {
            println!(
                "Processing dataset... ({} rows, {} consultants, {} clients, {} project types)\n",
                util::format_int(report.total_rows),
                report.consultants,
                report.clients,
                report.project_types
            );
            state.cache.put(records);
            state.source = Some(Source::Csv(path));
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            state.source = None;
        }
    }
}

fn handle_generate(state: &mut AppState) {
    let rows = state.config.synthetic_rows;
    let seed = state.config.seed;
    let records = generator::generate(rows, seed);
    println!(
        "Generated {} synthetic records (seed {}).\n",
        util::format_int(records.len()),
        seed
    );
    state.cache.put(records);
    state.source = Some(Source::Synthetic { rows, seed });
}

fn handle_filters(state: &mut AppState) {
    println!("Current filters: {}", state.filters);
    println!("Enter ALL (or leave blank) to disable a filter; separate names with commas.");
    let consultants = Selection::parse_list(&prompt("Consultants: "));
    let clients = Selection::parse_list(&prompt("Clients: "));
    let project_types = Selection::parse_list(&prompt("Project types: "));
    let month = match parse_month(&prompt("Month (1-12): ")) {
        Ok(m) => m,
        Err(e) => {
            println!("{}. Filters unchanged.\n", e);
            return;
        }
    };
    let year = match parse_year(&prompt("Year: ")) {
        Ok(y) => y,
        Err(e) => {
            println!("{}. Filters unchanged.\n", e);
            return;
        }
    };
    state.filters = FilterSpec {
        consultants,
        clients,
        project_types,
        month,
        year,
    };
    println!("Filters set: {}\n", state.filters);
}

fn print_dashboard(report: &DashboardReport, view: &[DerivedRecord]) {
    let m = &report.metrics;
    println!("Filters: {}\n", report.filters);

    match report.health.score {
        Some(score) => println!(
            "Health Index: {} ({})",
            util::format_number(score, 1),
            report.health.status
        ),
        None => println!("Health Index: n/a ({})", report.health.status),
    }
    println!("{}\n", report.health.description);

    println!("Records: {}   Consultants: {}   Clients: {}   Projects: {}", m.records, m.consultants, m.clients, m.projects);
    println!(
        "Revenue: {}   Cost: {}   Profit: {}   Margin: {}",
        util::format_currency(m.total_revenue),
        util::format_currency(m.total_cost),
        util::format_currency(m.total_profit),
        util::format_percent(m.overall_margin)
    );
    println!(
        "Avg efficiency: {}   Avg delay: {} days   Avg risk: {}   Avg performance: {}\n",
        util::format_percent(m.avg_efficiency),
        util::format_number(m.avg_delay, 1),
        util::format_number(m.avg_risk, 1),
        util::format_number(m.avg_performance, 1)
    );

    println!("Insights:");
    if report.findings.is_empty() {
        println!("  (no data)");
    }
    for f in &report.findings {
        println!("  {} [{}] {}", f.icon, f.severity, f.title);
        println!("      {}", f.narrative);
        for a in &f.actions {
            println!("      - {}", a);
        }
    }
    println!();

    if report.has_critical() {
        println!("Reflective questions are held back while a Critical finding is open.\n");
    } else if !report.questions.is_empty() {
        println!("Questions worth asking:");
        for q in &report.questions {
            println!("  ? {}", q.question);
            println!("    {}", q.context);
        }
        println!();
    }

    output::preview_table(
        GroupBy::ProjectType.title(),
        Some("Top 5 by Total Profit"),
        &group_summary(view, GroupBy::ProjectType),
        5,
    );
}

fn handle_dashboard(state: &AppState, engine: &InsightEngine) {
    let Some(table) = session_table(state) else {
        return;
    };
    let (view, report) = dashboard::build(&table, &state.filters, engine);
    print_dashboard(&report, &view);
}

fn read_scenario() -> Option<Scenario> {
    println!("[1] Uniform cost change");
    println!("[2] Reallocate hours between project types");
    match read_choice().as_str() {
        "1" => {
            let delta_pct = prompt("Cost change %: ").parse::<f64>().ok()?;
            Some(Scenario::Cost { delta_pct })
        }
        "2" => {
            let source_type = prompt("From project type: ");
            let target_type = prompt("To project type: ");
            let pct = prompt("Share of hours to move %: ").parse::<f64>().ok()?;
            Some(Scenario::Reallocate {
                source_type,
                target_type,
                pct,
            })
        }
        _ => None,
    }
}

fn handle_scenario(state: &AppState) {
    let Some(table) = session_table(state) else {
        return;
    };
    let Some(scenario) = read_scenario() else {
        println!("Invalid scenario input.\n");
        return;
    };
    let view = dashboard::derived_view(&table, &state.filters);
    let outcome = simulate(&view, &scenario);
    if !outcome.success {
        let reason = outcome
            .infeasible
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unknown reason".to_string());
        println!("Scenario not applied: {}. Baseline unchanged.\n", reason);
        return;
    }
    let comparison = ScenarioComparison::new(&view, &outcome.table);
    output::preview_table("Scenario vs Baseline", None, &comparison.rows(), 10);
    println!("{}\n", comparison.headline());
}

fn handle_export(state: &AppState, engine: &InsightEngine) {
    let Some(table) = session_table(state) else {
        return;
    };
    let (view, report) = dashboard::build(&table, &state.filters, engine);
    let dir = Path::new(&state.config.export_dir);
    match output::export_all(dir, &view, &report) {
        Ok(files) => {
            for f in files {
                println!("Wrote {}", f.display());
            }
            println!();
        }
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli)?;
    let engine = InsightEngine::with_overload_threshold(config.overload_hours);
    log::info!("starting with data path {}", config.data_path);
    log::debug!("insight rules: {:?}", engine.rule_ids());

    {
        let mut state = APP_STATE
            .lock()
            .map_err(|_| anyhow::anyhow!("session state poisoned"))?;
        state.cache = RawTableCache::new(config.cache_ttl());
        log::debug!("raw table cache ttl {:?}", state.cache.ttl());
        state.config = config;
    }

    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] Generate synthetic data");
        println!("[3] Set filters");
        println!("[4] Show dashboard");
        println!("[5] Run a scenario");
        println!("[6] Export reports");
        println!("[0] Exit\n");

        let choice = read_choice();
        let mut state = APP_STATE
            .lock()
            .map_err(|_| anyhow::anyhow!("session state poisoned"))?;
        match choice.as_str() {
            "1" => handle_load(&mut state),
            "2" => handle_generate(&mut state),
            "3" => handle_filters(&mut state),
            "4" => handle_dashboard(&state, &engine),
            "5" => handle_scenario(&state),
            "6" => handle_export(&state, &engine),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-6.\n"),
        }
    }
    Ok(())
}
