// CSV/JSON writers and markdown console previews.
use crate::dashboard::DashboardReport;
use crate::error::Result;
use crate::reports::{group_summary, GroupBy};
use crate::types::DerivedRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Write the derived view, the grouped tables and the JSON summary into
/// `dir`. Returns the written paths in order.
pub fn export_all(dir: &Path, view: &[DerivedRecord], report: &DashboardReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let derived = dir.join("derived_records.csv");
    write_csv(&derived, view)?;
    written.push(derived);

    for by in [GroupBy::ProjectType, GroupBy::Consultant, GroupBy::Client] {
        let path = dir.join(format!("{}.csv", by.file_stem()));
        write_csv(&path, &group_summary(view, by))?;
        written.push(path);
    }

    let summary = dir.join("summary.json");
    write_json(&summary, report)?;
    written.push(summary);

    log::info!("exported {} files to {}", written.len(), dir.display());
    Ok(written)
}
