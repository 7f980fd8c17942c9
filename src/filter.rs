// Row selection by consultant, client, project type, month and year.
//
// Predicates are ANDed across dimensions and matched by membership within a
// dimension. `ALL` on any dimension disables that predicate. Filtering only
// ever returns a subset of its input rows, in input order.

use crate::error::{Error, Result};
use crate::types::{DerivedRecord, Record};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const ALL: &str = "ALL";

/// Either every value of a dimension or an explicit set of allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection<T: Ord> {
    All,
    Only(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Ord> Selection<T> {
    pub fn only<I: IntoIterator<Item = T>>(values: I) -> Self {
        Selection::Only(values.into_iter().collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }
}

impl Selection<String> {
    /// Parse `ALL` or a comma-separated list of names.
    pub fn parse_list(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            return Selection::All;
        }
        Selection::only(
            trimmed
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        )
    }
}

impl fmt::Display for Selection<String> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{}", ALL),
            Selection::Only(set) => {
                let names: Vec<&str> = set.iter().map(|s| s.as_str()).collect();
                write!(f, "{}", names.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub consultants: Selection<String>,
    pub clients: Selection<String>,
    pub project_types: Selection<String>,
    /// `None` is ALL.
    pub month: Option<u32>,
    /// `None` is ALL.
    pub year: Option<i32>,
}

impl FilterSpec {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_all(&self) -> bool {
        self.consultants.is_all()
            && self.clients.is_all()
            && self.project_types.is_all()
            && self.month.is_none()
            && self.year.is_none()
    }

    pub fn matches<T: Filterable>(&self, row: &T) -> bool {
        let (year, month) = row.period();
        self.consultants.matches(&row.consultant().to_string())
            && self.clients.matches(&row.client().to_string())
            && self.project_types.matches(&row.project_type().to_string())
            && self.month.map_or(true, |m| m == month)
            && self.year.map_or(true, |y| y == year)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = self.month.map_or(ALL.to_string(), |m| m.to_string());
        let year = self.year.map_or(ALL.to_string(), |y| y.to_string());
        write!(
            f,
            "consultants={} | clients={} | types={} | month={} | year={}",
            self.consultants, self.clients, self.project_types, month, year
        )
    }
}

/// Parse `ALL` or a month number 1-12.
pub fn parse_month(input: &str) -> Result<Option<u32>> {
    let s = input.trim();
    if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
        return Ok(None);
    }
    match s.parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(Some(m)),
        _ => Err(Error::Config(format!("month must be 1-12 or ALL, got '{}'", s))),
    }
}

/// Parse `ALL` or a four-digit year.
pub fn parse_year(input: &str) -> Result<Option<i32>> {
    let s = input.trim();
    if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
        return Ok(None);
    }
    match s.parse::<i32>() {
        Ok(y) if (1000..=9999).contains(&y) => Ok(Some(y)),
        _ => Err(Error::Config(format!("year must be 4 digits or ALL, got '{}'", s))),
    }
}

/// Rows the filter engine can select on. Period is (year, month) of the
/// actual end date.
pub trait Filterable {
    fn consultant(&self) -> &str;
    fn client(&self) -> &str;
    fn project_type(&self) -> &str;
    fn period(&self) -> (i32, u32);
}

impl Filterable for Record {
    fn consultant(&self) -> &str {
        &self.consultant
    }
    fn client(&self) -> &str {
        &self.client
    }
    fn project_type(&self) -> &str {
        &self.project_type
    }
    fn period(&self) -> (i32, u32) {
        (self.actual_end_date.year(), self.actual_end_date.month())
    }
}

impl Filterable for DerivedRecord {
    fn consultant(&self) -> &str {
        &self.consultant
    }
    fn client(&self) -> &str {
        &self.client
    }
    fn project_type(&self) -> &str {
        &self.project_type
    }
    fn period(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

/// Fresh filtered view of `rows`.
pub fn apply_filters<T: Filterable + Clone>(rows: &[T], spec: &FilterSpec) -> Vec<T> {
    if spec.is_all() {
        return rows.to_vec();
    }
    let view: Vec<T> = rows.iter().filter(|r| spec.matches(*r)).cloned().collect();
    log::debug!("filter [{}] kept {} of {} rows", spec, view.len(), rows.len());
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, with_delay};
    use crate::metrics::derive;

    fn table() -> Vec<DerivedRecord> {
        derive(&[
            record("Ana", "Acme", "Audit", 10.0, 100.0, 60.0),
            record("Bo", "Globex", "Strategy", 10.0, 100.0, 60.0),
            with_delay(record("Ana", "Globex", "Audit", 10.0, 100.0, 60.0), 10),
        ])
    }

    #[test]
    fn all_sentinel_returns_table_unchanged() {
        let t = table();
        assert_eq!(apply_filters(&t, &FilterSpec::all()), t);
    }

    #[test]
    fn dimensions_and_together_values_or_within() {
        let t = table();
        let spec = FilterSpec {
            consultants: Selection::only(["Ana".to_string()]),
            clients: Selection::only(["Acme".to_string(), "Globex".to_string()]),
            month: Some(4),
            ..FilterSpec::default()
        };
        let view = apply_filters(&t, &spec);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].client, "Globex");
        assert_eq!(view[0].month, 4);
    }

    #[test]
    fn filtering_is_idempotent() {
        let t = table();
        let spec = FilterSpec {
            project_types: Selection::parse_list("Audit"),
            year: Some(2024),
            ..FilterSpec::default()
        };
        let once = apply_filters(&t, &spec);
        let twice = apply_filters(&once, &spec);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn no_match_is_an_empty_view() {
        let spec = FilterSpec {
            year: Some(1999),
            ..FilterSpec::default()
        };
        assert!(apply_filters(&table(), &spec).is_empty());
    }

    #[test]
    fn parses_sentinels_and_lists() {
        assert_eq!(Selection::parse_list("all"), Selection::All);
        assert_eq!(
            Selection::parse_list("Acme, Globex"),
            Selection::only(["Acme".to_string(), "Globex".to_string()])
        );
        assert_eq!(parse_month("ALL").unwrap(), None);
        assert_eq!(parse_month("3").unwrap(), Some(3));
        assert!(parse_month("13").is_err());
        assert_eq!(parse_year("2024").unwrap(), Some(2024));
        assert!(parse_year("24").is_err());
    }
}
