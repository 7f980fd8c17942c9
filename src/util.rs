// Parsing, small statistics and display formatting shared by the loader,
// the analysis modules and the console output.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Numeric cell as `f64`. Thousands separators are accepted; letters,
/// blanks and non-finite values are not.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Spreadsheet exports often write integers as "30.0".
    s.parse::<i64>()
        .ok()
        .or_else(|| parse_f64_safe(Some(s)).filter(|v| v.fract() == 0.0).map(|v| v as i64))
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `true` when the cell is missing or only whitespace.
pub fn is_blank(s: Option<&str>) -> bool {
    s.map(|v| v.trim().is_empty()).unwrap_or(true)
}

pub fn days_diff(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64
}

/// `value` limited to `[lo, hi]`; NaN collapses to `lo`.
pub fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Ratio with a policy value for a non-positive denominator.
pub fn ratio_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        fallback
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn mean_by<T>(items: &[T], f: impl Fn(&T) -> f64) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().map(f).sum::<f64>() / items.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234,567.89`).
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    // Values that round to zero print unsigned.
    let neg = n < 0.0 && s.chars().any(|c| matches!(c, '1'..='9'));
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_currency(n: f64) -> String {
    let cents = (n * 100.0).round() / 100.0;
    if cents < 0.0 {
        format!("-${}", format_number(cents.abs(), 2))
    } else {
        format!("${}", format_number(cents.abs(), 2))
    }
}

pub fn format_percent(n: f64) -> String {
    format!("{}%", format_number(n, 1))
}

/// Display formatting driven by the column name: `Total`/`Revenue` columns
/// are currency, `Margin` columns are percentages, anything else is a plain
/// two-decimal number.
pub fn format_for_column(column: &str, value: f64) -> String {
    if column.contains("Total") || column.contains("Revenue") {
        format_currency(value)
    } else if column.contains("Margin") {
        format_percent(value)
    } else {
        format_number(value, 2)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
