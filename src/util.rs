// Utility helpers for parsing, safe arithmetic and display formatting.
//
// Cell-level parsing lives here so the loader can assume clean, typed
// values, and every ratio in the scoring pipeline goes through
// `safe_ratio` so no NaN ever reaches a sort comparison.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Counts are non-negative integers, but spreadsheet exports often write
/// them as `12.0`; accept that form as long as there is no fraction.
pub fn parse_count_safe(s: Option<&str>) -> Option<u32> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

pub fn parse_flag_safe(s: Option<&str>) -> Option<bool> {
    let s = s?.trim();
    match s.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" | "y" => Some(true),
        "0" | "0.0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Plain `YYYY-MM-DD`, or a timestamp whose date part we keep.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Divide, or `None` when the denominator is zero or the result would not
/// be a finite number.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    let r = numerator / denominator;
    r.is_finite().then_some(r)
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice.
    safe_ratio(v.iter().copied().sum(), v.len() as f64).unwrap_or(0.0)
}

pub fn round_to(n: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (n * factor).round() / factor
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus `en` thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
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

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// `0.9333` -> `93.33%`
pub fn format_percent(ratio: f64) -> String {
    format!("{}%", format_number(ratio * 100.0, 2))
}

/// Whole-dollar amount with separators: `$1,234,567`.
pub fn format_currency(amount: f64) -> String {
    let s = format_number(amount, 0);
    match s.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", s),
    }
}

pub fn format_days(days: f64) -> String {
    format!("{:.2} days", days)
}
