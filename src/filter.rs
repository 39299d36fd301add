//! Record filtering by date range, category and region.

use crate::types::Observation;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `"All"` (any case) or an empty string selects everything.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(s.to_string())
        }
    }

    /// Absent values always pass.
    fn admits(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (Selection::All, _) | (_, None) => true,
            (Selection::Only(want), Some(v)) => want == v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterConfig {
    pub date_range: Option<DateRange>,
    pub category: Selection,
    pub region: Selection,
}

impl FilterConfig {
    pub fn matches(&self, o: &Observation) -> bool {
        let in_range = match (self.date_range, o.date) {
            (Some(range), Some(date)) => range.contains(date),
            _ => true,
        };
        in_range
            && self.category.admits(o.category.as_deref())
            && self.region.admits(o.region.as_deref())
    }
}

/// Returns the matching subset as a new collection; `records` is untouched.
pub fn filter_records(records: &[Observation], config: &FilterConfig) -> Vec<Observation> {
    records.iter().filter(|o| config.matches(o)).cloned().collect()
}

/// Choices a filter UI would offer for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterOptions {
    pub date_bounds: Option<DateRange>,
    pub categories: Vec<String>,
    pub regions: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[Observation]) -> Self {
        let min = records.iter().filter_map(|o| o.date).min();
        let max = records.iter().filter_map(|o| o.date).max();
        let categories: BTreeSet<&str> =
            records.iter().filter_map(|o| o.category.as_deref()).collect();
        let regions: BTreeSet<&str> = records.iter().filter_map(|o| o.region.as_deref()).collect();
        FilterOptions {
            date_bounds: min.zip(max).map(|(s, e)| DateRange::new(s, e)),
            categories: categories.into_iter().map(str::to_string).collect(),
            regions: regions.into_iter().map(str::to_string).collect(),
        }
    }
}
