//! Everything a dashboard front end needs for one render, computed from the
//! raw records and an explicit request instead of ambient UI state.

use crate::aggregate::aggregate;
use crate::filter::{filter_records, FilterConfig, FilterOptions};
use crate::rank::{leaderboard, DEFAULT_LEADERBOARD_SIZE};
use crate::score::{score, ScoreWeights};
use crate::types::{KpiRow, LeaderboardRow, Observation, VendorScore};
use crate::util::{
    average, format_currency, format_days, format_number, format_percent, round_to, safe_ratio,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub filters: FilterConfig,
    pub weights: ScoreWeights,
    pub leaderboard_size: usize,
    /// Vendors to draw on-time trends for. Empty means the first scored
    /// vendor.
    pub trend_vendors: Vec<String>,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        DashboardRequest {
            filters: FilterConfig::default(),
            weights: ScoreWeights::default(),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            trend_vendors: Vec::new(),
        }
    }
}

/// Headline metrics over the scored table. All zero for an empty table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct KpiStrip {
    pub on_time_rate: f64,
    pub quality_score: f64,
    pub total_spend: f64,
    pub compliance_rate: f64,
    pub avg_lead_time: f64,
}

impl KpiStrip {
    /// The on-time and quality means skip rows flagged `insufficient_data`,
    /// whose rates are sentinels. Everything else covers every vendor.
    pub fn from_scores(scores: &[VendorScore]) -> Self {
        let ranked: Vec<&VendorScore> = scores.iter().filter(|s| !s.insufficient_data).collect();
        let mean_of = |f: fn(&VendorScore) -> f64| {
            average(&ranked.iter().map(|s| f(s)).collect::<Vec<_>>())
        };
        KpiStrip {
            on_time_rate: mean_of(|s| s.on_time_rate),
            quality_score: mean_of(|s| s.quality_score),
            total_spend: scores.iter().map(|s| s.spend).sum(),
            compliance_rate: average(&scores.iter().map(|s| s.compliance_rate).collect::<Vec<_>>()),
            avg_lead_time: average(&scores.iter().map(|s| s.avg_lead_time).collect::<Vec<_>>()),
        }
    }

    pub fn rows(&self) -> Vec<KpiRow> {
        [
            ("On-Time Delivery Rate", format_percent(self.on_time_rate)),
            ("Quality Score", format_percent(self.quality_score)),
            ("Total Spend", format_currency(self.total_spend)),
            ("Compliance Rate", format_percent(self.compliance_rate)),
            ("Avg Lead Time", format_days(self.avg_lead_time)),
        ]
        .into_iter()
        .map(|(metric, value)| KpiRow {
            metric: metric.to_string(),
            value,
        })
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBar {
    pub vendor: String,
    pub overall_score: f64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendSlice {
    pub label: String,
    pub spend: f64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityPoint {
    pub vendor: String,
    pub avg_lead_time: f64,
    pub quality_score: f64,
    pub spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub on_time_deliveries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorTrend {
    pub vendor: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub score_by_vendor: Vec<ScoreBar>,
    pub spend_by_vendor: Vec<SpendSlice>,
    pub spend_by_region: Vec<SpendSlice>,
    pub quality_vs_lead_time: Vec<QualityPoint>,
    pub trends: Vec<VendorTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub options: FilterOptions,
    /// Observations left after filtering, in input order.
    pub records: Vec<Observation>,
    pub kpis: KpiStrip,
    pub scores: Vec<VendorScore>,
    pub charts: Charts,
    pub top: Vec<LeaderboardRow>,
    pub bottom: Vec<LeaderboardRow>,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Filter, aggregate, score and rank, then shape the result for display.
pub fn build_dashboard(records: &[Observation], request: &DashboardRequest) -> Dashboard {
    let filtered = filter_records(records, &request.filters);
    let summaries = aggregate(&filtered);
    let scores = score(&summaries, &request.weights);
    let board = leaderboard(&scores, request.leaderboard_size);

    let trend_vendors: Vec<&str> = if request.trend_vendors.is_empty() {
        scores.iter().take(1).map(|s| s.vendor.as_str()).collect()
    } else {
        request.trend_vendors.iter().map(String::as_str).collect()
    };

    let charts = Charts {
        score_by_vendor: scores
            .iter()
            .map(|s| ScoreBar {
                vendor: s.vendor.clone(),
                overall_score: s.overall_score,
                category: s.category.clone(),
            })
            .collect(),
        spend_by_vendor: spend_share(scores.iter().map(|s| (s.vendor.as_str(), s.spend))),
        spend_by_region: spend_share(
            scores
                .iter()
                .map(|s| (s.region.as_deref().unwrap_or("Unknown"), s.spend)),
        ),
        quality_vs_lead_time: scores
            .iter()
            .map(|s| QualityPoint {
                vendor: s.vendor.clone(),
                avg_lead_time: s.avg_lead_time,
                quality_score: s.quality_score,
                spend: s.spend,
            })
            .collect(),
        trends: trend_vendors
            .into_iter()
            .map(|v| vendor_trend(&filtered, v))
            .collect(),
    };

    Dashboard {
        options: FilterOptions::from_records(records),
        kpis: KpiStrip::from_scores(&scores),
        charts,
        top: board.top.iter().map(leaderboard_row).collect(),
        bottom: board.bottom.iter().map(leaderboard_row).collect(),
        scores,
        records: filtered,
    }
}

/// Sum spend per label (first-appearance order) with each label's share
/// of the total. Shares are zero when total spend is zero.
pub fn spend_share<'a>(items: impl Iterator<Item = (&'a str, f64)>) -> Vec<SpendSlice> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut slices: Vec<SpendSlice> = Vec::new();
    for (label, spend) in items {
        let i = *index.entry(label).or_insert_with(|| {
            slices.push(SpendSlice {
                label: label.to_string(),
                spend: 0.0,
                share: 0.0,
            });
            slices.len() - 1
        });
        slices[i].spend += spend;
    }
    let total: f64 = slices.iter().map(|s| s.spend).sum();
    for s in &mut slices {
        s.share = safe_ratio(s.spend, total).unwrap_or(0.0);
    }
    slices
}

/// On-time deliveries over time for one vendor, oldest first. Undated
/// observations cannot be plotted and are left out.
pub fn vendor_trend(records: &[Observation], vendor: &str) -> VendorTrend {
    let mut points: Vec<TrendPoint> = records
        .iter()
        .filter(|o| o.vendor == vendor)
        .filter_map(|o| {
            o.date.map(|date| TrendPoint {
                date,
                on_time_deliveries: o.on_time_deliveries,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    VendorTrend {
        vendor: vendor.to_string(),
        points,
    }
}

fn leaderboard_row(s: &VendorScore) -> LeaderboardRow {
    let r3 = |v: f64| format!("{:.3}", round_to(v, 3));
    LeaderboardRow {
        vendor: s.vendor.clone(),
        overall_score: r3(s.overall_score),
        on_time_rate: r3(s.on_time_rate),
        quality_score: r3(s.quality_score),
        compliance_rate: r3(s.compliance_rate),
        avg_lead_time: r3(s.avg_lead_time),
        spend: format_number(s.spend, 0),
    }
}
