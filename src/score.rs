use crate::types::{VendorScore, VendorSummary};
use crate::util::safe_ratio;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Weights of the composite score. Defaults sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub on_time: f64,
    pub quality: f64,
    pub compliance: f64,
    pub lead_time: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            on_time: 0.3,
            quality: 0.3,
            compliance: 0.2,
            lead_time: 0.2,
        }
    }
}

/// Score a whole filtered set at once.
///
/// The lead-time term is `1 - avg / max(avg)` over the rows passed in, so
/// scores are only comparable within one call. A zero maximum means every
/// vendor has zero lead time and they all get the full term.
///
/// Zero total deliveries or zero total units leave the affected rate at
/// `0.0`, the overall score at `0.0`, and flag the row `insufficient_data`.
pub fn score(summaries: &[VendorSummary], weights: &ScoreWeights) -> Vec<VendorScore> {
    let max_lead = summaries
        .iter()
        .map(|s| s.lead_time)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let scores: Vec<VendorScore> = summaries
        .iter()
        .map(|s| {
            let on_time = safe_ratio(s.on_time_deliveries as f64, s.total_deliveries as f64);
            let defect_rate = safe_ratio(s.defects as f64, s.total_units as f64);
            let quality = defect_rate.map(|r| 1.0 - r);
            let lead_term = 1.0 - safe_ratio(s.lead_time, max_lead).unwrap_or(0.0);
            let compliance = if s.compliance.is_finite() { s.compliance } else { 0.0 };

            let insufficient = on_time.is_none() || quality.is_none();
            let overall = match (on_time, quality) {
                (Some(ot), Some(q)) => {
                    ot * weights.on_time
                        + q * weights.quality
                        + compliance * weights.compliance
                        + lead_term * weights.lead_time
                }
                _ => {
                    warn!(
                        vendor = %s.vendor,
                        "Zero deliveries or units; vendor excluded from ranking"
                    );
                    0.0
                }
            };

            VendorScore {
                vendor: s.vendor.clone(),
                on_time_deliveries: s.on_time_deliveries,
                total_deliveries: s.total_deliveries,
                defects: s.defects,
                total_units: s.total_units,
                spend: s.spend,
                compliance: s.compliance,
                lead_time: s.lead_time,
                category: s.category.clone(),
                region: s.region.clone(),
                on_time_rate: on_time.unwrap_or(0.0),
                quality_score: quality.unwrap_or(0.0),
                compliance_rate: compliance,
                avg_lead_time: s.lead_time,
                overall_score: overall,
                insufficient_data: insufficient,
            }
        })
        .collect();
    debug!(vendors = scores.len(), max_lead, "Scored vendors");
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(
        vendor: &str,
        on_time: u64,
        total: u64,
        defects: u64,
        units: u64,
        compliance: f64,
        lead: f64,
    ) -> VendorSummary {
        VendorSummary {
            vendor: vendor.to_string(),
            category: None,
            region: None,
            mixed_attributes: false,
            on_time_deliveries: on_time,
            total_deliveries: total,
            defects,
            total_units: units,
            spend: 1000.0,
            compliance,
            lead_time: lead,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_set_scores_empty() {
        assert!(score(&[], &ScoreWeights::default()).is_empty());
    }

    #[test]
    fn test_rates_and_weighted_score() {
        let rows = vec![
            summary("V1", 10, 10, 0, 100, 1.0, 2.0),
            summary("V2", 5, 10, 5, 100, 0.0, 5.0),
            summary("V3", 8, 10, 2, 100, 1.0, 10.0),
        ];
        let out = score(&rows, &ScoreWeights::default());

        assert!(approx(out[0].on_time_rate, 1.0));
        assert!(approx(out[1].on_time_rate, 0.5));
        assert!(approx(out[2].on_time_rate, 0.8));
        assert!(approx(out[0].quality_score, 1.0));
        assert!(approx(out[1].quality_score, 0.95));
        assert!(approx(out[2].quality_score, 0.98));

        // V1: 0.3 + 0.3 + 0.2 + 0.2 * (1 - 2/10)
        assert!(approx(out[0].overall_score, 0.96));
        // V2: 0.15 + 0.285 + 0 + 0.2 * 0.5
        assert!(approx(out[1].overall_score, 0.535));
        // V3: 0.24 + 0.294 + 0.2 + 0
        assert!(approx(out[2].overall_score, 0.734));
        assert!(out.iter().all(|s| !s.insufficient_data));
    }

    #[test]
    fn test_zero_deliveries_yields_sentinel() {
        let out = score(&[summary("V", 0, 0, 1, 100, 1.0, 3.0)], &ScoreWeights::default());
        assert_eq!(out[0].on_time_rate, 0.0);
        assert_eq!(out[0].overall_score, 0.0);
        assert!(out[0].insufficient_data);
        assert!(out[0].quality_score.is_finite());
    }

    #[test]
    fn test_zero_units_yields_sentinel() {
        let out = score(&[summary("V", 5, 10, 0, 0, 1.0, 3.0)], &ScoreWeights::default());
        assert_eq!(out[0].quality_score, 0.0);
        assert!(out[0].insufficient_data);
    }

    #[test]
    fn test_zero_max_lead_time_gives_full_term() {
        let out = score(&[summary("V", 10, 10, 0, 100, 1.0, 0.0)], &ScoreWeights::default());
        assert!(approx(out[0].overall_score, 1.0));
        assert!(out[0].overall_score.is_finite());
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoreWeights {
            on_time: 1.0,
            quality: 0.0,
            compliance: 0.0,
            lead_time: 0.0,
        };
        let out = score(&[summary("V", 7, 10, 0, 100, 1.0, 1.0)], &weights);
        assert!(approx(out[0].overall_score, 0.7));
    }
}
