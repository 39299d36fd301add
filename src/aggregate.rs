use crate::types::{Observation, VendorSummary};
use crate::util::average;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Group observations by vendor, in order of first appearance.
///
/// Counts and spend are summed; compliance and lead time are averaged over
/// the vendor's observations. Category and region come from the vendor's
/// first observation; disagreement in later rows sets `mixed_attributes`.
pub fn aggregate(records: &[Observation]) -> Vec<VendorSummary> {
    struct Acc {
        vendor: String,
        category: Option<String>,
        region: Option<String>,
        mixed: bool,
        on_time: u64,
        total: u64,
        defects: u64,
        units: u64,
        spend: f64,
        compliance: Vec<f64>,
        lead_times: Vec<f64>,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accs: Vec<Acc> = Vec::new();
    for r in records {
        let i = *index.entry(r.vendor.as_str()).or_insert_with(|| {
            accs.push(Acc {
                vendor: r.vendor.clone(),
                category: r.category.clone(),
                region: r.region.clone(),
                mixed: false,
                on_time: 0,
                total: 0,
                defects: 0,
                units: 0,
                spend: 0.0,
                compliance: vec![],
                lead_times: vec![],
            });
            accs.len() - 1
        });
        let e = &mut accs[i];
        if e.category != r.category || e.region != r.region {
            e.mixed = true;
        }
        e.on_time += u64::from(r.on_time_deliveries);
        e.total += u64::from(r.total_deliveries);
        e.defects += u64::from(r.defects);
        e.units += u64::from(r.total_units);
        e.spend += r.spend;
        e.compliance.push(if r.compliant { 1.0 } else { 0.0 });
        e.lead_times.push(r.lead_time);
    }

    let summaries: Vec<VendorSummary> = accs
        .into_iter()
        .map(|acc| {
            if acc.mixed {
                warn!(
                    vendor = %acc.vendor,
                    category = ?acc.category,
                    region = ?acc.region,
                    "Vendor has observations with differing category/region; keeping first observed"
                );
            }
            VendorSummary {
                compliance: average(&acc.compliance),
                lead_time: average(&acc.lead_times),
                vendor: acc.vendor,
                category: acc.category,
                region: acc.region,
                mixed_attributes: acc.mixed,
                on_time_deliveries: acc.on_time,
                total_deliveries: acc.total,
                defects: acc.defects,
                total_units: acc.units,
                spend: acc.spend,
            }
        })
        .collect();
    debug!(records = records.len(), vendors = summaries.len(), "Aggregated observations");
    summaries
}
