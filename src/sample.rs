//! Seeded synthetic dataset for demos and tests.
//!
//! The generator owns its RNG, so the same seed always yields the same
//! observations regardless of anything else the process does.

use crate::types::Observation;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const DEFAULT_SEED: u64 = 42;
pub const VENDOR_COUNT: usize = 15;
pub const CATEGORIES: [&str; 3] = ["Raw Material", "Packaging", "Services"];
pub const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

const YEAR: i32 = 2023;
const MONTHS: std::ops::RangeInclusive<u32> = 1..=6;
const COMPLIANCE_PROBABILITY: f64 = 0.9;

/// Generate 15 vendors x 6 monthly observations.
///
/// Categories and regions are drawn for every vendor up front, then the
/// observations are drawn vendor by vendor, month by month.
pub fn generate_sample_data(seed: u64) -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(seed);

    let categories: Vec<&str> = (0..VENDOR_COUNT)
        .map(|_| *CATEGORIES.choose(&mut rng).unwrap_or(&CATEGORIES[0]))
        .collect();
    let regions: Vec<&str> = (0..VENDOR_COUNT)
        .map(|_| *REGIONS.choose(&mut rng).unwrap_or(&REGIONS[0]))
        .collect();

    let mut data = Vec::with_capacity(VENDOR_COUNT * MONTHS.clone().count());
    for i in 0..VENDOR_COUNT {
        for month in MONTHS {
            data.push(Observation {
                vendor: format!("Vendor {}", i + 1),
                category: Some(categories[i].to_string()),
                region: Some(regions[i].to_string()),
                date: NaiveDate::from_ymd_opt(YEAR, month, 1),
                on_time_deliveries: rng.gen_range(8..=14),
                total_deliveries: rng.gen_range(10..=15),
                defects: rng.gen_range(0..=2),
                total_units: rng.gen_range(100..=199),
                spend: rng.gen_range(10_000..=49_999) as f64,
                compliant: rng.gen_bool(COMPLIANCE_PROBABILITY),
                lead_time: rng.gen_range(2.0..10.0),
            });
        }
    }
    data
}
