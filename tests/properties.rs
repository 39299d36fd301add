use chrono::NaiveDate;
use proptest::prelude::*;
use proptest::test_runner::Config;
use vendor_kpi::aggregate::aggregate;
use vendor_kpi::filter::{filter_records, DateRange, FilterConfig, Selection};
use vendor_kpi::output::{scores_from_csv, scores_to_csv};
use vendor_kpi::rank::leaderboard;
use vendor_kpi::score::{score, ScoreWeights};
use vendor_kpi::types::Observation;

const CATEGORIES: [&str; 3] = ["Raw Material", "Packaging", "Services"];
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

/// Observations that respect on-time <= total and defects <= units.
fn observation() -> impl Strategy<Value = Observation> {
    (
        0usize..8,
        0usize..3,
        0usize..4,
        1u32..=6,
        0u32..20,
        0u32..200,
        0.0f64..50_000.0,
        any::<bool>(),
        0.0f64..15.0,
    )
        .prop_flat_map(|(v, c, r, month, total, units, spend, compliant, lead)| {
            (0..=total, 0..=units).prop_map(move |(on_time, defects)| Observation {
                vendor: format!("V{}", v),
                category: Some(CATEGORIES[c].to_string()),
                region: Some(REGIONS[r].to_string()),
                date: NaiveDate::from_ymd_opt(2023, month, 1),
                on_time_deliveries: on_time,
                total_deliveries: total,
                defects,
                total_units: units,
                spend: spend.round(),
                compliant,
                lead_time: lead,
            })
        })
}

fn filter_config() -> impl Strategy<Value = FilterConfig> {
    (1u32..=6, 1u32..=6, 0usize..4, 0usize..5).prop_map(|(a, b, c, r)| FilterConfig {
        date_range: Some(DateRange::new(
            NaiveDate::from_ymd_opt(2023, a.min(b), 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, a.max(b), 1).unwrap(),
        )),
        category: CATEGORIES.get(c).map_or(Selection::All, |s| Selection::Only(s.to_string())),
        region: REGIONS.get(r).map_or(Selection::All, |s| Selection::Only(s.to_string())),
    })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn derived_rates_stay_in_unit_interval(records in prop::collection::vec(observation(), 1..60)) {
        for s in score(&aggregate(&records), &ScoreWeights::default()) {
            prop_assert!((0.0..=1.0).contains(&s.on_time_rate));
            prop_assert!((0.0..=1.0).contains(&s.quality_score));
            prop_assert!((0.0..=1.0).contains(&s.compliance_rate));
            prop_assert!(s.overall_score.is_finite());
        }
    }

    #[test]
    fn aggregation_ignores_row_order(
        (records, shuffled) in prop::collection::vec(observation(), 0..60)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    ) {
        let mut a = aggregate(&records);
        let mut b = aggregate(&shuffled);
        a.sort_by(|x, y| x.vendor.cmp(&y.vendor));
        b.sort_by(|x, y| x.vendor.cmp(&y.vendor));
        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            prop_assert_eq!(&x.vendor, &y.vendor);
            prop_assert_eq!(x.on_time_deliveries, y.on_time_deliveries);
            prop_assert_eq!(x.total_deliveries, y.total_deliveries);
            prop_assert_eq!(x.defects, y.defects);
            prop_assert_eq!(x.total_units, y.total_units);
            prop_assert_eq!(x.spend, y.spend);
            prop_assert!((x.compliance - y.compliance).abs() < 1e-9);
            prop_assert!((x.lead_time - y.lead_time).abs() < 1e-9);
        }
    }

    #[test]
    fn filtering_is_idempotent(
        records in prop::collection::vec(observation(), 0..60),
        cfg in filter_config(),
    ) {
        let once = filter_records(&records, &cfg);
        let twice = filter_records(&once, &cfg);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn leaderboard_halves_are_disjoint(
        records in prop::collection::vec(observation(), 0..60),
        n in 1usize..5,
    ) {
        let scores = score(&aggregate(&records), &ScoreWeights::default());
        let ranked = scores.iter().filter(|s| !s.insufficient_data).count();
        let board = leaderboard(&scores, n);

        prop_assert_eq!(board.top.len(), n.min(ranked));
        prop_assert_eq!(board.bottom.len(), n.min(ranked));

        let mut union: Vec<&str> = board
            .top
            .iter()
            .chain(board.bottom.iter())
            .map(|s| s.vendor.as_str())
            .collect();
        union.sort_unstable();
        union.dedup();
        prop_assert_eq!(union.len(), (2 * n).min(ranked));
        if ranked >= 2 * n {
            let disjoint = board
                .top
                .iter()
                .all(|t| board.bottom.iter().all(|b| b.vendor != t.vendor));
            prop_assert!(disjoint);
        }
    }

    #[test]
    fn csv_export_roundtrips(records in prop::collection::vec(observation(), 0..40)) {
        let scores = score(&aggregate(&records), &ScoreWeights::default());
        let parsed = scores_from_csv(&scores_to_csv(&scores).unwrap()).unwrap();
        prop_assert_eq!(parsed.len(), scores.len());
        for (a, b) in parsed.iter().zip(&scores) {
            prop_assert_eq!(&a.vendor, &b.vendor);
            prop_assert_eq!(a.insufficient_data, b.insufficient_data);
            prop_assert!((a.overall_score - b.overall_score).abs() < 1e-9);
            prop_assert!((a.on_time_rate - b.on_time_rate).abs() < 1e-9);
            prop_assert!((a.spend - b.spend).abs() < 1e-9);
        }
    }
}
