use crate::types::VendorScore;
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub top: Vec<VendorScore>,
    pub bottom: Vec<VendorScore>,
}

/// Top `n` by overall score (descending) and bottom `n` (ascending).
///
/// Both lists are cut from one stable descending ranking. Among tied scores
/// `top` prefers earlier input rows, while `bottom` is the tail of that
/// ranking reversed and so prefers later input rows. The two never share a
/// vendor while at least `2n` vendors rank. Rows flagged
/// `insufficient_data` never rank. With fewer than `n` ranked vendors each
/// list holds all of them.
pub fn leaderboard(scores: &[VendorScore], n: usize) -> Leaderboard {
    let mut ranked: Vec<&VendorScore> = scores.iter().filter(|s| !s.insufficient_data).collect();
    ranked.sort_by(|a, b| cmp_score(b, a));

    Leaderboard {
        top: ranked.iter().take(n).map(|s| (*s).clone()).collect(),
        bottom: ranked.iter().rev().take(n).map(|s| (*s).clone()).collect(),
    }
}

fn cmp_score(a: &VendorScore, b: &VendorScore) -> Ordering {
    a.overall_score.total_cmp(&b.overall_score)
}
