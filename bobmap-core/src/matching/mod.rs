//! Taste compatibility scoring and candidate ranking.

mod cache;

pub use cache::MatchCache;

use chrono::Utc;

use crate::models::{Category, RankedMatch, TasteVector, UserProfile, MAX_AFFINITY};

/// Compatibility percentage between two taste vectors.
///
/// Inverse-normalized Euclidean distance over the active categories (those
/// either side rates above zero), scaled to 0..=100. Categories neither user
/// cares about do not dilute the distance. Symmetric and deterministic:
/// identical vectors score 100, maximally divergent ones score 0.
pub fn score(a: &TasteVector, b: &TasteVector) -> u8 {
    let mut sum_sq = 0.0f64;
    let mut active = 0u32;
    for category in Category::ALL {
        let (va, vb) = (a.get(category), b.get(category));
        if va == 0 && vb == 0 {
            continue;
        }
        active += 1;
        let d = f64::from(va) - f64::from(vb);
        sum_sq += d * d;
    }
    if active == 0 {
        // Two blank vectors are indistinguishable.
        return 100;
    }
    let max_sq = f64::from(active) * f64::from(MAX_AFFINITY).powi(2);
    let distance = (sum_sq / max_sq).sqrt();
    ((1.0 - distance) * 100.0).round() as u8
}

/// Rank `candidates` by compatibility with `target`, best first.
///
/// Equal percentages break by user id ascending so output is reproducible.
/// The target itself is skipped if present among the candidates. An empty
/// candidate list produces an empty ranking.
pub fn rank(target: &UserProfile, candidates: &[UserProfile]) -> Vec<RankedMatch> {
    let computed_at = Utc::now();
    let mut ranking: Vec<RankedMatch> = candidates
        .iter()
        .filter(|c| c.id != target.id)
        .map(|c| RankedMatch {
            user_id: c.id,
            username: c.username.clone(),
            percentage: score(&target.taste, &c.taste),
            computed_at,
        })
        .collect();
    ranking.sort_by(|x, y| {
        y.percentage
            .cmp(&x.percentage)
            .then(x.user_id.cmp(&y.user_id))
    });
    ranking
}
