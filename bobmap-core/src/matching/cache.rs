use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{RankedMatch, UserProfile};

/// Memoized pairwise match percentages.
///
/// Keys are normalized `(min id, max id)` pairs so symmetry is structural:
/// one entry serves both directions. Each entry is stamped with the taste
/// vector versions it was computed from and is recomputed as soon as either
/// version moves.
#[derive(Debug, Default)]
pub struct MatchCache {
    entries: HashMap<(Uuid, Uuid), CachedScore>,
}

#[derive(Debug, Clone, Copy)]
struct CachedScore {
    percentage: u8,
    versions: (u64, u64),
    computed_at: DateTime<Utc>,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage for the pair, served from cache while both vectors are
    /// unchanged.
    pub fn score(&mut self, a: &UserProfile, b: &UserProfile) -> u8 {
        let key = pair_key(a.id, b.id);
        let versions = if a.id <= b.id {
            (a.taste.version(), b.taste.version())
        } else {
            (b.taste.version(), a.taste.version())
        };

        if let Some(hit) = self.entries.get(&key) {
            if hit.versions == versions {
                return hit.percentage;
            }
        }

        let percentage = super::score(&a.taste, &b.taste);
        self.entries.insert(
            key,
            CachedScore {
                percentage,
                versions,
                computed_at: Utc::now(),
            },
        );
        percentage
    }

    /// Rank candidates against `target` through the cache.
    pub fn rank(&mut self, target: &UserProfile, candidates: &[UserProfile]) -> Vec<RankedMatch> {
        let computed_at = Utc::now();
        let mut ranking: Vec<RankedMatch> = candidates
            .iter()
            .filter(|c| c.id != target.id)
            .map(|c| RankedMatch {
                user_id: c.id,
                username: c.username.clone(),
                percentage: self.score(target, c),
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

    /// Drop every cached pair involving `user_id`.
    pub fn invalidate_user(&mut self, user_id: Uuid) {
        self.entries
            .retain(|(a, b), _| *a != user_id && *b != user_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the cached entry for the pair was last computed, if any.
    pub fn computed_at(&self, a: Uuid, b: Uuid) -> Option<DateTime<Utc>> {
        self.entries.get(&pair_key(a, b)).map(|e| e.computed_at)
    }
}

fn pair_key(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn user(pairs: &[(Category, u8)]) -> UserProfile {
        let mut profile = UserProfile::new(Uuid::new_v4(), "u");
        profile.taste =
            crate::models::TasteVector::from_pairs(pairs.iter().copied()).unwrap();
        profile
    }

    #[test]
    fn caches_one_entry_per_pair() {
        let a = user(&[(Category::Spicy, 5)]);
        let b = user(&[(Category::Spicy, 3)]);
        let mut cache = MatchCache::new();

        let forward = cache.score(&a, &b);
        let backward = cache.score(&b, &a);
        assert_eq!(forward, backward);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn version_bump_recomputes() {
        let mut a = user(&[(Category::Spicy, 5)]);
        let b = user(&[(Category::Spicy, 5)]);
        let mut cache = MatchCache::new();

        assert_eq!(cache.score(&a, &b), 100);

        a.taste.set(Category::Spicy, 0).unwrap();
        a.taste.set(Category::Sweet, 5).unwrap();
        let rescored = cache.score(&a, &b);
        assert!(rescored < 100, "stale cache entry served: {rescored}");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unchanged_versions_serve_cached_value() {
        let a = user(&[(Category::Exotic, 2)]);
        let b = user(&[(Category::Exotic, 4)]);
        let mut cache = MatchCache::new();

        let first = cache.score(&a, &b);
        let stamp = cache.computed_at(a.id, b.id).unwrap();
        let second = cache.score(&a, &b);
        assert_eq!(first, second);
        // Same entry, not a recompute.
        assert_eq!(cache.computed_at(a.id, b.id).unwrap(), stamp);
    }

    #[test]
    fn invalidate_user_drops_their_pairs() {
        let a = user(&[(Category::Budget, 1)]);
        let b = user(&[(Category::Budget, 2)]);
        let c = user(&[(Category::Budget, 3)]);
        let mut cache = MatchCache::new();

        cache.score(&a, &b);
        cache.score(&b, &c);
        cache.score(&a, &c);
        assert_eq!(cache.len(), 3);

        cache.invalidate_user(a.id);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn ranked_output_matches_uncached_rank() {
        let target = user(&[(Category::Spicy, 5), (Category::Sweet, 1)]);
        let candidates = vec![
            user(&[(Category::Spicy, 5), (Category::Sweet, 1)]),
            user(&[(Category::Sweet, 5)]),
            user(&[(Category::Spicy, 2)]),
        ];
        let mut cache = MatchCache::new();

        let cached = cache.rank(&target, &candidates);
        let direct = super::super::rank(&target, &candidates);
        let cached_pairs: Vec<_> = cached.iter().map(|m| (m.user_id, m.percentage)).collect();
        let direct_pairs: Vec<_> = direct.iter().map(|m| (m.user_id, m.percentage)).collect();
        assert_eq!(cached_pairs, direct_pairs);
    }
}
