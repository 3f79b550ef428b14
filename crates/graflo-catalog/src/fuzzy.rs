//! Fuzzy name matcher (C3): ranks candidate vertex names against a table-name or
//! column-name fragment. Stateless save for an optional per-builder cache — no global or
//! process-wide cache is ever used (Design Notes, "Global state").

use std::cell::RefCell;
use std::collections::HashMap;

/// A candidate name and the score it matched at.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub name: String,
    pub score: f64,
}

/// Matches a fragment against a fixed candidate list. The cache is keyed by
/// `(fragment, threshold)` since the same matcher is used at both the 0.6 inference
/// threshold and the 0.8 resource-mapping threshold (spec §4.3, Open Question #3).
pub struct FuzzyMatcher {
    candidates: Vec<String>,
    cache: RefCell<HashMap<(String, u32), Option<FuzzyMatch>>>,
}

impl FuzzyMatcher {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Default threshold for edge/vertex name inference (spec §4.3).
    pub const INFERENCE_THRESHOLD: f64 = 0.6;
    /// Default threshold for resource-mapping lookups (spec §4.3).
    pub const RESOURCE_MAPPING_THRESHOLD: f64 = 0.8;

    pub fn best_match(&self, fragment: &str, threshold: f64) -> Option<FuzzyMatch> {
        let cache_key = (fragment.to_string(), (threshold * 1000.0).round() as u32);
        if let Some(cached) = self.cache.borrow().get(&cache_key) {
            return cached.clone();
        }
        let result = self.compute_best_match(fragment, threshold);
        self.cache.borrow_mut().insert(cache_key, result.clone());
        result
    }

    fn compute_best_match(&self, fragment: &str, threshold: f64) -> Option<FuzzyMatch> {
        let fragment_lower = fragment.to_lowercase();

        // (1) case-insensitive exact match wins outright.
        if let Some(exact) = self
            .candidates
            .iter()
            .find(|c| c.to_lowercase() == fragment_lower)
        {
            return Some(FuzzyMatch {
                name: exact.clone(),
                score: 1.0,
            });
        }

        let mut best: Option<FuzzyMatch> = None;
        for candidate in &self.candidates {
            let candidate_lower = candidate.to_lowercase();
            let containment = containment_ratio(&fragment_lower, &candidate_lower);
            let subsequence = ratcliff_obershelp_ratio(&fragment_lower, &candidate_lower);
            let score = containment.max(subsequence);
            let better = match &best {
                Some(current) => score > current.score,
                None => true,
            };
            if better {
                best = Some(FuzzyMatch {
                    name: candidate.clone(),
                    score,
                });
            }
        }

        best.filter(|m| m.score >= threshold)
    }
}

/// (2) Containment, either direction, scores `min(len)/max(len)`.
fn containment_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(b) || b.contains(a) {
        let (min_len, max_len) = if a.len() < b.len() {
            (a.len(), b.len())
        } else {
            (b.len(), a.len())
        };
        min_len as f64 / max_len as f64
    } else {
        0.0
    }
}

/// (3) Ratcliff/Obershelp subsequence ratio, matching the algorithm behind Python's
/// `difflib.SequenceMatcher.ratio()`: recursively find the longest common substring, then
/// recurse on the unmatched left and right remainders, and score `2*M / (len(a)+len(b))`.
fn ratcliff_obershelp_ratio(a: &str, b: &str) -> f64 {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_characters(a, b);
    2.0 * matched as f64 / total as f64
}

fn matching_characters(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (start_a, start_b, len) = longest_common_substring(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_characters(&a[..start_a], &b[..start_b])
        + matching_characters(&a[start_a + len..], &b[start_b + len..])
}

fn longest_common_substring(a: &[u8], b: &[u8]) -> (usize, usize, usize) {
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    let mut best = (0, 0, 0);
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
                if dp[i][j] > best.2 {
                    best = (i - dp[i][j], j - dp[i][j], dp[i][j]);
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins_regardless_of_case() {
        let m = FuzzyMatcher::new(vec!["Users".to_string(), "Products".to_string()]);
        let hit = m.best_match("users", 0.6).unwrap();
        assert_eq!(hit.name, "Users");
        assert_eq!(hit.score, 1.0);
    }

    #[test]
    fn containment_scores_above_threshold() {
        let m = FuzzyMatcher::new(vec!["user".to_string()]);
        let hit = m.best_match("users", 0.6).unwrap();
        assert_eq!(hit.name, "user");
        assert!(hit.score >= 0.6);
    }

    #[test]
    fn below_threshold_returns_none() {
        let m = FuzzyMatcher::new(vec!["product".to_string()]);
        assert!(m.best_match("zzz", 0.6).is_none());
    }

    #[test]
    fn cache_returns_consistent_results() {
        let m = FuzzyMatcher::new(vec!["order".to_string()]);
        let first = m.best_match("orders", 0.6);
        let second = m.best_match("orders", 0.6);
        assert_eq!(first, second);
    }
}
