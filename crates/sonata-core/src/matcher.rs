//! Cross-catalog fuzzy matcher (§6): unlike the catalog/tag adapters, the
//! spec calls this out as "a pure function" with no I/O surface to keep out
//! of scope, so it gets a real, deterministic default implementation
//! (normalize, then weighted token-overlap + edit-distance title score)
//! instead of only a trait.

/// Lowercases, strips punctuation, and collapses whitespace -- the
/// normalization step applied to both sides of a match before scoring.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_space = false;
    for c in input.chars() {
        let lower = c.to_ascii_lowercase();
        if lower.is_alphanumeric() {
            out.push(lower);
            prev_space = false;
        } else if !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim().to_string()
}

/// A candidate to score a query against: a track title plus its artist name,
/// from the catalog being searched into.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub id: String,
    pub title: String,
    pub artist: String,
}

/// Weighted similarity in `[0.0, 1.0]` between a `(title, artist)` query and
/// a candidate: title carries more weight than artist, since artist-name
/// conventions (featuring credits, "The", romanization) vary more across
/// catalogs than track titles do.
const TITLE_WEIGHT: f64 = 0.7;
const ARTIST_WEIGHT: f64 = 0.3;

pub fn similarity(query_title: &str, query_artist: &str, candidate: &MatchCandidate) -> f64 {
    let title_score = token_and_edit_similarity(&normalize(query_title), &normalize(&candidate.title));
    let artist_score = token_and_edit_similarity(&normalize(query_artist), &normalize(&candidate.artist));
    TITLE_WEIGHT * title_score + ARTIST_WEIGHT * artist_score
}

/// Best-matching candidate for `(query_title, query_artist)` among
/// `candidates`, along with its score, or `None` if `candidates` is empty.
/// The cross-catalog playlist import (§9, open question) uses this to
/// resolve catalog-B track ids from catalog-A titles before a custom
/// playlist's `QueueItem.metadata` is populated.
pub fn best_match<'a>(
    query_title: &str,
    query_artist: &str,
    candidates: &'a [MatchCandidate],
) -> Option<(&'a MatchCandidate, f64)> {
    candidates
        .iter()
        .map(|c| (c, similarity(query_title, query_artist, c)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

/// Blends token (word-set) overlap with a normalized edit-distance score so
/// that both "same words, different order" and "typo in one word" score
/// reasonably, rather than falling off a cliff at the first mismatch.
fn token_and_edit_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let token_score = token_overlap(a, b);
    let edit_score = 1.0 - (levenshtein(a, b) as f64 / a.len().max(b.len()) as f64);
    0.5 * token_score + 0.5 * edit_score
}

fn token_overlap(a: &str, b: &str) -> f64 {
    let ta: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let tb: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    intersection as f64 / union as f64
}

/// Classic Levenshtein edit distance, O(len(a) * len(b)).
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];

    for i in 1..=n {
        curr[0] = i;
        for j in 1..=m {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Get Lucky (feat. Pharrell)!"), "get lucky feat pharrell");
    }

    #[test]
    fn normalize_collapses_repeated_whitespace() {
        assert_eq!(normalize("One   More    Time"), "one more time");
    }

    #[test]
    fn identical_titles_score_near_one() {
        let c = MatchCandidate {
            id: "x".into(),
            title: "Get Lucky".into(),
            artist: "Daft Punk".into(),
        };
        let score = similarity("Get Lucky", "Daft Punk", &c);
        assert!(score > 0.95, "expected near-perfect match, got {score}");
    }

    #[test]
    fn unrelated_titles_score_low() {
        let c = MatchCandidate {
            id: "x".into(),
            title: "Bohemian Rhapsody".into(),
            artist: "Queen".into(),
        };
        let score = similarity("Get Lucky", "Daft Punk", &c);
        assert!(score < 0.3, "expected low match, got {score}");
    }

    #[test]
    fn best_match_picks_the_highest_scoring_candidate() {
        let candidates = vec![
            MatchCandidate {
                id: "a".into(),
                title: "Bohemian Rhapsody".into(),
                artist: "Queen".into(),
            },
            MatchCandidate {
                id: "b".into(),
                title: "Get Lucky (Radio Edit)".into(),
                artist: "Daft Punk".into(),
            },
        ];
        let (best, score) = best_match("Get Lucky", "Daft Punk", &candidates).unwrap();
        assert_eq!(best.id, "b");
        assert!(score > 0.7);
    }

    #[test]
    fn best_match_on_empty_candidates_is_none() {
        assert!(best_match("Get Lucky", "Daft Punk", &[]).is_none());
    }

    #[test]
    fn levenshtein_matches_known_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
    }
}
