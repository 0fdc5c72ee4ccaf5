//! Multi-disc detection: a process-wide, upgrade-only cache of `{is_multi_disc,
//! total_discs}` per album catalog id, plus the sampling heuristic used to
//! probe a handful of tracks when the aggregate's own metadata doesn't settle it.

use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscInfo {
    pub is_multi_disc: bool,
    pub total_discs: u32,
}

impl DiscInfo {
    fn single() -> Self {
        Self {
            is_multi_disc: false,
            total_discs: 1,
        }
    }
}

/// Upgrade-only cache: once an album is classified multi-disc it never
/// reverts, and `total_discs` only ever grows (P4).
#[derive(Default)]
pub struct DiscCache {
    inner: RwLock<HashMap<String, DiscInfo>>,
}

impl DiscCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, album_catalog_id: &str) -> Option<DiscInfo> {
        self.inner.read().unwrap().get(album_catalog_id).copied()
    }

    /// Merge an observation into the cached entry, upgrading only: disc count
    /// moves up to `max(existing, observed)`, and single-disc never
    /// overwrites a previously-recorded multi-disc classification.
    pub fn observe(&self, album_catalog_id: &str, observed_discs: u32) -> DiscInfo {
        let mut map = self.inner.write().unwrap();
        let entry = map
            .entry(album_catalog_id.to_string())
            .or_insert_with(DiscInfo::single);
        let merged_discs = entry.total_discs.max(observed_discs.max(1));
        let merged_multi = entry.is_multi_disc || merged_discs > 1;
        *entry = DiscInfo {
            is_multi_disc: merged_multi,
            total_discs: merged_discs,
        };
        *entry
    }
}

/// Sample positions to probe in an aggregate of `total` tracks (0-based
/// indices) when disc metadata must be inferred from individual tracks:
/// first, last, middle, and quarter points for larger aggregates. This is a
/// heuristic, not an exhaustive scan — callers may probe every track instead
/// when `total` is small.
pub fn sample_positions(total: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    if total <= 6 {
        return (0..total).collect();
    }

    let mut positions = vec![0, total - 1, total / 2];
    positions.push(total / 4);
    positions.push((3 * total) / 4);
    positions.sort_unstable();
    positions.dedup();
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_observation_stays_single_disc() {
        let cache = DiscCache::new();
        let info = cache.observe("album_1", 1);
        assert!(!info.is_multi_disc);
        assert_eq!(info.total_discs, 1);
    }

    #[test]
    fn upgrade_to_multi_disc_is_sticky() {
        let cache = DiscCache::new();
        cache.observe("album_1", 1);
        let info = cache.observe("album_1", 2);
        assert!(info.is_multi_disc);
        assert_eq!(info.total_discs, 2);

        // A later single-disc-looking observation never reverts it (P4).
        let info2 = cache.observe("album_1", 1);
        assert!(info2.is_multi_disc);
        assert_eq!(info2.total_discs, 2);
    }

    #[test]
    fn total_discs_is_non_decreasing() {
        let cache = DiscCache::new();
        cache.observe("album_1", 2);
        cache.observe("album_1", 5);
        let info = cache.observe("album_1", 3);
        assert_eq!(info.total_discs, 5);
    }

    #[test]
    fn sample_positions_small_aggregate_probes_all() {
        assert_eq!(sample_positions(3), vec![0, 1, 2]);
    }

    #[test]
    fn sample_positions_large_aggregate_includes_first_last_middle_quarters() {
        let positions = sample_positions(13);
        assert!(positions.contains(&0));
        assert!(positions.contains(&12));
        assert!(positions.len() < 13);
    }

    #[test]
    fn sample_positions_empty() {
        assert!(sample_positions(0).is_empty());
    }
}
