//! Centralized album-artist decision. The album handler decides once, writes
//! here, and every child-track handler reads from this cache so siblings
//! never disagree about which artist folder they land under (P5).

use std::collections::HashMap;
use std::sync::RwLock;

pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// Monotonic-once-set mapping `album_catalog_id -> artist_name`.
#[derive(Default)]
pub struct AlbumArtistCache {
    inner: RwLock<HashMap<String, String>>,
}

impl AlbumArtistCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, album_catalog_id: &str) -> Option<String> {
        self.inner.read().unwrap().get(album_catalog_id).cloned()
    }

    /// Set the album-artist if not already set. Subsequent calls with a
    /// different value are ignored: the album handler is the single writer
    /// and runs before fan-out, so the first write wins.
    pub fn set_if_absent(&self, album_catalog_id: &str, artist_name: &str) -> String {
        let mut map = self.inner.write().unwrap();
        map.entry(album_catalog_id.to_string())
            .or_insert_with(|| artist_name.to_string())
            .clone()
    }

    /// Resolve the artist for a child track, falling back to `catalog_fallback`
    /// (the catalog's own reported album-artist) if the cache hasn't been
    /// populated yet — the rare crash-recovery path where a child runs before
    /// its album handler.
    pub fn resolve_or(&self, album_catalog_id: &str, catalog_fallback: &str) -> String {
        self.get(album_catalog_id)
            .unwrap_or_else(|| catalog_fallback.to_string())
    }
}

/// Decide whether an album should be routed under "Various Artists": either
/// an explicit compilation record type, or a soundtrack-like title with more
/// than one contributor.
pub fn is_various_artists(
    record_type: &str,
    title: &str,
    contributor_count: usize,
) -> bool {
    if record_type.eq_ignore_ascii_case("compilation") {
        return true;
    }
    let lower = title.to_ascii_lowercase();
    let soundtrack_like = lower.contains("soundtrack") || lower.contains("original motion picture");
    soundtrack_like && contributor_count > 1
}
