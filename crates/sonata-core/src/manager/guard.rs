//! Per-artist-image mutual exclusion (§4.4.2 step 10): the same shape as the
//! broader retrieval pack's RAII connection-budget guards (acquire, hold,
//! release on drop) but guarding "one artist-image fetch in flight" instead
//! of a connection count.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ArtistImageGuard {
    set: Arc<Mutex<HashSet<String>>>,
    artist_id: String,
}

impl Drop for ArtistImageGuard {
    fn drop(&mut self) {
        let set = Arc::clone(&self.set);
        let artist_id = self.artist_id.clone();
        tokio::spawn(async move {
            set.lock().await.remove(&artist_id);
        });
    }
}

/// Try to acquire the fetch slot for `artist_id`. Returns `None` if another
/// task already holds it -- the caller should skip the fetch rather than
/// wait, since another in-flight sibling will produce the same file.
pub async fn try_acquire(set: &Arc<Mutex<HashSet<String>>>, artist_id: &str) -> Option<ArtistImageGuard> {
    let mut guarded = set.lock().await;
    if guarded.contains(artist_id) {
        return None;
    }
    guarded.insert(artist_id.to_string());
    Some(ArtistImageGuard {
        set: Arc::clone(set),
        artist_id: artist_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_concurrent_acquire_is_rejected() {
        let set: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let first = try_acquire(&set, "artist_1").await;
        assert!(first.is_some());
        let second = try_acquire(&set, "artist_1").await;
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn releasing_the_guard_allows_a_new_acquire() {
        let set: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        {
            let _guard = try_acquire(&set, "artist_1").await.unwrap();
        }
        // Drop schedules an async removal task; yield until it runs.
        for _ in 0..50 {
            tokio::task::yield_now().await;
            if !set.lock().await.contains("artist_1") {
                break;
            }
        }
        assert!(try_acquire(&set, "artist_1").await.is_some());
    }
}
