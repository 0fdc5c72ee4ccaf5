//! The catalog client capability surface (§6).
//!
//! Authentication, HTTP transport, token refresh, and rate limiting are the
//! adapter's concern and out of scope here (§1's non-goals) -- this trait is
//! the seam the manager programs against. `async_trait` is used for the same
//! reason the broader retrieval pack's catalog-sync traits need it: an async
//! fn in a trait object position.

use super::types::{Album, Artist, DownloadUrlInfo, Lyrics, Playlist, Track};
use crate::config::Quality;
use async_trait::async_trait;

/// Capability surface consumed by the download manager. A real
/// implementation owns HTTP, auth/token-refresh, and rate limiting; none of
/// that is this crate's concern.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn get_track(&self, id: &str) -> anyhow::Result<Track>;
    async fn get_album(&self, id: &str) -> anyhow::Result<Album>;
    async fn get_playlist(&self, id: &str) -> anyhow::Result<Playlist>;

    /// Resolve a download URL for `id` at `quality`. The adapter has already
    /// applied the quality fallback ladder (§9's open question: the actually
    /// delivered quality is reported back explicitly as `actual_quality`).
    async fn get_track_download_url(&self, id: &str, quality: Quality) -> anyhow::Result<DownloadUrlInfo>;

    async fn get_lyrics(&self, id: &str) -> anyhow::Result<Lyrics>;
    async fn get_artist(&self, id: &str) -> anyhow::Result<Artist>;
}

/// Placeholder adapter: every call fails with a clear message. Lets a binary
/// construct a [`crate::manager::DownloadManager`] (and exercise the queue,
/// pool, and path-building machinery) before a real HTTP-backed catalog
/// adapter is wired in, the same role [`crate::tagging::NullTagWriter`]
/// plays for tag writing.
pub struct UnimplementedCatalogClient;

#[async_trait]
impl CatalogClient for UnimplementedCatalogClient {
    async fn get_track(&self, id: &str) -> anyhow::Result<Track> {
        Err(anyhow::anyhow!("no catalog client configured: cannot fetch track {id}"))
    }
    async fn get_album(&self, id: &str) -> anyhow::Result<Album> {
        Err(anyhow::anyhow!("no catalog client configured: cannot fetch album {id}"))
    }
    async fn get_playlist(&self, id: &str) -> anyhow::Result<Playlist> {
        Err(anyhow::anyhow!("no catalog client configured: cannot fetch playlist {id}"))
    }
    async fn get_track_download_url(&self, id: &str, _quality: Quality) -> anyhow::Result<DownloadUrlInfo> {
        Err(anyhow::anyhow!("no catalog client configured: cannot resolve download url for {id}"))
    }
    async fn get_lyrics(&self, id: &str) -> anyhow::Result<Lyrics> {
        Err(anyhow::anyhow!("no catalog client configured: cannot fetch lyrics for {id}"))
    }
    async fn get_artist(&self, id: &str) -> anyhow::Result<Artist> {
        Err(anyhow::anyhow!("no catalog client configured: cannot fetch artist {id}"))
    }
}
