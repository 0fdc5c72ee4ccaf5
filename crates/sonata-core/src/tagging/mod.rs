//! Tag, artwork, and lyrics writers: pure side-effecting sinks (§1 non-goal
//! -- ID3/MP4/FLAC tag writing and audio container parsing are out of scope
//! for this crate; this module defines the seam a real implementation plugs
//! into, plus a `NullTagWriter`/`NullLyricsWriter` test double).

use async_trait::async_trait;
use std::path::Path;

/// Tag fields to stamp onto a downloaded audio file. Mirrors the fields the
/// track handler has in hand by the time tagging runs (§4.4.2 steps 4-6).
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub total_discs: Option<u32>,
    pub playlist_position: Option<u32>,
    /// Cover art bytes to embed, when `embed_artwork` is enabled.
    pub cover_art: Option<Vec<u8>>,
}

/// Applies tags (and optionally embedded artwork) to the audio file at
/// `path`. Tag application is synchronous with the `completed` transition
/// (§9: "tagging must be synchronous ... for correctness", P10) -- a failure
/// here is a terminal error for the item, never silently swallowed.
#[async_trait]
pub trait TagWriter: Send + Sync {
    async fn apply(&self, path: &Path, tags: &TagSet) -> anyhow::Result<()>;
}

/// Writes a `.lrc` side-car next to the audio file. Best-effort: failures
/// are logged by the caller but never fail the item (§4.4.2 step 11).
#[async_trait]
pub trait LyricsWriter: Send + Sync {
    async fn write_lrc(&self, path: &Path, synced_lrc: &str) -> anyhow::Result<()>;
}

/// No-op tag writer. Used where a real ID3/MP4/FLAC tag writer would plug
/// in; also the default test double for manager-level tests that only
/// assert on orchestration, not on byte-level tag correctness.
pub struct NullTagWriter;

#[async_trait]
impl TagWriter for NullTagWriter {
    async fn apply(&self, _path: &Path, _tags: &TagSet) -> anyhow::Result<()> {
        Ok(())
    }
}

/// No-op lyrics writer, the lyrics-side counterpart of [`NullTagWriter`].
pub struct NullLyricsWriter;

#[async_trait]
impl LyricsWriter for NullLyricsWriter {
    async fn write_lrc(&self, _path: &Path, _synced_lrc: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writes the LRC side-car verbatim to `path.with_extension("lrc")`'s target
/// (the manager passes the already-computed sibling path in).
pub struct FileLyricsWriter;

#[async_trait]
impl LyricsWriter for FileLyricsWriter {
    async fn write_lrc(&self, path: &Path, synced_lrc: &str) -> anyhow::Result<()> {
        tokio::fs::write(path, synced_lrc).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_tag_writer_always_succeeds() {
        let writer = NullTagWriter;
        let tags = TagSet {
            title: "Get Lucky".into(),
            ..Default::default()
        };
        writer.apply(Path::new("/tmp/whatever.mp3"), &tags).await.unwrap();
    }

    #[tokio::test]
    async fn file_lyrics_writer_writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.lrc");
        let writer = FileLyricsWriter;
        writer.write_lrc(&path, "[00:01.00]Hello").await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "[00:01.00]Hello");
    }
}
