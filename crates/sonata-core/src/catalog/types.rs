//! Typed catalog DTOs (§6, §9's first design note).
//!
//! The source this spec was distilled from passed catalog responses around
//! as untyped maps; here every response is a `serde::Deserialize` struct
//! decoded once at the adapter boundary. Handlers pattern-match on these
//! fields, never on string keys.

use crate::config::Quality;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
    pub record_type: String,
    pub cover_url: Option<String>,
    pub label: Option<String>,
    pub release_date: Option<String>,
    pub disk_count: Option<u32>,
    pub contributors: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: ArtistRef,
    pub album: AlbumRef,
    pub duration_secs: u32,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub isrc: Option<String>,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPreview {
    pub id: String,
    pub title: String,
    pub artist: ArtistRef,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: ArtistRef,
    pub record_type: String,
    pub disk_count: Option<u32>,
    pub contributors: Vec<ArtistRef>,
    pub tracks: Vec<TrackPreview>,
    pub total_tracks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub tracks: Vec<TrackPreview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadUrlInfo {
    pub url: String,
    pub actual_quality: Quality,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Lyrics {
    pub synced_lrc: Option<String>,
    pub plain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

/// Quality fallback ladder applied by the adapter: try `quality`, then the
/// next lower tier, down to `standard`. `lossless -> high -> standard` per
/// §4.4.2 step 6; `standard` is the floor (no fallback below it -- `low` is
/// a config option but is not part of the download fallback ladder).
pub fn quality_fallback_ladder(quality: Quality) -> Vec<Quality> {
    match quality {
        Quality::Lossless => vec![Quality::Lossless, Quality::High, Quality::Standard],
        Quality::High => vec![Quality::High, Quality::Standard],
        Quality::Standard => vec![Quality::Standard],
        Quality::Low => vec![Quality::Low, Quality::Standard],
    }
}
