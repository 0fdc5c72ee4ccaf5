//! Catalog API adapter: interface and request shaping only (§1 non-goal --
//! HTTP, auth, token refresh, and rate limiting belong to a real
//! implementation of [`CatalogClient`], not to this crate).

mod client;
mod types;

pub use client::{CatalogClient, UnimplementedCatalogClient};
pub use types::{
    AlbumRef, ArtistRef, Track, TrackPreview, Album, Playlist, DownloadUrlInfo, Lyrics, Artist,
    quality_fallback_ladder,
};
