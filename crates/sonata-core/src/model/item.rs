use super::metadata::ItemMetadata;
use serde::{Deserialize, Serialize};

/// What kind of catalog entity a [`QueueItem`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Track,
    Album,
    Playlist,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Track => "track",
            ItemType::Album => "album",
            ItemType::Playlist => "playlist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "track" => Some(ItemType::Track),
            "album" => Some(ItemType::Album),
            "playlist" => Some(ItemType::Playlist),
            _ => None,
        }
    }
}

/// Lifecycle state of a [`QueueItem`]. See the manager's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Downloading,
    Completed,
    Failed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Downloading => "downloading",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ItemStatus::Pending),
            "downloading" => Some(ItemStatus::Downloading),
            "completed" => Some(ItemStatus::Completed),
            "failed" => Some(ItemStatus::Failed),
            _ => None,
        }
    }
}

/// The durable unit of work. Tracks, albums, and playlists are all
/// represented as a `QueueItem`; albums/playlists are "aggregates" that fan
/// out into child track items linked by `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    /// Stable id: `track_<catalogId>`, `album_<catalogId>`, `playlist_<catalogId>`,
    /// or `track_<parentCatalogId>_<trackCatalogId>` for a child track.
    pub id: String,
    pub item_type: ItemType,
    pub status: ItemStatus,

    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,

    /// 0..=100.
    pub progress: u8,

    pub parent_id: Option<String>,

    /// Aggregate-only counters.
    pub total_tracks: Option<u32>,
    pub completed_tracks: Option<u32>,

    pub retry_count: u32,
    pub error_message: Option<String>,
    pub output_path: Option<String>,
    pub completed_at: Option<i64>,

    pub metadata: ItemMetadata,
}

impl QueueItem {
    pub fn new_track(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: ItemType::Track,
            status: ItemStatus::Pending,
            title: None,
            artist: None,
            album: None,
            progress: 0,
            parent_id: None,
            total_tracks: None,
            completed_tracks: None,
            retry_count: 0,
            error_message: None,
            output_path: None,
            completed_at: None,
            metadata: ItemMetadata::None,
        }
    }

    pub fn new_aggregate(id: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: id.into(),
            item_type,
            status: ItemStatus::Pending,
            title: None,
            artist: None,
            album: None,
            progress: 0,
            parent_id: None,
            total_tracks: Some(0),
            completed_tracks: Some(0),
            retry_count: 0,
            error_message: None,
            output_path: None,
            completed_at: None,
            metadata: ItemMetadata::None,
        }
    }

    /// Recompute `progress` from `completed_tracks`/`total_tracks` for an aggregate.
    /// `progress = floor(100 * completed_tracks / total_tracks)` per the data model invariant.
    pub fn recompute_aggregate_progress(&mut self) {
        if let (Some(completed), Some(total)) = (self.completed_tracks, self.total_tracks) {
            if total > 0 {
                self.progress = ((completed as u64 * 100) / total as u64) as u8;
            }
        }
    }
}

/// Splits a QueueItem id into its catalog-id components, per the scavenger's
/// id decomposition rule: `track_A_B` -> child track B of parent album A;
/// `track_A` -> standalone track A; `album_A`/`playlist_A` likewise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecomposedId {
    StandaloneTrack { catalog_id: String },
    ChildTrack { parent_catalog_id: String, track_catalog_id: String },
    Album { catalog_id: String },
    Playlist { catalog_id: String },
}

pub fn decompose_id(id: &str) -> Option<DecomposedId> {
    let mut parts = id.splitn(2, '_');
    let kind = parts.next()?;
    let rest = parts.next()?;

    match kind {
        "track" => {
            if let Some((parent, track)) = rest.split_once('_') {
                Some(DecomposedId::ChildTrack {
                    parent_catalog_id: parent.to_string(),
                    track_catalog_id: track.to_string(),
                })
            } else {
                Some(DecomposedId::StandaloneTrack {
                    catalog_id: rest.to_string(),
                })
            }
        }
        "album" => Some(DecomposedId::Album {
            catalog_id: rest.to_string(),
        }),
        "playlist" => Some(DecomposedId::Playlist {
            catalog_id: rest.to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_standalone_track() {
        assert_eq!(
            decompose_id("track_3135556"),
            Some(DecomposedId::StandaloneTrack {
                catalog_id: "3135556".to_string()
            })
        );
    }

    #[test]
    fn decompose_child_track() {
        assert_eq!(
            decompose_id("track_302127_9981"),
            Some(DecomposedId::ChildTrack {
                parent_catalog_id: "302127".to_string(),
                track_catalog_id: "9981".to_string(),
            })
        );
    }

    #[test]
    fn decompose_album_and_playlist() {
        assert_eq!(
            decompose_id("album_302127"),
            Some(DecomposedId::Album {
                catalog_id: "302127".to_string()
            })
        );
        assert_eq!(
            decompose_id("playlist_77"),
            Some(DecomposedId::Playlist {
                catalog_id: "77".to_string()
            })
        );
    }

    #[test]
    fn recompute_aggregate_progress_floors() {
        let mut item = QueueItem::new_aggregate("album_1", ItemType::Album);
        item.total_tracks = Some(13);
        item.completed_tracks = Some(8);
        item.recompute_aggregate_progress();
        assert_eq!(item.progress, 61); // floor(100*8/13) = 61
    }

    #[test]
    fn status_str_roundtrip() {
        for s in [
            ItemStatus::Pending,
            ItemStatus::Downloading,
            ItemStatus::Completed,
            ItemStatus::Failed,
        ] {
            assert_eq!(ItemStatus::from_str(s.as_str()), Some(s));
        }
    }
}
