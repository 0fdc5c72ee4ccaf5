use super::item::ItemType;

/// Transient message from the manager to the worker pool. Non-durable: the
/// `QueueItem` in the store is the source of truth, a `Job` just carries
/// enough to let a worker re-derive what to do without re-reading the id.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub item_type: ItemType,

    pub track_catalog_id: Option<String>,
    pub album_catalog_id: Option<String>,
    pub playlist_catalog_id: Option<String>,

    pub parent_id: Option<String>,
    pub retry_count: u32,

    /// Present only for cross-catalog custom-playlist imports: the ordered
    /// track-id list to attach to the aggregate on first fan-out.
    pub custom_track_ids: Option<Vec<String>>,
}

impl Job {
    pub fn standalone_track(id: impl Into<String>, track_catalog_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: ItemType::Track,
            track_catalog_id: Some(track_catalog_id.into()),
            album_catalog_id: None,
            playlist_catalog_id: None,
            parent_id: None,
            retry_count: 0,
            custom_track_ids: None,
        }
    }

    pub fn child_track(
        id: impl Into<String>,
        track_catalog_id: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            item_type: ItemType::Track,
            track_catalog_id: Some(track_catalog_id.into()),
            album_catalog_id: None,
            playlist_catalog_id: None,
            parent_id: Some(parent_id.into()),
            retry_count: 0,
            custom_track_ids: None,
        }
    }

    pub fn album(id: impl Into<String>, album_catalog_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: ItemType::Album,
            track_catalog_id: None,
            album_catalog_id: Some(album_catalog_id.into()),
            playlist_catalog_id: None,
            parent_id: None,
            retry_count: 0,
            custom_track_ids: None,
        }
    }

    pub fn playlist(id: impl Into<String>, playlist_catalog_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: ItemType::Playlist,
            track_catalog_id: None,
            album_catalog_id: None,
            playlist_catalog_id: Some(playlist_catalog_id.into()),
            parent_id: None,
            retry_count: 0,
            custom_track_ids: None,
        }
    }
}
