//! Rebuilds a `Job` from a durable `QueueItem`, used by the scavenger (on
//! every poll) and by the result consumer (when scheduling a retry). Per
//! §4.4.1's id decomposition rule, a `Job`'s catalog ids are always
//! recoverable from its `QueueItem.id` plus the durably-stored `parent_id` --
//! nothing about what to do next needs to survive only in memory.

use crate::model::{decompose_id, DecomposedId, Job, ItemType, QueueItem};

pub fn job_from_item(item: &QueueItem) -> Option<Job> {
    let decomposed = decompose_id(&item.id)?;
    Some(match decomposed {
        DecomposedId::StandaloneTrack { catalog_id } => Job {
            id: item.id.clone(),
            item_type: ItemType::Track,
            track_catalog_id: Some(catalog_id),
            album_catalog_id: None,
            playlist_catalog_id: None,
            parent_id: None,
            retry_count: item.retry_count,
            custom_track_ids: None,
        },
        DecomposedId::ChildTrack { track_catalog_id, .. } => Job {
            id: item.id.clone(),
            item_type: ItemType::Track,
            track_catalog_id: Some(track_catalog_id),
            album_catalog_id: None,
            playlist_catalog_id: None,
            parent_id: item.parent_id.clone(),
            retry_count: item.retry_count,
            custom_track_ids: None,
        },
        DecomposedId::Album { catalog_id } => Job {
            id: item.id.clone(),
            item_type: ItemType::Album,
            track_catalog_id: None,
            album_catalog_id: Some(catalog_id),
            playlist_catalog_id: None,
            parent_id: None,
            retry_count: item.retry_count,
            custom_track_ids: None,
        },
        DecomposedId::Playlist { catalog_id } => Job {
            id: item.id.clone(),
            item_type: ItemType::Playlist,
            track_catalog_id: None,
            album_catalog_id: None,
            playlist_catalog_id: Some(catalog_id),
            parent_id: None,
            retry_count: item.retry_count,
            custom_track_ids: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemStatus;

    #[test]
    fn standalone_track_reconstructs() {
        let item = QueueItem::new_track("track_3135556");
        let job = job_from_item(&item).unwrap();
        assert_eq!(job.item_type, ItemType::Track);
        assert_eq!(job.track_catalog_id.as_deref(), Some("3135556"));
        assert!(job.parent_id.is_none());
    }

    #[test]
    fn child_track_reconstructs_with_stored_parent_id() {
        let mut item = QueueItem::new_track("track_302127_9981");
        item.parent_id = Some("album_302127".into());
        let job = job_from_item(&item).unwrap();
        assert_eq!(job.track_catalog_id.as_deref(), Some("9981"));
        assert_eq!(job.parent_id.as_deref(), Some("album_302127"));
    }

    #[test]
    fn album_and_playlist_reconstruct() {
        let album = QueueItem::new_aggregate("album_302127", ItemType::Album);
        let job = job_from_item(&album).unwrap();
        assert_eq!(job.item_type, ItemType::Album);
        assert_eq!(job.album_catalog_id.as_deref(), Some("302127"));

        let mut playlist = QueueItem::new_aggregate("playlist_77", ItemType::Playlist);
        playlist.status = ItemStatus::Pending;
        let job = job_from_item(&playlist).unwrap();
        assert_eq!(job.item_type, ItemType::Playlist);
        assert_eq!(job.playlist_catalog_id.as_deref(), Some("77"));
    }
}
