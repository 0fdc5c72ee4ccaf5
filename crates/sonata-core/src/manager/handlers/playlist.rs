//! The playlist handler (§4.4.3): covers both catalog-sourced playlists and
//! cross-catalog custom imports (`ItemMetadata::CustomPlaylist`, built by the
//! fuzzy matcher ahead of submission). Both routes fan out child tracks under
//! "Various Artists" -- playlists never carry a single album-artist.

use tokio_util::sync::CancellationToken;

use crate::album_artist::VARIOUS_ARTISTS;
use crate::catalog::CatalogClient;
use crate::model::{decompose_id, DecomposedId, ItemMetadata, ItemStatus, ItemType, Job, QueueItem};
use crate::progress::{NotifierEvent, StatusKind};
use crate::worker_pool::WorkerPool;

use super::super::context::{unix_timestamp, ManagerContext};
use super::super::error::{store_err, ManagerError};

pub async fn handle(
    ctx: &ManagerContext,
    pool: &WorkerPool,
    _cancel: CancellationToken,
    job: Job,
) -> Result<(), ManagerError> {
    let mut aggregate = match ctx.store.get_by_id(&job.id).await.map_err(store_err)? {
        Some(existing) => existing,
        None => {
            let mut item = QueueItem::new_aggregate(job.id.clone(), ItemType::Playlist);
            if let Some(track_ids) = &job.custom_track_ids {
                item.metadata = ItemMetadata::CustomPlaylist {
                    track_ids: track_ids.clone(),
                    cover_url: None,
                };
            }
            ctx.store.add(&item).await.map_err(store_err)?;
            item
        }
    };
    aggregate.status = ItemStatus::Downloading;
    ctx.store.update(&aggregate).await.map_err(store_err)?;
    ctx.notifier.emit(NotifierEvent::Status {
        id: aggregate.id.clone(),
        status: StatusKind::Started,
        error_message: None,
        ts: unix_timestamp(),
    });

    if let Some((track_ids, _cover_url)) = aggregate.metadata.as_custom_playlist() {
        let track_ids = track_ids.to_vec();
        let aggregate_catalog_id = match decompose_id(&aggregate.id) {
            Some(DecomposedId::Playlist { catalog_id }) => catalog_id,
            _ => aggregate.id.clone(),
        };

        aggregate.artist = Some(VARIOUS_ARTISTS.to_string());
        aggregate.total_tracks = Some(track_ids.len() as u32);
        ctx.store.update(&aggregate).await.map_err(store_err)?;

        for track_id in &track_ids {
            let child_id = format!("track_{aggregate_catalog_id}_{track_id}");
            let child = Job::child_track(child_id, track_id.clone(), aggregate.id.clone());
            pool.submit(child)
                .await
                .map_err(|e| ManagerError::Network(format!("submitting child track: {e}")))?;
        }
        return Ok(());
    }

    let playlist_catalog_id = job
        .playlist_catalog_id
        .clone()
        .ok_or_else(|| ManagerError::Validation(format!("job {} has no playlist catalog id", job.id)))?;

    let playlist = ctx
        .catalog
        .get_playlist(&playlist_catalog_id)
        .await
        .map_err(|e| ManagerError::Network(e.to_string()))?;

    aggregate.title = Some(playlist.title.clone());
    aggregate.artist = Some(VARIOUS_ARTISTS.to_string());
    aggregate.total_tracks = Some(playlist.tracks.len() as u32);
    ctx.store.update(&aggregate).await.map_err(store_err)?;

    for track in &playlist.tracks {
        let child_id = format!("track_{playlist_catalog_id}_{}", track.id);
        let child = Job::child_track(child_id, track.id.clone(), aggregate.id.clone());
        pool.submit(child)
            .await
            .map_err(|e| ManagerError::Network(format!("submitting child track: {e}")))?;
    }

    Ok(())
}
