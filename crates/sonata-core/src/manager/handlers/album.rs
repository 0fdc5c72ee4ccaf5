//! The album handler (§4.4.3): transitions the aggregate, determines disc
//! layout and album-artist routing once for every child to observe, ensures
//! the durable aggregate row, and fans out a child `Job` per track. The
//! aggregate itself never reaches `completed` here -- that is
//! `aggregation::aggregate_parent`'s job, triggered as children finish.

use tokio_util::sync::CancellationToken;

use crate::album_artist::{is_various_artists, VARIOUS_ARTISTS};
use crate::catalog::CatalogClient;
use crate::disc::sample_positions;
use crate::model::{ItemStatus, ItemType, Job, QueueItem};
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
    let album_catalog_id = job
        .album_catalog_id
        .clone()
        .ok_or_else(|| ManagerError::Validation(format!("job {} has no album catalog id", job.id)))?;

    let mut aggregate = match ctx.store.get_by_id(&job.id).await.map_err(store_err)? {
        Some(existing) => existing,
        None => QueueItem::new_aggregate(job.id.clone(), ItemType::Album),
    };
    aggregate.status = ItemStatus::Downloading;
    ctx.store.update(&aggregate).await.map_err(store_err)?;
    ctx.notifier.emit(NotifierEvent::Status {
        id: aggregate.id.clone(),
        status: StatusKind::Started,
        error_message: None,
        ts: unix_timestamp(),
    });

    let album = ctx
        .catalog
        .get_album(&album_catalog_id)
        .await
        .map_err(|e| ManagerError::Network(e.to_string()))?;

    let mut total_discs = album.disk_count.unwrap_or(1);
    for &pos in &sample_positions(album.tracks.len()) {
        if let Some(disc) = album.tracks.get(pos).and_then(|t| t.disc_number) {
            total_discs = total_discs.max(disc);
        }
    }
    ctx.disc_cache.observe(&album_catalog_id, total_discs);

    let album_artist = if is_various_artists(&album.record_type, &album.title, album.contributors.len()) {
        VARIOUS_ARTISTS.to_string()
    } else {
        album.artist.name.clone()
    };
    ctx.album_artist_cache.set_if_absent(&album_catalog_id, &album_artist);

    aggregate.title = Some(album.title.clone());
    aggregate.artist = Some(album_artist);
    aggregate.total_tracks = Some(album.total_tracks);
    ctx.store.update(&aggregate).await.map_err(store_err)?;

    for track in &album.tracks {
        let child_id = format!("track_{album_catalog_id}_{}", track.id);
        let child = Job::child_track(child_id, track.id.clone(), aggregate.id.clone());
        pool.submit(child)
            .await
            .map_err(|e| ManagerError::Network(format!("submitting child track: {e}")))?;
    }

    Ok(())
}
