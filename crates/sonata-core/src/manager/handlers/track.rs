//! The track handler (§4.4.2): the twelve-step sequence a worker runs for
//! every `track_*` job, whether submitted directly or fanned out by an
//! album/playlist handler.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::album_artist::{is_various_artists, VARIOUS_ARTISTS};
use crate::catalog::types::{quality_fallback_ladder, Track};
use crate::catalog::CatalogClient;
use crate::model::{ItemStatus, ItemType, Job, QueueItem};
use crate::path_builder::{
    self, AlbumPathInput, PlaylistPathInput, TrackPathInput,
};
use crate::progress::{DownloadStats, NotifierEvent, StatusKind, Throttled};
use crate::queue_store::HistoryRecord;
use crate::streaming::{fetch_plain, FetchRequest, RawProgressCallback, StreamingProcessor};
use crate::tagging::TagSet;

use super::super::aggregation::aggregate_parent;
use super::super::context::{unix_timestamp, ManagerContext};
use super::super::error::{store_err, ManagerError};
use super::super::guard;

/// Everything step 5 (parent enrichment) resolves, consumed by the path and
/// tag construction steps that follow it.
struct Enrichment {
    album_artist: String,
    disc_number: Option<u32>,
    total_discs: Option<u32>,
    is_multi_disc: bool,
    playlist_position: Option<u32>,
    cover_url: Option<String>,
    album_path: Option<AlbumPathInput>,
    playlist_path: Option<PlaylistPathInput>,
}

impl Enrichment {
    fn bare(track: &Track) -> Self {
        Self {
            album_artist: track.artist.name.clone(),
            disc_number: track.disc_number,
            total_discs: None,
            is_multi_disc: false,
            playlist_position: None,
            cover_url: None,
            album_path: None,
            playlist_path: None,
        }
    }

    fn routes_under_various_artists(&self) -> bool {
        self.playlist_path.is_some() || self.album_artist == VARIOUS_ARTISTS
    }
}

pub async fn handle(ctx: &ManagerContext, cancel: CancellationToken, job: Job) -> Result<(), ManagerError> {
    let mut item = load_or_create_item(ctx, &job).await?;

    if item.status == ItemStatus::Completed {
        if let Some(parent_id) = item.parent_id.clone() {
            aggregate_parent(ctx, &parent_id).await?;
        }
        return Ok(());
    }

    if ctx.control.is_paused(&item.id) {
        return Err(ManagerError::Paused);
    }

    item.status = ItemStatus::Downloading;
    item.progress = 0;
    ctx.store.update(&item).await.map_err(store_err)?;
    ctx.notifier.emit(NotifierEvent::Status {
        id: item.id.clone(),
        status: StatusKind::Started,
        error_message: None,
        ts: unix_timestamp(),
    });

    let track_catalog_id = job
        .track_catalog_id
        .clone()
        .ok_or_else(|| ManagerError::Validation(format!("job {} has no track catalog id", job.id)))?;

    let track = ctx
        .catalog
        .get_track(&track_catalog_id)
        .await
        .map_err(|e| ManagerError::Network(e.to_string()))?;
    if !track.is_available {
        return Err(ManagerError::ResourceUnavailable(format!(
            "track {track_catalog_id} is not available from the catalog"
        )));
    }

    let enrichment = enrich_from_parent(ctx, &item, &track, &track_catalog_id).await?;

    let download_info = resolve_download_url(ctx, &track_catalog_id).await?;

    let ext = download_info.format.clone();
    let path_input = TrackPathInput {
        base_dir: ctx.config.output_dir.clone(),
        ext,
        artist: track.artist.name.clone(),
        title: track.title.clone(),
        album: enrichment.album_path.clone(),
        playlist: enrichment.playlist_path.clone(),
    };
    let mut output_path = path_builder::build_primary_path(&path_input);
    if let Some(parent_dir) = output_path.parent() {
        if tokio::fs::create_dir_all(parent_dir).await.is_err() {
            output_path =
                path_builder::build_fallback_path(&ctx.config.output_dir, &track_catalog_id, &path_input.ext);
        }
    }

    let already_downloaded = tokio::fs::metadata(&output_path)
        .await
        .map(|m| m.len() > 0)
        .unwrap_or(false);

    if !already_downloaded {
        stream_track(ctx, &cancel, &item.id, &track_catalog_id, &download_info.url, &output_path).await?;
        fetch_sibling_artwork(ctx, &output_path, &track, &enrichment).await;
    }

    apply_tags_and_lyrics(ctx, &track, &output_path, &enrichment).await?;

    item.status = ItemStatus::Completed;
    item.progress = 100;
    item.title = Some(track.title.clone());
    item.artist = Some(track.artist.name.clone());
    item.album = Some(track.album.name.clone());
    item.output_path = Some(output_path.display().to_string());
    item.completed_at = Some(unix_timestamp());
    ctx.store.update(&item).await.map_err(store_err)?;
    ctx.store
        .add_to_history(&HistoryRecord {
            item_id: item.id.clone(),
            title: item.title.clone(),
            artist: item.artist.clone(),
            output_path: item.output_path.clone(),
            completed_at: item.completed_at.unwrap_or_default(),
        })
        .await
        .map_err(store_err)?;
    ctx.notifier.emit(NotifierEvent::Status {
        id: item.id.clone(),
        status: StatusKind::Completed,
        error_message: None,
        ts: unix_timestamp(),
    });

    if let Some(parent_id) = item.parent_id.clone() {
        aggregate_parent(ctx, &parent_id).await?;
    }

    Ok(())
}

async fn load_or_create_item(ctx: &ManagerContext, job: &Job) -> Result<QueueItem, ManagerError> {
    if let Some(existing) = ctx.store.get_by_id(&job.id).await.map_err(store_err)? {
        return Ok(existing);
    }
    let mut item = QueueItem::new_track(job.id.clone());
    item.parent_id = job.parent_id.clone();
    ctx.store.add(&item).await.map_err(store_err)?;
    Ok(item)
}

async fn enrich_from_parent(
    ctx: &ManagerContext,
    item: &QueueItem,
    track: &Track,
    track_catalog_id: &str,
) -> Result<Enrichment, ManagerError> {
    let Some(parent_id) = item.parent_id.clone() else {
        return Ok(Enrichment::bare(track));
    };
    let Some(parent) = ctx.store.get_by_id(&parent_id).await.map_err(store_err)? else {
        return Ok(Enrichment::bare(track));
    };

    match parent.item_type {
        ItemType::Album => {
            let album_catalog_id = track.album.id.clone();
            let disc_info = ctx.disc_cache.observe(&album_catalog_id, track.disc_number.unwrap_or(1));
            let fallback_artist = if is_various_artists(
                &track.album.record_type,
                &track.album.name,
                track.album.contributors.len(),
            ) {
                VARIOUS_ARTISTS.to_string()
            } else {
                track.artist.name.clone()
            };
            let album_artist = ctx.album_artist_cache.resolve_or(&album_catalog_id, &fallback_artist);
            let disc_number = track.disc_number.or(Some(1));
            Ok(Enrichment {
                album_artist: album_artist.clone(),
                disc_number,
                total_discs: Some(disc_info.total_discs),
                is_multi_disc: disc_info.is_multi_disc,
                playlist_position: None,
                cover_url: track.album.cover_url.clone(),
                album_path: Some(AlbumPathInput {
                    album_artist,
                    album_title: track.album.name.clone(),
                    track_number: track.track_number,
                    disc_number,
                    is_multi_disc: disc_info.is_multi_disc,
                    create_cd_folder: ctx.config.create_cd_folder,
                    cd_folder_template: ctx.config.cd_folder_template.clone(),
                }),
                playlist_path: None,
            })
        }
        ItemType::Playlist => {
            if let Some((track_ids, cover_url)) = parent.metadata.as_custom_playlist() {
                let position = track_ids
                    .iter()
                    .position(|id| id == track_catalog_id)
                    .map(|i| i as u32 + 1)
                    .unwrap_or(1);
                let playlist_title = parent.title.clone().unwrap_or_else(|| "Playlist".to_string());
                Ok(Enrichment {
                    album_artist: VARIOUS_ARTISTS.to_string(),
                    disc_number: None,
                    total_discs: None,
                    is_multi_disc: false,
                    playlist_position: Some(position),
                    cover_url: cover_url.map(|s| s.to_string()),
                    album_path: None,
                    playlist_path: Some(PlaylistPathInput {
                        playlist_title,
                        playlist_position: position,
                        create_playlist_folder: ctx.config.create_playlist_folder,
                        playlist_folder_template: ctx.config.playlist_folder_template.clone(),
                        playlist_track_template: ctx.config.playlist_track_template.clone(),
                    }),
                })
            } else {
                let crate::model::DecomposedId::Playlist { catalog_id: playlist_catalog_id } =
                    crate::model::decompose_id(&parent.id)
                        .ok_or_else(|| ManagerError::Validation(format!("malformed playlist id {}", parent.id)))?
                else {
                    return Err(ManagerError::Validation(format!("expected playlist id, got {}", parent.id)));
                };
                let playlist = ctx
                    .catalog
                    .get_playlist(&playlist_catalog_id)
                    .await
                    .map_err(|e| ManagerError::Network(e.to_string()))?;
                let position = playlist
                    .tracks
                    .iter()
                    .position(|t| t.id == track_catalog_id)
                    .map(|i| i as u32 + 1)
                    .unwrap_or(1);
                Ok(Enrichment {
                    album_artist: VARIOUS_ARTISTS.to_string(),
                    disc_number: None,
                    total_discs: None,
                    is_multi_disc: false,
                    playlist_position: Some(position),
                    cover_url: playlist.cover_url.clone(),
                    album_path: None,
                    playlist_path: Some(PlaylistPathInput {
                        playlist_title: playlist.title.clone(),
                        playlist_position: position,
                        create_playlist_folder: ctx.config.create_playlist_folder,
                        playlist_folder_template: ctx.config.playlist_folder_template.clone(),
                        playlist_track_template: ctx.config.playlist_track_template.clone(),
                    }),
                })
            }
        }
        ItemType::Track => Ok(Enrichment::bare(track)),
    }
}

async fn resolve_download_url(
    ctx: &ManagerContext,
    track_catalog_id: &str,
) -> Result<crate::catalog::types::DownloadUrlInfo, ManagerError> {
    let mut last_err = None;
    for quality in quality_fallback_ladder(ctx.config.quality) {
        match ctx.catalog.get_track_download_url(track_catalog_id, quality).await {
            Ok(info) => return Ok(info),
            Err(e) => last_err = Some(e),
        }
    }
    Err(ManagerError::ResourceUnavailable(format!(
        "no downloadable quality for track {track_catalog_id}: {}",
        last_err.map(|e| e.to_string()).unwrap_or_else(|| "no quality tiers configured".to_string())
    )))
}

async fn stream_track(
    ctx: &ManagerContext,
    cancel: &CancellationToken,
    item_id: &str,
    track_catalog_id: &str,
    url: &str,
    output_path: &Path,
) -> Result<(), ManagerError> {
    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            cancelled.store(true, Ordering::Relaxed);
        });
    }

    let request = FetchRequest {
        url: url.to_string(),
        track_catalog_id: track_catalog_id.to_string(),
        output_path: output_path.to_path_buf(),
        headers: Default::default(),
        timeout: Duration::from_secs(ctx.config.network.timeout_secs),
        expected_size: None,
    };

    let progress = build_progress_callback(ctx, item_id);
    StreamingProcessor::fetch_checked(request, progress, cancelled).await?;
    Ok(())
}

/// Wraps the raw per-chunk streaming callback in `progress::throttle::Throttled`
/// before it reaches the notifier and the store, so a chatty curl transfer
/// doesn't turn into a chatty sqlite writer.
fn build_progress_callback(ctx: &ManagerContext, item_id: &str) -> RawProgressCallback {
    let start = Instant::now();
    let mut throttled = Throttled::new(0.0);
    let mut stats = DownloadStats::new(0.0, 0);
    let item_id = item_id.to_string();
    let store = ctx.store.clone();
    let notifier = ctx.notifier.clone();

    Box::new(move |bytes, total| {
        let now = start.elapsed().as_secs_f64();
        stats.total_bytes = total;
        stats.observe(now, bytes);
        let percent = stats.percent();
        if !throttled.should_emit(percent, now) {
            return;
        }

        notifier.emit(NotifierEvent::Progress {
            id: item_id.clone(),
            percent,
            bytes,
            total,
            speed: stats.speed,
            eta: stats.eta_secs(),
            ts: unix_timestamp(),
        });

        let store = store.clone();
        let item_id = item_id.clone();
        tokio::spawn(async move {
            if let Ok(Some(mut item)) = store.get_by_id(&item_id).await {
                item.progress = percent;
                let _ = store.update(&item).await;
            }
        });
    })
}

/// Best-effort album/playlist cover and artist folder image. Failures are
/// logged, never propagated -- a missing cover does not fail the track.
async fn fetch_sibling_artwork(ctx: &ManagerContext, output_path: &Path, track: &Track, enrichment: &Enrichment) {
    if let Some(cover_url) = &enrichment.cover_url {
        if let Some(cover_path) = path_builder::cover_path_for(output_path) {
            if tokio::fs::metadata(&cover_path).await.is_err() {
                let key = format!("cover:{}", cover_path.display());
                if let Some(_permit) = guard::try_acquire(&ctx.artist_image_guard, &key).await {
                    let timeout = Duration::from_secs(ctx.config.network.timeout_secs);
                    if let Err(e) = fetch_plain(cover_url, &cover_path, timeout).await {
                        warn!(error = %e, path = %cover_path.display(), "cover art fetch failed");
                    }
                }
            }
        }
    }

    if enrichment.routes_under_various_artists() {
        return;
    }

    let artist_id = &track.artist.id;
    let key = format!("artist:{artist_id}");
    let Some(_permit) = guard::try_acquire(&ctx.artist_image_guard, &key).await else {
        return;
    };
    match ctx.catalog.get_artist(artist_id).await {
        Ok(artist) => {
            let Some(image_url) = artist.image_url else { return };
            let artist_dir = ctx
                .config
                .output_dir
                .join(path_builder::sanitize_component(&enrichment.album_artist));
            let image_path = path_builder::artist_folder_image_path(&artist_dir);
            if tokio::fs::metadata(&image_path).await.is_ok() {
                return;
            }
            let timeout = Duration::from_secs(ctx.config.network.timeout_secs);
            if let Err(e) = fetch_plain(&image_url, &image_path, timeout).await {
                warn!(error = %e, path = %image_path.display(), "artist image fetch failed");
            }
        }
        Err(e) => warn!(error = %e, artist_id, "artist lookup for image failed"),
    }
}

/// Step 11: tag application is terminal on failure (never mark an item
/// completed with wrong or missing tags); lyrics are best-effort.
async fn apply_tags_and_lyrics(
    ctx: &ManagerContext,
    track: &Track,
    output_path: &Path,
    enrichment: &Enrichment,
) -> Result<(), ManagerError> {
    let mut cover_art = None;
    if ctx.config.embed_artwork {
        if let Some(cover_path) = path_builder::cover_path_for(output_path) {
            cover_art = tokio::fs::read(&cover_path).await.ok();
        }
    }

    let tags = TagSet {
        title: track.title.clone(),
        artist: track.artist.name.clone(),
        album: track.album.name.clone(),
        album_artist: enrichment.album_artist.clone(),
        track_number: track.track_number,
        disc_number: enrichment.disc_number,
        total_discs: enrichment.total_discs,
        playlist_position: enrichment.playlist_position,
        cover_art,
    };
    ctx.tag_writer
        .apply(output_path, &tags)
        .await
        .map_err(|e| ManagerError::Validation(format!("tag application failed: {e}")))?;

    if ctx.config.lyrics.enabled {
        match ctx.catalog.get_lyrics(&track.id).await {
            Ok(lyrics) => {
                if ctx.config.lyrics.save_synced_file {
                    if let Some(lrc) = &lyrics.synced_lrc {
                        let lrc_path = path_builder::sibling_path(output_path, "lrc");
                        if let Err(e) = ctx.lyrics_writer.write_lrc(&lrc_path, lrc).await {
                            warn!(error = %e, "lyrics write failed");
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "lyrics fetch failed"),
        }
    }

    Ok(())
}
