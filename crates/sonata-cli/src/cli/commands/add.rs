//! `sonata add` -- enqueue a track, album, playlist, or custom-playlist
//! download. Only touches the queue store, mirroring the teacher's `ddm add`
//! (which only touched `ResumeDb`, never the scheduler directly): a live
//! `sonata run` picks the new row up via its scavenger sweep within a few
//! seconds, and a not-yet-running one will pick it up on its next recovery
//! pass.

use anyhow::Result;
use clap::Subcommand;
use sonata_core::model::{ItemMetadata, ItemType, QueueItem};
use sonata_core::queue_store::QueueStore;

#[derive(Debug, Subcommand)]
pub enum AddKind {
    /// A single track by catalog id.
    Track { id: String },
    /// An album by catalog id; the running worker fans out its tracks.
    Album { id: String },
    /// A catalog-hosted playlist by catalog id.
    Playlist { id: String },
    /// A playlist assembled from tracks resolved across catalogs, with an
    /// externally-hosted cover image.
    CustomPlaylist {
        /// Local id for this playlist (used to build the queue item id).
        id: String,
        #[arg(long)]
        title: String,
        /// Catalog track ids, already resolved (e.g. via a matcher step).
        #[arg(long = "track", required = true)]
        track_ids: Vec<String>,
        #[arg(long)]
        cover_url: Option<String>,
    },
}

pub async fn run_add(_cfg: &sonata_core::config::SonataConfig, kind: AddKind) -> Result<()> {
    let store = QueueStore::open_default().await?;

    let (id, item) = match kind {
        AddKind::Track { id } => {
            let item_id = format!("track_{id}");
            (item_id.clone(), QueueItem::new_track(item_id))
        }
        AddKind::Album { id } => {
            let item_id = format!("album_{id}");
            (item_id.clone(), QueueItem::new_aggregate(item_id, ItemType::Album))
        }
        AddKind::Playlist { id } => {
            let item_id = format!("playlist_{id}");
            (item_id.clone(), QueueItem::new_aggregate(item_id, ItemType::Playlist))
        }
        AddKind::CustomPlaylist {
            id,
            title,
            track_ids,
            cover_url,
        } => {
            let item_id = format!("playlist_{id}");
            let mut item = QueueItem::new_aggregate(item_id.clone(), ItemType::Playlist);
            item.title = Some(title);
            item.metadata = ItemMetadata::CustomPlaylist { track_ids, cover_url };
            (item_id, item)
        }
    };

    if store.get_by_id(&id).await?.is_some() {
        println!("Item {id} is already queued.");
        return Ok(());
    }
    store.add(&item).await?;
    println!("Added {id}");
    Ok(())
}
