//! Shared, cheaply-clonable state every handler and background task needs.

use crate::album_artist::AlbumArtistCache;
use crate::catalog::CatalogClient;
use crate::config::SonataConfig;
use crate::disc::DiscCache;
use crate::progress::NotifierHandle;
use crate::queue_store::QueueStore;
use crate::retry::RetryPolicy;
use crate::tagging::{LyricsWriter, TagWriter};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::control::JobControl;
use super::error_registry::ErrorRegistry;

pub struct ManagerContext {
    pub store: QueueStore,
    pub catalog: Arc<dyn CatalogClient>,
    pub tag_writer: Arc<dyn TagWriter>,
    pub lyrics_writer: Arc<dyn LyricsWriter>,
    pub notifier: NotifierHandle,
    pub disc_cache: Arc<DiscCache>,
    pub album_artist_cache: Arc<AlbumArtistCache>,
    pub config: SonataConfig,
    pub retry_policy: RetryPolicy,
    pub control: Arc<JobControl>,
    pub error_registry: Arc<ErrorRegistry>,
    pub artist_image_guard: Arc<Mutex<HashSet<String>>>,
}

pub fn unix_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
