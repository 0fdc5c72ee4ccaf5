//! The streaming decrypt pipeline (§4.5): fetches a track's audio bytes over
//! HTTP, applies the stripe cipher in fixed-size blocks as they arrive, and
//! writes the result to disk via `storage::StorageWriter`, all without ever
//! buffering the whole file in memory.

pub mod cipher;
pub mod processor;
pub mod stripe;

pub use cipher::{BlockCipher, PlaceholderCipher};
pub use processor::{FetchOutcome, FetchRequest, RawProgressCallback, StreamingError, StreamingProcessor};
pub use stripe::{BLOCK_SIZE, STRIPE, is_encrypted_block};

use std::path::Path;

/// Downloads `url` to `output_path` verbatim, with no stripe decryption --
/// used for sibling artwork/cover fetches (§4.4.3b), which are plain image
/// files, not stripe-encrypted audio streams. Reuses the same
/// write-temp-then-atomic-rename discipline as the audio path.
pub async fn fetch_plain(
    url: &str,
    output_path: &Path,
    timeout: std::time::Duration,
) -> Result<u64, StreamingError> {
    let request = FetchRequest {
        url: url.to_string(),
        track_catalog_id: String::new(),
        output_path: output_path.to_path_buf(),
        headers: Default::default(),
        timeout,
        expected_size: None,
    };
    tokio::task::spawn_blocking(move || processor::fetch_plain_blocking(request))
        .await
        .map_err(|e| StreamingError::Network(format!("plain fetch task panicked: {e}")))?
}
