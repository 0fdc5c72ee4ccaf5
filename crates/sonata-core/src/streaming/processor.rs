//! The streaming download-and-decrypt pipeline (§4.5).
//!
//! Structured like `downloader::download_single` (a single sequential GET
//! writing via `StorageWriter`), composed with the stripe filter: bytes
//! arrive in arbitrary-sized chunks from curl, are buffered up to
//! `stripe::BLOCK_SIZE`, decrypted every `stripe::STRIPE`-th block, and
//! written to the temp file at a monotonically advancing offset. A
//! successful return implies a complete, non-empty file at `output_path` --
//! the temp file is only renamed into place after the transfer and the
//! size check both succeed.

use super::cipher::{BlockCipher, PlaceholderCipher};
use super::stripe::{self, BLOCK_SIZE};
use crate::storage::{self, StorageWriterBuilder};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Progress callback invoked frequently (every chunk) by the raw I/O layer
/// with `(bytes_so_far, total_bytes)`. The manager wraps this in
/// `progress::throttle::Throttled` before it reaches the notifier/store.
pub type RawProgressCallback = Box<dyn FnMut(u64, u64) + Send>;

#[derive(Debug, Error)]
pub enum StreamingError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP status {0}")]
    Http(u32),
    #[error("short read: expected {expected} bytes, got {received}")]
    ShortRead { expected: u64, received: u64 },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub track_catalog_id: String,
    pub output_path: PathBuf,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
    /// Expected total byte size, when known up front. `None` when the
    /// catalog doesn't expose it; the processor then relies solely on
    /// curl's own content-length reporting for the `total` progress field.
    pub expected_size: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub success: bool,
    pub file_size: u64,
    pub error_message: Option<String>,
}

pub struct StreamingProcessor;

impl StreamingProcessor {
    /// Fetch, stripe-decrypt, and write `request` to disk, returning the
    /// classified [`StreamingError`] on failure rather than a flattened
    /// string -- used internally by the manager's track handler, which needs
    /// the error kind to decide retry vs. terminal failure. Runs the blocking
    /// curl transfer on a dedicated thread via `spawn_blocking`; cancellation
    /// is observed through `cancelled`, which the caller flips (e.g. from a
    /// task racing a `CancellationToken`) to abort the in-flight transfer the
    /// same way a storage write failure aborts it (return `Ok(0)` from the
    /// write callback).
    pub async fn fetch_checked(
        request: FetchRequest,
        progress: RawProgressCallback,
        cancelled: Arc<AtomicBool>,
    ) -> Result<u64, StreamingError> {
        let cipher: Arc<dyn BlockCipher> = Arc::new(PlaceholderCipher);
        tokio::task::spawn_blocking(move || fetch_blocking(request, progress, cancelled, cipher))
            .await
            .map_err(|join_err| StreamingError::Network(format!("streaming task panicked: {join_err}")))?
    }

    /// Spec-shaped entry point: `{success, fileSize, errorMessage}`. Thin
    /// wrapper around [`Self::fetch_checked`] for external callers that only
    /// want the flattened outcome.
    pub async fn fetch(
        request: FetchRequest,
        progress: RawProgressCallback,
        cancelled: Arc<AtomicBool>,
    ) -> FetchOutcome {
        match Self::fetch_checked(request, progress, cancelled).await {
            Ok(size) => FetchOutcome {
                success: true,
                file_size: size,
                error_message: None,
            },
            Err(e) => FetchOutcome {
                success: false,
                file_size: 0,
                error_message: Some(e.to_string()),
            },
        }
    }
}

struct BlockState {
    buffer: Vec<u8>,
    block_index: u64,
    write_offset: u64,
    total_written: u64,
    total_size: u64,
    storage: storage::StorageWriter,
    cipher: Arc<dyn BlockCipher>,
    track_catalog_id: String,
    progress: RawProgressCallback,
    error: Option<StreamingError>,
}

impl BlockState {
    /// Drains and processes every complete `BLOCK_SIZE` block currently
    /// buffered, writing each to storage at the next offset.
    fn drain_complete_blocks(&mut self) -> Result<(), StreamingError> {
        while self.buffer.len() >= BLOCK_SIZE {
            let mut block: Vec<u8> = self.buffer.drain(0..BLOCK_SIZE).collect();
            self.write_block(&mut block)?;
        }
        Ok(())
    }

    fn flush_final_partial_block(&mut self) -> Result<(), StreamingError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let mut block = std::mem::take(&mut self.buffer);
        self.write_block(&mut block)
    }

    fn write_block(&mut self, block: &mut [u8]) -> Result<(), StreamingError> {
        stripe::process_block(
            self.cipher.as_ref(),
            &self.track_catalog_id,
            self.block_index,
            block,
        );
        self.storage
            .write_at(self.write_offset, block)
            .map_err(|e| StreamingError::Storage(e.to_string()))?;
        self.write_offset += block.len() as u64;
        self.total_written += block.len() as u64;
        self.block_index += 1;
        (self.progress)(self.total_written, self.total_size);
        Ok(())
    }
}

fn fetch_blocking(
    request: FetchRequest,
    progress: RawProgressCallback,
    cancelled: Arc<AtomicBool>,
    cipher: Arc<dyn BlockCipher>,
) -> Result<u64, StreamingError> {
    let temp_path = storage::temp_path(&request.output_path);
    let builder = StorageWriterBuilder::create(&temp_path)
        .map_err(|e| StreamingError::Storage(e.to_string()))?;
    let writer = builder.build();

    let state = Arc::new(Mutex::new(BlockState {
        buffer: Vec::with_capacity(BLOCK_SIZE * 2),
        block_index: 0,
        write_offset: 0,
        total_written: 0,
        total_size: request.expected_size.unwrap_or(0),
        storage: writer,
        cipher,
        track_catalog_id: request.track_catalog_id.clone(),
        progress,
        error: None,
    }));

    let mut easy = curl::easy::Easy::new();
    easy.url(&request.url)
        .map_err(|e| StreamingError::Network(e.to_string()))?;
    easy.follow_location(true)
        .map_err(|e| StreamingError::Network(e.to_string()))?;
    easy.max_redirections(10)
        .map_err(|e| StreamingError::Network(e.to_string()))?;
    easy.connect_timeout(Duration::from_secs(30))
        .map_err(|e| StreamingError::Network(e.to_string()))?;
    easy.timeout(request.timeout)
        .map_err(|e| StreamingError::Network(e.to_string()))?;

    let mut list = curl::easy::List::new();
    for (k, v) in &request.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))
            .map_err(|e| StreamingError::Network(e.to_string()))?;
    }
    if !request.headers.is_empty() {
        easy.http_headers(list)
            .map_err(|e| StreamingError::Network(e.to_string()))?;
    }

    {
        let state_cb = Arc::clone(&state);
        let cancelled_cb = Arc::clone(&cancelled);
        let mut transfer = easy.transfer();
        transfer
            .write_function(move |data| {
                if cancelled_cb.load(Ordering::Relaxed) {
                    return Ok(0);
                }
                let mut st = state_cb.lock().unwrap();
                st.buffer.extend_from_slice(data);
                if let Err(e) = st.drain_complete_blocks() {
                    st.error = Some(e);
                    return Ok(0);
                }
                Ok(data.len())
            })
            .map_err(|e| StreamingError::Network(e.to_string()))?;

        if let Err(e) = transfer.perform() {
            let mut st = state.lock().unwrap();
            if let Some(err) = st.error.take() {
                return Err(err);
            }
            drop(st);
            if cancelled.load(Ordering::Relaxed) {
                return Err(StreamingError::Cancelled);
            }
            return Err(StreamingError::Network(e.to_string()));
        }
    }

    if cancelled.load(Ordering::Relaxed) {
        return Err(StreamingError::Cancelled);
    }

    let code = easy
        .response_code()
        .map_err(|e| StreamingError::Network(e.to_string()))?;
    if !(200..300).contains(&code) {
        return Err(StreamingError::Http(code));
    }

    let mut st = state.lock().unwrap();
    if let Some(err) = st.error.take() {
        return Err(err);
    }
    st.flush_final_partial_block()?;
    let total_written = st.total_written;
    let expected = request.expected_size;
    drop(st);

    if let Some(exp) = expected {
        if total_written != exp {
            return Err(StreamingError::ShortRead {
                expected: exp,
                received: total_written,
            });
        }
    }
    if total_written == 0 {
        return Err(StreamingError::ShortRead {
            expected: 1,
            received: 0,
        });
    }

    let state = Arc::try_unwrap(state)
        .map_err(|_| StreamingError::Storage("block state still shared".into()))?
        .into_inner()
        .unwrap();
    state
        .storage
        .sync()
        .map_err(|e| StreamingError::Storage(e.to_string()))?;
    state
        .storage
        .finalize(&request.output_path)
        .map_err(|e| StreamingError::Storage(e.to_string()))?;

    Ok(total_written)
}

/// Plain (non-stripe) variant used for cover/artwork fetches: same curl
/// transfer and atomic finalize, but every byte is written through
/// unmodified -- no block buffering, no cipher.
pub(crate) fn fetch_plain_blocking(request: FetchRequest) -> Result<u64, StreamingError> {
    let temp_path = storage::temp_path(&request.output_path);
    let builder = StorageWriterBuilder::create(&temp_path)
        .map_err(|e| StreamingError::Storage(e.to_string()))?;
    let writer = Arc::new(builder.build());
    let offset = Arc::new(Mutex::new(0u64));

    let mut easy = curl::easy::Easy::new();
    easy.url(&request.url)
        .map_err(|e| StreamingError::Network(e.to_string()))?;
    easy.follow_location(true)
        .map_err(|e| StreamingError::Network(e.to_string()))?;
    easy.timeout(request.timeout)
        .map_err(|e| StreamingError::Network(e.to_string()))?;

    {
        let writer_cb = Arc::clone(&writer);
        let offset_cb = Arc::clone(&offset);
        let mut transfer = easy.transfer();
        transfer
            .write_function(move |data| {
                let mut off = offset_cb.lock().unwrap();
                if writer_cb.write_at(*off, data).is_err() {
                    return Ok(0);
                }
                *off += data.len() as u64;
                Ok(data.len())
            })
            .map_err(|e| StreamingError::Network(e.to_string()))?;
        transfer
            .perform()
            .map_err(|e| StreamingError::Network(e.to_string()))?;
    }

    let code = easy
        .response_code()
        .map_err(|e| StreamingError::Network(e.to_string()))?;
    if !(200..300).contains(&code) {
        return Err(StreamingError::Http(code));
    }

    let total = *offset.lock().unwrap();
    if total == 0 {
        return Err(StreamingError::ShortRead {
            expected: 1,
            received: 0,
        });
    }

    let writer = Arc::try_unwrap(writer)
        .map_err(|_| StreamingError::Storage("writer still shared".into()))?;
    writer.sync().map_err(|e| StreamingError::Storage(e.to_string()))?;
    writer
        .finalize(&request.output_path)
        .map_err(|e| StreamingError::Storage(e.to_string()))?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::stripe;

    #[test]
    fn is_encrypted_block_matches_stripe_pattern() {
        assert!(!stripe::is_encrypted_block(0));
        assert!(stripe::is_encrypted_block(2));
    }

    #[test]
    fn block_state_drains_only_complete_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let temp_path = dir.path().join("out.part");
        let writer = StorageWriterBuilder::create(&temp_path).unwrap().build();
        let mut state = BlockState {
            buffer: Vec::new(),
            block_index: 0,
            write_offset: 0,
            total_written: 0,
            total_size: 0,
            storage: writer,
            cipher: Arc::new(PlaceholderCipher),
            track_catalog_id: "1".into(),
            progress: Box::new(|_, _| {}),
            error: None,
        };
        state.buffer = vec![7u8; BLOCK_SIZE + 10];
        state.drain_complete_blocks().unwrap();
        assert_eq!(state.block_index, 1);
        assert_eq!(state.buffer.len(), 10);
        assert_eq!(state.total_written, BLOCK_SIZE as u64);
    }

    #[test]
    fn flush_final_partial_block_writes_remainder() {
        let dir = tempfile::tempdir().unwrap();
        let temp_path = dir.path().join("out.part");
        let writer = StorageWriterBuilder::create(&temp_path).unwrap().build();
        let mut state = BlockState {
            buffer: vec![1u8; 50],
            block_index: 0,
            write_offset: 0,
            total_written: 0,
            total_size: 0,
            storage: writer,
            cipher: Arc::new(PlaceholderCipher),
            track_catalog_id: "1".into(),
            progress: Box::new(|_, _| {}),
            error: None,
        };
        state.flush_final_partial_block().unwrap();
        assert_eq!(state.total_written, 50);
        assert!(state.buffer.is_empty());
    }
}
