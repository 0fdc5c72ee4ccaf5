//! Control socket: server (during `sonata run`) and client (for `sonata
//! pause`/`resume`/`cancel`/`stop-all`), so a separate CLI invocation can
//! reach a live daemon's in-process pause flags and worker-pool cancellation
//! tokens, neither of which survives outside that process.
//!
//! Protocol: one line per command -- `pause <id>`, `resume <id>`,
//! `cancel <id>`, or `stop_all`. Malformed lines are ignored.

use anyhow::Result;
use sonata_core::manager::DownloadManager;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

/// Spawns a task that listens on `path` and dispatches each line to the
/// matching [`DownloadManager`] method. Returns once the listener is bound;
/// the accept loop itself runs in the background.
pub fn spawn_control_listener(manager: Arc<DownloadManager>, path: impl AsRef<Path>) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    let handle = tokio::spawn(async move {
        let _ = std::fs::remove_file(&path);
        let listener = match UnixListener::bind(&path) {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(path = %path.display(), "control socket bind: {}", e);
                return;
            }
        };
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let manager = Arc::clone(&manager);
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            handle_line(&manager, line.trim()).await;
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

async fn handle_line(manager: &Arc<DownloadManager>, line: &str) {
    let result = if let Some(id) = line.strip_prefix("pause ") {
        manager.pause(id.trim()).await
    } else if let Some(id) = line.strip_prefix("resume ") {
        manager.resume(id.trim()).await
    } else if let Some(id) = line.strip_prefix("cancel ") {
        manager.cancel(id.trim()).await
    } else if line == "stop_all" {
        manager.stop_all().await
    } else {
        tracing::debug!(line, "control socket: unrecognized command");
        return;
    };
    if let Err(e) = result {
        tracing::warn!(line, error = %e, "control socket command failed");
    }
}

/// Sends `line` to the control socket at `path` if a daemon is listening.
/// Returns `Ok(true)` if the line was delivered, `Ok(false)` if no socket is
/// present (the caller should fall back to a direct store mutation).
pub async fn send_line(path: &Path, line: &str) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let mut stream = match tokio::net::UnixStream::connect(path).await {
        Ok(s) => s,
        Err(_) => return Ok(false),
    };
    stream.write_all(format!("{line}\n").as_bytes()).await?;
    Ok(true)
}
