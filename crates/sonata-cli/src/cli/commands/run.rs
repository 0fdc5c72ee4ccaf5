//! `sonata run` -- recover interrupted downloads, then drive the worker pool
//! until interrupted (Ctrl-C), printing progress/status events as they
//! arrive. Mirrors the teacher's `run_scheduler`: recover -> start workers ->
//! stream progress to the terminal -> block until the run is done.

use anyhow::Result;
use sonata_core::catalog::UnimplementedCatalogClient;
use sonata_core::config::{self, SonataConfig};
use sonata_core::manager::{DownloadManager, ManagerDeps};
use sonata_core::progress::{NotifierEvent, StatusKind};
use sonata_core::queue_store::QueueStore;
use sonata_core::tagging::{NullLyricsWriter, NullTagWriter};
use std::sync::Arc;

use crate::cli::control_socket;

pub async fn run_run(mut cfg: SonataConfig, jobs: Option<usize>) -> Result<()> {
    if let Some(jobs) = jobs {
        cfg.concurrent_downloads = jobs.max(1);
    }

    let store = QueueStore::open_default().await?;
    let deps = ManagerDeps {
        store,
        catalog: Arc::new(UnimplementedCatalogClient),
        tag_writer: Arc::new(NullTagWriter),
        lyrics_writer: Arc::new(NullLyricsWriter),
        config: cfg,
    };
    let manager = DownloadManager::new(deps);
    manager.start().await?;

    if let Ok(socket_path) = config::control_socket_path() {
        match control_socket::spawn_control_listener(Arc::clone(&manager), &socket_path) {
            Ok(_) => tracing::debug!(path = %socket_path.display(), "control socket listening"),
            Err(e) => tracing::warn!(error = %e, "failed to start control socket"),
        }
    }

    let (_sub_id, mut events) = manager.subscribe();
    let progress_handle = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    });

    println!("sonata running. Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;
    println!("\nshutting down...");

    progress_handle.abort();
    let snap = manager.snapshot();
    println!(
        "done: {} started, {} succeeded, {} failed",
        snap.total_started, snap.total_succeeded, snap.total_failed
    );
    Ok(())
}

fn print_event(event: &NotifierEvent) {
    match event {
        NotifierEvent::Progress { id, percent, .. } => {
            print!("\r{id}: {percent}%          ");
        }
        NotifierEvent::Status { id, status, error_message, .. } => {
            let label = match status {
                StatusKind::Started => "started".to_string(),
                StatusKind::Completed => "completed".to_string(),
                StatusKind::Failed => format!("failed ({})", error_message.as_deref().unwrap_or("unknown error")),
            };
            println!("\n{id}: {label}");
        }
        NotifierEvent::Custom { id, name, .. } => {
            println!("\n{id}: {name}");
        }
    }
}
