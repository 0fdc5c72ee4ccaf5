//! `sonata stop-all` -- cancel every active job and clear the whole queue.

use anyhow::Result;
use sonata_core::config;
use sonata_core::queue_store::QueueStore;

use crate::cli::control_socket;

pub async fn run_stop_all() -> Result<()> {
    let socket_path = config::control_socket_path()?;
    if control_socket::send_line(&socket_path, "stop_all").await? {
        println!("Stopped all downloads and cleared the queue.");
        return Ok(());
    }

    let store = QueueStore::open_default().await?;
    store.clear_all().await?;
    println!("Cleared the queue.");
    Ok(())
}
