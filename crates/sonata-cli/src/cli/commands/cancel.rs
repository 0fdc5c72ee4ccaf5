//! `sonata cancel <id>` -- stop an item outright and drop its row.

use anyhow::Result;
use sonata_core::config;
use sonata_core::queue_store::QueueStore;

use crate::cli::control_socket;

pub async fn run_cancel(id: &str) -> Result<()> {
    let socket_path = config::control_socket_path()?;
    if control_socket::send_line(&socket_path, &format!("cancel {id}")).await? {
        println!("Cancelled {id}");
        return Ok(());
    }

    let store = QueueStore::open_default().await?;
    store.delete(id).await?;
    println!("Cancelled {id}");
    Ok(())
}
