//! `sonata pause <id>` -- pause a queued or in-flight item.
//!
//! Pause is in-process state (§4.2): it only has teeth while a `sonata run`
//! daemon is alive to honor it, so this signals the control socket first. As
//! a durable fallback for the no-daemon case, a `downloading` row left from a
//! prior run is reverted to `pending` directly.

use anyhow::Result;
use sonata_core::config;
use sonata_core::model::ItemStatus;
use sonata_core::queue_store::QueueStore;

use crate::cli::control_socket;

pub async fn run_pause(id: &str) -> Result<()> {
    let socket_path = config::control_socket_path()?;
    if control_socket::send_line(&socket_path, &format!("pause {id}")).await? {
        println!("Paused {id}");
        return Ok(());
    }

    let store = QueueStore::open_default().await?;
    match store.get_by_id(id).await? {
        Some(mut item) => {
            if item.status == ItemStatus::Downloading {
                item.status = ItemStatus::Pending;
                item.progress = 0;
                store.update(&item).await?;
            }
            println!("Paused {id}");
        }
        None => println!("No such item: {id}"),
    }
    Ok(())
}
