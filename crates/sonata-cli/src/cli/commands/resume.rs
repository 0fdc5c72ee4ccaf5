//! `sonata resume <id>` -- clear a paused item so it is picked up again.

use anyhow::Result;
use sonata_core::config;
use sonata_core::model::ItemStatus;
use sonata_core::queue_store::QueueStore;

use crate::cli::control_socket;

pub async fn run_resume(id: &str) -> Result<()> {
    let socket_path = config::control_socket_path()?;
    if control_socket::send_line(&socket_path, &format!("resume {id}")).await? {
        println!("Resumed {id}");
        return Ok(());
    }

    let store = QueueStore::open_default().await?;
    match store.get_by_id(id).await? {
        Some(mut item) => {
            if item.status != ItemStatus::Completed {
                item.status = ItemStatus::Pending;
                store.update(&item).await?;
            }
            println!("Resumed {id}");
        }
        None => println!("No such item: {id}"),
    }
    Ok(())
}
