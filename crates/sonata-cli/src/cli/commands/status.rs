//! `sonata status` -- show queue items, optionally filtered by status.

use anyhow::{bail, Result};
use sonata_core::model::ItemStatus;
use sonata_core::queue_store::QueueStore;

const PAGE_SIZE: i64 = 500;

pub async fn run_status(status: Option<&str>) -> Result<()> {
    let store = QueueStore::open_default().await?;

    let items = match status {
        Some(raw) => {
            let Some(status) = ItemStatus::from_str(raw) else {
                bail!("unknown status {raw:?} (expected pending, downloading, completed, or failed)");
            };
            store.get_by_status(status, 0, PAGE_SIZE).await?
        }
        None => {
            let mut all = Vec::new();
            for status in [
                ItemStatus::Downloading,
                ItemStatus::Pending,
                ItemStatus::Failed,
                ItemStatus::Completed,
            ] {
                all.extend(store.get_by_status(status, 0, PAGE_SIZE).await?);
            }
            all
        }
    };

    if items.is_empty() {
        println!("No items in queue.");
        return Ok(());
    }

    println!("{:<28} {:<8} {:<11} {:<5} {}", "ID", "TYPE", "STATUS", "PROG", "TITLE");
    for item in items {
        println!(
            "{:<28} {:<8} {:<11} {:<5} {}",
            item.id,
            item.item_type.as_str(),
            item.status.as_str(),
            format!("{}%", item.progress),
            item.title.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
