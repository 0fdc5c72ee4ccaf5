//! Periodic sweep that resubmits pending items the pool has lost track of
//! (§4.4.1) -- a crash or a missed `submit` is the only way an item sits in
//! `pending` with nothing driving it forward.

use std::sync::Arc;
use std::time::Duration;

use crate::model::ItemStatus;
use crate::worker_pool::WorkerPool;

use super::context::ManagerContext;
use super::reconstruct::job_from_item;

const SWEEP_INTERVAL: Duration = Duration::from_secs(5);

pub fn spawn(ctx: Arc<ManagerContext>, pool: Arc<WorkerPool>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await; // first tick fires immediately, skip it
        loop {
            ticker.tick().await;
            if let Err(e) = sweep(&ctx, &pool).await {
                tracing::warn!(error = %e, "scavenger sweep failed");
            }
        }
    });
}

async fn sweep(ctx: &ManagerContext, pool: &WorkerPool) -> anyhow::Result<()> {
    let limit = (ctx.config.concurrent_downloads * 2).max(1);
    let pending = ctx.store.get_pending(limit).await?;

    for item in pending {
        if item.status != ItemStatus::Pending {
            continue;
        }
        if pool.is_job_active(&item.id) {
            continue;
        }
        if ctx.control.is_paused(&item.id) {
            continue;
        }
        let Some(job) = job_from_item(&item) else {
            tracing::warn!(item_id = %item.id, "scavenger cannot reconstruct job, id does not decompose");
            continue;
        };
        if let Err(e) = pool.submit(job).await {
            tracing::warn!(error = %e, item_id = %item.id, "scavenger failed to resubmit stalled job");
        }
    }

    Ok(())
}
