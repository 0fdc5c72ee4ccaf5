//! Translates worker `JobResult`s into retries or terminal failures (§4.4.4).
//! The sole place that consults `RetryPolicy::decide` -- handlers only
//! classify an error, they never decide whether it gets retried.

use std::sync::Arc;
use std::time::Duration;

use crate::model::ItemStatus;
use crate::progress::{NotifierEvent, StatusKind};
use crate::queue_store::FailedTrackRecord;
use crate::retry::{ErrorKind, RetryDecision};
use crate::worker_pool::{JobResult, WorkerPool};

use super::aggregation::aggregate_parent;
use super::context::{unix_timestamp, ManagerContext};
use super::error::{store_err, ManagerError};
use super::reconstruct::job_from_item;

/// Spawns the consumer loop. Takes the pool's results receiver -- can only be
/// called once, same restriction as `WorkerPool::take_results`.
pub fn spawn(ctx: Arc<ManagerContext>, pool: Arc<WorkerPool>) {
    let Some(mut results) = pool.take_results() else {
        return;
    };
    tokio::spawn(async move {
        while let Some(result) = results.recv().await {
            let ctx = Arc::clone(&ctx);
            let pool = Arc::clone(&pool);
            if let Err(e) = process_result(ctx, pool, result).await {
                tracing::warn!(error = %e, "result consumer failed to process job result");
            }
        }
    });
}

async fn process_result(
    ctx: Arc<ManagerContext>,
    pool: Arc<WorkerPool>,
    result: JobResult,
) -> Result<(), ManagerError> {
    if result.success {
        // Terminal success is recorded by the handler itself (§4.4.2 step 12).
        return Ok(());
    }

    let Some(mut item) = ctx.store.get_by_id(&result.job_id).await.map_err(store_err)? else {
        return Ok(());
    };

    let kind = ctx
        .error_registry
        .take(&result.job_id)
        .unwrap_or(ErrorKind::Network);
    let message = result.error.unwrap_or_else(|| "unknown error".to_string());

    if kind == ErrorKind::Paused {
        // Pause is not an error for retry-accounting purposes (§4.4.4).
        item.status = ItemStatus::Pending;
        item.error_message = None;
        ctx.store.update(&item).await.map_err(store_err)?;
        return Ok(());
    }

    item.retry_count += 1;
    item.status = ItemStatus::Failed;
    item.error_message = Some(message.clone());
    ctx.store.update(&item).await.map_err(store_err)?;

    match ctx.retry_policy.decide(item.retry_count, kind) {
        RetryDecision::RetryAfter(delay) => {
            schedule_retry(ctx, pool, item, delay);
        }
        RetryDecision::NoRetry => {
            ctx.notifier.emit(NotifierEvent::Status {
                id: item.id.clone(),
                status: StatusKind::Failed,
                error_message: Some(message.clone()),
                ts: unix_timestamp(),
            });
            if let Some(parent_id) = item.parent_id.clone() {
                ctx.store
                    .add_failed_track(&FailedTrackRecord {
                        parent_id: parent_id.clone(),
                        item_id: item.id.clone(),
                        title: item.title.clone(),
                        error_message: Some(message),
                        retry_count: item.retry_count,
                        failed_at: unix_timestamp(),
                    })
                    .await
                    .map_err(store_err)?;
                aggregate_parent(&ctx, &parent_id).await?;
            }
        }
    }

    Ok(())
}

/// The resubmission must carry the original catalog ids derived from the
/// item id (§4.4.4 step 2) -- `reconstruct::job_from_item` is the single
/// place that derivation happens, shared with the scavenger.
fn schedule_retry(ctx: Arc<ManagerContext>, pool: Arc<WorkerPool>, item: crate::model::QueueItem, delay: Duration) {
    let Some(job) = job_from_item(&item) else {
        tracing::warn!(item_id = %item.id, "cannot reconstruct job for retry, id does not decompose");
        return;
    };
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if ctx.control.is_paused(&job.id) {
            return;
        }
        if let Err(e) = pool.submit(job).await {
            tracing::warn!(error = %e, item_id = %item.id, "failed to resubmit job after retry backoff");
        }
    });
}
