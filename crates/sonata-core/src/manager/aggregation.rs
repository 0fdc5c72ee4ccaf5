//! Parent aggregation (§4.4.3b): recomputes an album/playlist aggregate's
//! counters whenever one of its children reaches a terminal state. Safe
//! under concurrent child completions because the store serializes
//! read-modify-write on a single row by id (§5) -- no additional
//! in-process lock is needed here, same reasoning the teacher's
//! `ResumeDb::set_state`/`update_metadata` rely on.

use super::context::{unix_timestamp, ManagerContext};
use super::error::{store_err, ManagerError};
use crate::model::ItemStatus;
use crate::progress::{NotifierEvent, StatusKind};

pub async fn aggregate_parent(ctx: &ManagerContext, parent_id: &str) -> Result<(), ManagerError> {
    let mut parent = match ctx.store.get_by_id(parent_id).await.map_err(store_err)? {
        Some(p) => p,
        None => return Ok(()),
    };

    // Already closed (P2: completes at most once). A track handler re-runs
    // this unconditionally on every entry, including the idempotent
    // already-`Completed` short-circuit (P9), so a terminal parent must be a
    // no-op rather than re-stamping `completed_at` and re-emitting the event.
    if parent.status == ItemStatus::Completed {
        return Ok(());
    }

    let max_retries = ctx.retry_policy.max_retries;
    let completed = ctx
        .store
        .count_completed_children(parent_id)
        .await
        .map_err(store_err)?;
    let finished = ctx
        .store
        .count_finished_children(parent_id, max_retries)
        .await
        .map_err(store_err)?;

    parent.completed_tracks = Some(completed);
    let total = parent.total_tracks.unwrap_or(0);

    if total > 0 && finished >= total {
        parent.status = ItemStatus::Completed;
        parent.progress = 100;
        parent.completed_at = Some(unix_timestamp());
        ctx.store.update(&parent).await.map_err(store_err)?;
        ctx.notifier.emit(NotifierEvent::Status {
            id: parent_id.to_string(),
            status: StatusKind::Completed,
            error_message: None,
            ts: unix_timestamp(),
        });
    } else {
        parent.recompute_aggregate_progress();
        let percent = parent.progress;
        ctx.store.update(&parent).await.map_err(store_err)?;
        ctx.notifier.emit(NotifierEvent::Progress {
            id: parent_id.to_string(),
            percent,
            bytes: 0,
            total: 0,
            speed: 0.0,
            eta: 0.0,
            ts: unix_timestamp(),
        });
    }

    Ok(())
}
