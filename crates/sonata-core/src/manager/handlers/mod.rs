//! Job-type dispatch: one handler module per `ItemType`.

pub mod album;
pub mod playlist;
pub mod track;

use tokio_util::sync::CancellationToken;

use crate::model::{ItemType, Job};
use crate::worker_pool::WorkerPool;

use super::context::ManagerContext;
use super::error::ManagerError;

pub async fn dispatch(
    ctx: &ManagerContext,
    pool: &WorkerPool,
    cancel: CancellationToken,
    job: Job,
) -> Result<(), ManagerError> {
    match job.item_type {
        ItemType::Track => track::handle(ctx, cancel, job).await,
        ItemType::Album => album::handle(ctx, pool, cancel, job).await,
        ItemType::Playlist => playlist::handle(ctx, pool, cancel, job).await,
    }
}
