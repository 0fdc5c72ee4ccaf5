//! Bounded worker pool: a fixed-size set of executors consuming a submission
//! channel, each installing a per-job cancellation scope as a child of the
//! pool's root token, invoking a registered handler, and emitting a result.

use crate::model::Job;
use anyhow::Result;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Outcome of one job execution, emitted on the results stream after the
/// handler returns (or is cancelled).
#[derive(Debug, Clone)]
pub struct JobResult {
    pub job_id: String,
    pub success: bool,
    pub error: Option<String>,
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
pub type Handler = Arc<dyn Fn(CancellationToken, Job) -> HandlerFuture + Send + Sync>;

struct Shared {
    active: Mutex<HashSet<String>>,
    job_tokens: Mutex<std::collections::HashMap<String, CancellationToken>>,
    root_token: CancellationToken,
}

/// Fixed-size pool of N executors. `start` spawns the executors and is
/// idempotent-guarded by taking `self` by value for the receiver end, so a
/// given channel can only be drained by one `start` call.
pub struct WorkerPool {
    submit_tx: Mutex<Option<mpsc::Sender<Job>>>,
    shared: Arc<Shared>,
    results_rx: Mutex<Option<mpsc::Receiver<JobResult>>>,
    handles: Mutex<Option<Vec<JoinHandle<()>>>>,
}

impl WorkerPool {
    /// Build and start a pool of `worker_count` executors with a submission
    /// channel of `channel_capacity`, running `handler` for every job.
    pub fn start(worker_count: usize, channel_capacity: usize, handler: Handler) -> Arc<Self> {
        let (submit_tx, submit_rx) = mpsc::channel::<Job>(channel_capacity);
        let (results_tx, results_rx) = mpsc::channel::<JobResult>(channel_capacity.max(1));
        let shared = Arc::new(Shared {
            active: Mutex::new(HashSet::new()),
            job_tokens: Mutex::new(std::collections::HashMap::new()),
            root_token: CancellationToken::new(),
        });

        let submit_rx = Arc::new(tokio::sync::Mutex::new(submit_rx));
        let mut handles = Vec::with_capacity(worker_count.max(1));

        for _ in 0..worker_count.max(1) {
            let submit_rx = Arc::clone(&submit_rx);
            let shared = Arc::clone(&shared);
            let handler = Arc::clone(&handler);
            let results_tx = results_tx.clone();

            let handle = tokio::spawn(async move {
                loop {
                    let job = {
                        let mut rx = submit_rx.lock().await;
                        tokio::select! {
                            biased;
                            _ = shared.root_token.cancelled() => None,
                            job = rx.recv() => job,
                        }
                    };
                    let Some(job) = job else { break };

                    let job_token = shared.root_token.child_token();
                    shared
                        .job_tokens
                        .lock()
                        .unwrap()
                        .insert(job.id.clone(), job_token.clone());
                    shared.active.lock().unwrap().insert(job.id.clone());

                    let job_id = job.id.clone();
                    let outcome = (handler)(job_token, job).await;

                    shared.active.lock().unwrap().remove(&job_id);
                    shared.job_tokens.lock().unwrap().remove(&job_id);

                    let result = match outcome {
                        Ok(()) => JobResult {
                            job_id,
                            success: true,
                            error: None,
                        },
                        Err(e) => JobResult {
                            job_id,
                            success: false,
                            error: Some(e.to_string()),
                        },
                    };
                    let _ = results_tx.send(result).await;
                }
            });
            handles.push(handle);
        }

        Arc::new(Self {
            submit_tx: Mutex::new(Some(submit_tx)),
            shared,
            results_rx: Mutex::new(Some(results_rx)),
            handles: Mutex::new(Some(handles)),
        })
    }

    /// Submit a job. Fails if the pool is stopping (channel closed) or the
    /// channel is full and the caller used `try_submit` instead.
    pub async fn submit(&self, job: Job) -> Result<()> {
        let tx = self.submit_tx.lock().unwrap().clone();
        let Some(tx) = tx else {
            return Err(anyhow::anyhow!("worker pool is stopping"));
        };
        tx.send(job)
            .await
            .map_err(|_| anyhow::anyhow!("worker pool is stopping"))
    }

    pub fn cancel_job(&self, id: &str) {
        if let Some(token) = self.shared.job_tokens.lock().unwrap().get(id) {
            token.cancel();
        }
    }

    pub fn cancel_all(&self) {
        self.shared.root_token.cancel();
    }

    pub fn is_job_active(&self, id: &str) -> bool {
        self.shared.active.lock().unwrap().contains(id)
    }

    /// Take the results receiver. Can only be taken once; intended for a
    /// single dedicated result-consumer task.
    pub fn take_results(&self) -> Option<mpsc::Receiver<JobResult>> {
        self.results_rx.lock().unwrap().take()
    }

    /// Cancel the pool's root scope, close the submission channel, wait for
    /// every executor to drain its in-flight handler and exit, then close
    /// the results stream. Once this returns, no executor can still be
    /// holding a store handle, so callers are safe to tear down shared state
    /// (e.g. `QueueStore::clear_all`) immediately after.
    pub async fn stop(&self) {
        self.shared.root_token.cancel();
        self.submit_tx.lock().unwrap().take();

        let handles = self.handles.lock().unwrap().take();
        if let Some(handles) = handles {
            for handle in handles {
                let _ = handle.await;
            }
        }

        self.results_rx.lock().unwrap().take();
    }
}
