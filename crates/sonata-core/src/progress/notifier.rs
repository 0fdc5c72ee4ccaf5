//! Single-writer progress/status broadcast coordinator.
//!
//! All subscriber registration and event delivery flows through one loop
//! task reading a command channel, so no caller ever mutates the subscriber
//! set directly (avoids the write-to-closed-channel class of bug that a
//! directly-shared `Vec<Sender>` invites under concurrent handlers).

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Started,
    Completed,
    Failed,
}

/// An event broadcast to subscribers. Serializes as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum NotifierEvent {
    Progress {
        id: String,
        percent: u8,
        bytes: u64,
        total: u64,
        speed: f64,
        eta: f64,
        ts: i64,
    },
    Status {
        id: String,
        status: StatusKind,
        error_message: Option<String>,
        ts: i64,
    },
    Custom {
        id: String,
        name: String,
        payload: serde_json::Value,
        ts: i64,
    },
}

enum Command {
    Register(u64, mpsc::UnboundedSender<NotifierEvent>),
    Unregister(u64),
    Broadcast(NotifierEvent),
}

/// Read-only snapshot of aggregate counters, for poll-based consumers that
/// don't want to hold a live subscription.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifierSnapshot {
    pub total_started: u64,
    pub total_succeeded: u64,
    pub total_failed: u64,
}

impl NotifierSnapshot {
    pub fn success_rate(&self) -> f64 {
        let finished = self.total_succeeded + self.total_failed;
        if finished == 0 {
            return 1.0;
        }
        self.total_succeeded as f64 / finished as f64
    }
}

#[derive(Default)]
struct Counters {
    started: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Cheaply-clonable handle used by handlers to emit events and register subscribers.
#[derive(Clone)]
pub struct NotifierHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    next_subscriber_id: Arc<AtomicU64>,
    counters: Arc<Counters>,
}

impl NotifierHandle {
    pub fn emit(&self, event: NotifierEvent) {
        if let NotifierEvent::Status { status, .. } = &event {
            match status {
                StatusKind::Started => self.counters.started.fetch_add(1, Ordering::Relaxed),
                StatusKind::Completed => self.counters.succeeded.fetch_add(1, Ordering::Relaxed),
                StatusKind::Failed => self.counters.failed.fetch_add(1, Ordering::Relaxed),
            };
        }
        let _ = self.cmd_tx.send(Command::Broadcast(event));
    }

    /// Register a new subscriber, returning its id (for `unregister`) and an
    /// unbounded receiver of events.
    pub fn subscribe(&self) -> (u64, mpsc::UnboundedReceiver<NotifierEvent>) {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = self.cmd_tx.send(Command::Register(id, tx));
        (id, rx)
    }

    pub fn unsubscribe(&self, id: u64) {
        let _ = self.cmd_tx.send(Command::Unregister(id));
    }

    pub fn snapshot(&self) -> NotifierSnapshot {
        NotifierSnapshot {
            total_started: self.counters.started.load(Ordering::Relaxed),
            total_succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            total_failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

/// Owns the subscriber set and the event loop. `spawn` starts the loop task
/// and returns a [`NotifierHandle`] for publishing/subscribing.
pub struct ProgressNotifier;

impl ProgressNotifier {
    pub fn spawn() -> NotifierHandle {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
        let counters = Arc::new(Counters::default());
        let handle = NotifierHandle {
            cmd_tx,
            next_subscriber_id: Arc::new(AtomicU64::new(0)),
            counters,
        };

        tokio::spawn(async move {
            let subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<NotifierEvent>>> =
                Mutex::new(HashMap::new());
            while let Some(cmd) = cmd_rx.recv().await {
                match cmd {
                    Command::Register(id, tx) => {
                        subscribers.lock().await.insert(id, tx);
                    }
                    Command::Unregister(id) => {
                        subscribers.lock().await.remove(&id);
                    }
                    Command::Broadcast(event) => {
                        let mut subs = subscribers.lock().await;
                        subs.retain(|_, tx| tx.send(event.clone()).is_ok());
                    }
                }
            }
        });

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_broadcast_events() {
        let handle = ProgressNotifier::spawn();
        let (_id, mut rx) = handle.subscribe();

        handle.emit(NotifierEvent::Status {
            id: "track_1".into(),
            status: StatusKind::Started,
            error_message: None,
            ts: 0,
        });

        let event = rx.recv().await.unwrap();
        match event {
            NotifierEvent::Status { id, status, .. } => {
                assert_eq!(id, "track_1");
                assert_eq!(status, StatusKind::Started);
            }
            _ => panic!("unexpected event"),
        }
    }

    #[tokio::test]
    async fn unsubscribed_subscriber_does_not_receive_events() {
        let handle = ProgressNotifier::spawn();
        let (id, mut rx) = handle.subscribe();
        handle.unsubscribe(id);
        // Give the loop a chance to process the unregister before broadcasting.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        handle.emit(NotifierEvent::Status {
            id: "track_1".into(),
            status: StatusKind::Completed,
            error_message: None,
            ts: 0,
        });

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn snapshot_tracks_started_succeeded_failed() {
        let handle = ProgressNotifier::spawn();
        handle.emit(NotifierEvent::Status {
            id: "a".into(),
            status: StatusKind::Started,
            error_message: None,
            ts: 0,
        });
        handle.emit(NotifierEvent::Status {
            id: "a".into(),
            status: StatusKind::Completed,
            error_message: None,
            ts: 0,
        });
        handle.emit(NotifierEvent::Status {
            id: "b".into(),
            status: StatusKind::Failed,
            error_message: Some("x".into()),
            ts: 0,
        });

        let snap = handle.snapshot();
        assert_eq!(snap.total_started, 1);
        assert_eq!(snap.total_succeeded, 1);
        assert_eq!(snap.total_failed, 1);
        assert_eq!(snap.success_rate(), 0.5);
    }

    #[test]
    fn event_json_envelope_shape() {
        let e = NotifierEvent::Progress {
            id: "track_1".into(),
            percent: 50,
            bytes: 500,
            total: 1000,
            speed: 100.0,
            eta: 5.0,
            ts: 0,
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["payload"]["id"], "track_1");
    }
}
