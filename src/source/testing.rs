//! In-memory source for exercising the sync loop without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{ControlReply, ControlSource, StatusSnapshot, StatusSource};
use crate::error::MonitorError;

/// Source that replays scripted responses and counts requests.
///
/// Snapshot requests pop from a queue; when the queue is empty the last
/// successful snapshot is repeated. When gated, each snapshot request waits
/// for [`release`](Self::release) before answering.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    snapshots: Mutex<VecDeque<Result<StatusSnapshot, MonitorError>>>,
    last: Mutex<Option<StatusSnapshot>>,
    start_replies: Mutex<VecDeque<Result<ControlReply, MonitorError>>>,
    stop_replies: Mutex<VecDeque<Result<ControlReply, MonitorError>>>,
    gate: Option<Arc<Semaphore>>,
    pub snapshot_requests: AtomicUsize,
    pub start_requests: AtomicUsize,
    pub stop_requests: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A source whose snapshot requests block until released.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        })
    }

    pub fn push_snapshot(&self, snapshot: StatusSnapshot) {
        self.snapshots.lock().unwrap().push_back(Ok(snapshot));
    }

    pub fn push_snapshot_error(&self, err: MonitorError) {
        self.snapshots.lock().unwrap().push_back(Err(err));
    }

    pub fn push_start_reply(&self, reply: Result<ControlReply, MonitorError>) {
        self.start_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_stop_reply(&self, reply: Result<ControlReply, MonitorError>) {
        self.stop_replies.lock().unwrap().push_back(reply);
    }

    /// Let one gated snapshot request complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn total_requests(&self) -> usize {
        self.snapshot_requests.load(Ordering::SeqCst)
            + self.start_requests.load(Ordering::SeqCst)
            + self.stop_requests.load(Ordering::SeqCst)
    }
}

/// A monitoring snapshot listing `(address, latency_ms, status_message)` in order.
pub fn snapshot_of(entries: &[(&str, f64, &str)]) -> StatusSnapshot {
    let mut snapshot = StatusSnapshot {
        is_monitoring: true,
        ..Default::default()
    };
    for (address, latency, status) in entries {
        snapshot.targets.push(address.to_string());
        snapshot.current_latencies.insert(address.to_string(), *latency);
        snapshot.status_messages.insert(address.to_string(), status.to_string());
    }
    snapshot
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_snapshot(&self) -> Result<StatusSnapshot, MonitorError> {
        self.snapshot_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let next = self.snapshots.lock().unwrap().pop_front();
        match next {
            Some(Ok(snapshot)) => {
                *self.last.lock().unwrap() = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(Err(err)) => Err(err),
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| MonitorError::Transport("no scripted snapshot".to_string())),
        }
    }

    fn description(&self) -> &str {
        "scripted"
    }
}

#[async_trait]
impl ControlSource for ScriptedSource {
    async fn start(&self, target: &str) -> Result<ControlReply, MonitorError> {
        self.start_requests.fetch_add(1, Ordering::SeqCst);
        self.start_replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(ControlReply {
                message: "Monitoring Started".to_string(),
                targets: vec![target.to_string()],
            })
        })
    }

    async fn stop(&self) -> Result<ControlReply, MonitorError> {
        self.stop_requests.fetch_add(1, Ordering::SeqCst);
        self.stop_replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(ControlReply {
                message: "Stopped".to_string(),
                targets: Vec::new(),
            })
        })
    }
}
