//! Polling and reconciliation of the status source.
//!
//! [`SyncLoop`] is a two-state machine (Idle, Polling) that decides when to
//! talk to the backend but never waits for it. Requests run as tokio tasks and
//! report back through a channel; their results are applied only when the
//! owner calls [`SyncLoop::drain`] (or awaits [`SyncLoop::settle`]), so every
//! mutation of the view model happens on the owner's thread.
//!
//! ```text
//!            start() + reply ok
//!   ┌──────┐ ─────────────────▶ ┌─────────┐ ──tick()──▶ fetch task
//!   │ Idle │                    │ Polling │ ◀─drain()── snapshot / error
//!   └──────┘ ◀───────────────── └─────────┘
//!                  stop()
//! ```
//!
//! Every snapshot request is tagged with the generation that was current when
//! it was issued. `start` success, `stop`, and `shutdown` bump the generation,
//! so a snapshot that lands after the session changed is dropped instead of
//! being reconciled into a view that no longer exists. Start replies are tagged
//! with the epoch instead, which only `stop` and `shutdown` advance: overlapping
//! starts all get their reply applied. At most one snapshot request is in
//! flight at a time; ticks that fire while one is outstanding are skipped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::history::DEFAULT_HISTORY_CAPACITY;
use crate::data::TargetSet;
use crate::error::MonitorError;
use crate::source::{ControlReply, ControlSource, StatusSnapshot, StatusSource};

/// Tunables for the sync loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    /// Time between snapshot requests while polling.
    pub poll_interval: Duration,
    /// Samples kept per target.
    pub history_capacity: usize,
    /// Address prefixes accepted by [`SyncLoop::start`].
    pub accepted_schemes: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            accepted_schemes: vec!["http://".to_string(), "https://".to_string()],
        }
    }
}

/// Whether a monitoring session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Polling,
}

/// An active monitoring session.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringSession {
    /// The address monitoring was started with.
    pub target: String,
    /// Addresses the backend decided to watch for this session.
    pub monitored: Vec<String>,
    pub started_at: DateTime<Utc>,
    /// When the last snapshot was reconciled, if any.
    pub last_reconciled_at: Option<DateTime<Utc>>,
}

/// Result of a call to [`SyncLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session is active.
    Idle,
    /// The poll interval has not elapsed yet.
    NotDue,
    /// A previous request is still outstanding; this tick is skipped.
    InFlight,
    /// A snapshot request was issued.
    Requested,
}

/// Something that changed as a result of applying a completed request.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncUpdate {
    /// The backend accepted a start request; polling has begun.
    Started { target: String, message: String },
    /// The backend refused or could not receive a start request.
    StartFailed(MonitorError),
    /// The backend acknowledged a stop request.
    Stopped,
    /// A stop request failed. Local state is Idle regardless.
    StopFailed(MonitorError),
    /// A snapshot was merged into the view model.
    Reconciled { targets: usize },
    /// A snapshot request failed; the previous view model is kept.
    PollFailed(MonitorError),
    /// A response arrived for an outdated session and was dropped.
    Discarded,
}

impl SyncUpdate {
    /// A message worth showing to the user, if any.
    pub fn notice(&self) -> Option<String> {
        match self {
            SyncUpdate::Started { message, .. } => Some(message.clone()),
            SyncUpdate::StartFailed(err) => Some(format!("Start failed: {}", err)),
            SyncUpdate::StopFailed(err) => Some(format!("Failed to stop: {}", err)),
            SyncUpdate::PollFailed(err) => Some(format!("Backend connection lost: {}", err)),
            SyncUpdate::Stopped | SyncUpdate::Reconciled { .. } | SyncUpdate::Discarded => None,
        }
    }
}

/// Completed request, as delivered by a spawned task.
#[derive(Debug)]
enum SyncEvent {
    Started {
        epoch: u64,
        target: String,
        result: Result<ControlReply, MonitorError>,
    },
    Stopped {
        result: Result<ControlReply, MonitorError>,
    },
    Polled {
        generation: u64,
        result: Result<StatusSnapshot, MonitorError>,
    },
}

/// Owns the monitoring session and is the only writer of target records.
#[derive(Debug)]
pub struct SyncLoop {
    status: Arc<dyn StatusSource>,
    control: Arc<dyn ControlSource>,
    options: SyncOptions,

    session: Option<MonitoringSession>,
    targets: TargetSet,
    generation: u64,
    epoch: u64,
    in_flight: bool,
    pending_start: Option<String>,
    last_tick: Option<Instant>,
    last_error: Option<MonitorError>,

    events_tx: mpsc::UnboundedSender<SyncEvent>,
    events_rx: mpsc::UnboundedReceiver<SyncEvent>,
}

impl SyncLoop {
    /// Create an idle loop. Requests are spawned onto the ambient tokio runtime.
    pub fn new(
        status: Arc<dyn StatusSource>,
        control: Arc<dyn ControlSource>,
        options: SyncOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            status,
            control,
            options,
            session: None,
            targets: TargetSet::new(),
            generation: 0,
            epoch: 0,
            in_flight: false,
            pending_start: None,
            last_tick: None,
            last_error: None,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> SyncState {
        if self.session.is_some() {
            SyncState::Polling
        } else {
            SyncState::Idle
        }
    }

    pub fn session(&self) -> Option<&MonitoringSession> {
        self.session.as_ref()
    }

    /// The reconciled view model.
    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// The most recent poll failure, cleared by the next successful poll.
    pub fn last_error(&self) -> Option<&MonitorError> {
        self.last_error.as_ref()
    }

    /// Whether the last poll of the active session failed.
    pub fn is_disconnected(&self) -> bool {
        self.session.is_some() && self.last_error.is_some()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// The address of a start request awaiting its reply.
    pub fn pending_start(&self) -> Option<&str> {
        self.pending_start.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source_description(&self) -> &str {
        self.status.description()
    }

    /// Whether a tick at `now` would issue a request.
    pub fn is_tick_due(&self, now: Instant) -> bool {
        self.session.is_some()
            && !self.in_flight
            && self
                .last_tick
                .is_none_or(|last| now.saturating_duration_since(last) >= self.options.poll_interval)
    }

    /// Validate `raw` and ask the backend to start monitoring it.
    ///
    /// Invalid addresses fail immediately with [`MonitorError::Validation`]
    /// and nothing is sent. Otherwise the request is spawned and the outcome
    /// is reported by a later [`drain`](Self::drain) as
    /// [`SyncUpdate::Started`] or [`SyncUpdate::StartFailed`].
    pub fn start(&mut self, raw: &str) -> Result<(), MonitorError> {
        let target = validate_target(raw, &self.options.accepted_schemes)?;
        info!(target_url = %target, "requesting start");

        let control = Arc::clone(&self.control);
        let tx = self.events_tx.clone();
        let epoch = self.epoch;
        self.pending_start = Some(target.clone());

        tokio::spawn(async move {
            let result = control.start(&target).await;
            let _ = tx.send(SyncEvent::Started {
                epoch,
                target,
                result,
            });
        });
        Ok(())
    }

    /// Stop monitoring.
    ///
    /// Local state becomes Idle immediately, whatever the backend answers; the
    /// stop request itself is best effort and its failure is only reported.
    /// The last reconciled targets stay visible until a new session replaces
    /// them.
    pub fn stop(&mut self) {
        info!(generation = self.generation, "stopping monitoring");
        self.end_session();

        let control = Arc::clone(&self.control);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = control.stop().await;
            let _ = tx.send(SyncEvent::Stopped { result });
        });
    }

    /// Tear down: end the session and forget all targets. Responses still in
    /// flight are discarded when they arrive.
    pub fn shutdown(&mut self) {
        debug!(generation = self.generation, "sync loop shutting down");
        self.end_session();
        self.targets.clear();
    }

    fn end_session(&mut self) {
        self.session = None;
        self.generation += 1;
        self.epoch += 1;
        self.in_flight = false;
        self.pending_start = None;
        self.last_tick = None;
        self.last_error = None;
    }

    /// Issue a snapshot request if polling, due, and nothing is in flight.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.session.is_none() {
            return TickOutcome::Idle;
        }
        if self.in_flight {
            debug!("previous snapshot request still in flight, skipping tick");
            return TickOutcome::InFlight;
        }
        if !self.is_tick_due(now) {
            return TickOutcome::NotDue;
        }

        self.last_tick = Some(now);
        self.in_flight = true;

        let status = Arc::clone(&self.status);
        let tx = self.events_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = status.fetch_snapshot().await;
            let _ = tx.send(SyncEvent::Polled { generation, result });
        });

        TickOutcome::Requested
    }

    /// Apply every completed request without blocking.
    pub fn drain(&mut self) -> Vec<SyncUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            updates.push(self.apply(event));
        }
        updates
    }

    /// Wait for the next completed request and apply it.
    pub async fn settle(&mut self) -> Option<SyncUpdate> {
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    /// Drain completed requests, then tick. Called once per UI frame.
    pub fn pump(&mut self, now: Instant) -> Vec<SyncUpdate> {
        let updates = self.drain();
        self.tick(now);
        updates
    }

    fn ensure_current(current: u64, tagged: u64) -> Result<(), MonitorError> {
        if tagged == current {
            Ok(())
        } else {
            Err(MonitorError::StaleResponse)
        }
    }

    fn apply(&mut self, event: SyncEvent) -> SyncUpdate {
        match event {
            SyncEvent::Started {
                epoch,
                target,
                result,
            } => {
                if let Err(err) = Self::ensure_current(self.epoch, epoch) {
                    debug!(target_url = %target, error = %err, "dropping start reply");
                    return SyncUpdate::Discarded;
                }
                if self.pending_start.as_deref() == Some(target.as_str()) {
                    self.pending_start = None;
                }

                match result {
                    Ok(reply) => {
                        self.generation += 1;
                        self.in_flight = false;
                        self.last_tick = None;
                        self.last_error = None;
                        self.session = Some(MonitoringSession {
                            target: target.clone(),
                            monitored: reply.targets,
                            started_at: Utc::now(),
                            last_reconciled_at: None,
                        });
                        info!(target_url = %target, generation = self.generation, "monitoring started");
                        let message = if reply.message.is_empty() {
                            format!("Monitoring {}", target)
                        } else {
                            reply.message
                        };
                        SyncUpdate::Started { target, message }
                    }
                    Err(err) => {
                        warn!(target_url = %target, error = %err, "start request failed");
                        SyncUpdate::StartFailed(err)
                    }
                }
            }
            SyncEvent::Stopped { result } => match result {
                Ok(_) => {
                    info!("backend acknowledged stop");
                    SyncUpdate::Stopped
                }
                Err(err) => {
                    warn!(error = %err, "stop request failed");
                    SyncUpdate::StopFailed(err)
                }
            },
            SyncEvent::Polled { generation, result } => {
                if let Err(err) = Self::ensure_current(self.generation, generation) {
                    debug!(generation, current = self.generation, error = %err, "dropping snapshot");
                    return SyncUpdate::Discarded;
                }
                self.in_flight = false;

                match result {
                    Ok(snapshot) => {
                        let now = Utc::now();
                        self.targets.reconcile(&snapshot, self.options.history_capacity, now);
                        if let Some(session) = self.session.as_mut() {
                            session.last_reconciled_at = Some(now);
                        }
                        self.last_error = None;
                        debug!(targets = self.targets.len(), "snapshot reconciled");
                        SyncUpdate::Reconciled {
                            targets: self.targets.len(),
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "snapshot request failed, keeping last view");
                        self.last_error = Some(err.clone());
                        SyncUpdate::PollFailed(err)
                    }
                }
            }
        }
    }
}

/// Check that `raw` looks like a monitorable address and return it trimmed.
pub fn validate_target(raw: &str, accepted_schemes: &[String]) -> Result<String, MonitorError> {
    let target = raw.trim();
    if target.is_empty() {
        return Err(MonitorError::Validation("Please enter a URL".to_string()));
    }

    let Some(rest) = accepted_schemes
        .iter()
        .filter(|scheme| !scheme.is_empty())
        .find_map(|scheme| target.strip_prefix(scheme.as_str()))
    else {
        return Err(MonitorError::Validation(format!(
            "URL must start with {}",
            accepted_schemes.join(" or ")
        )));
    };

    if rest.is_empty() || rest.starts_with('/') {
        return Err(MonitorError::Validation(format!("Missing host in {}", target)));
    }
    if rest.chars().any(char::is_whitespace) {
        return Err(MonitorError::Validation(format!("URL contains whitespace: {}", target)));
    }

    Ok(target.to_string())
}
