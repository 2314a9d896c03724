//! Per-target view model and snapshot reconciliation.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};

use super::classify::{classify, display_state, DisplayState, HealthStatus};
use super::history::SampleHistory;
use crate::source::StatusSnapshot;

/// One monitored endpoint as shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Endpoint address; unique key.
    pub address: String,
    /// Latest latency in milliseconds. 0 means no successful probe yet.
    pub current_latency_ms: f64,
    /// Rolling average latency in milliseconds, informational only.
    pub baseline_avg_ms: f64,
    pub status_message: String,
    pub history: SampleHistory,
    /// When the most recent snapshot containing this target was observed.
    pub last_seen_at: DateTime<Utc>,
}

impl Target {
    fn new(address: String, capacity: usize, now: DateTime<Utc>) -> Self {
        Self {
            address,
            current_latency_ms: 0.0,
            baseline_avg_ms: 0.0,
            status_message: StatusSnapshot::IDLE_STATUS.to_string(),
            history: SampleHistory::new(capacity),
            last_seen_at: now,
        }
    }

    pub fn health(&self) -> HealthStatus {
        classify(&self.status_message)
    }

    pub fn display_state(&self) -> DisplayState {
        display_state(&self.status_message)
    }
}

/// Ordered collection of targets, in the order the status source lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn get(&self, address: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.address == address)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Merge a snapshot into the view model.
    ///
    /// Targets listed in the snapshot are upserted, keeping their existing
    /// history. When the snapshot carries a history window for a target the
    /// local buffer is replaced by it; otherwise the scalar latency is pushed.
    /// Targets absent from the snapshot are dropped. Duplicate addresses keep
    /// their first position.
    pub fn reconcile(&mut self, snapshot: &StatusSnapshot, capacity: usize, now: DateTime<Utc>) {
        let mut previous: HashMap<String, Target> = self
            .targets
            .drain(..)
            .map(|t| (t.address.clone(), t))
            .collect();
        let mut seen = HashSet::new();

        for address in &snapshot.targets {
            if !seen.insert(address.as_str()) {
                continue;
            }

            let mut target = previous
                .remove(address)
                .unwrap_or_else(|| Target::new(address.clone(), capacity, now));

            target.current_latency_ms = non_negative(snapshot.latency(address));
            target.baseline_avg_ms = non_negative(snapshot.baseline(address));
            target.status_message = snapshot.status_message(address).to_string();

            match snapshot.history(address) {
                Some(window) => target.history.replace_tail(window),
                None => target.history.push(target.current_latency_ms),
            }

            target.last_seen_at = snapshot
                .last_sample_at(address)
                .and_then(unix_seconds)
                .unwrap_or(now);

            self.targets.push(target);
        }
    }

    /// Number of targets classified healthy and unhealthy.
    pub fn health_counts(&self) -> (usize, usize) {
        let down = self.targets.iter().filter(|t| t.health() == HealthStatus::Unhealthy).count();
        (self.targets.len() - down, down)
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

fn unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    Utc.timestamp_opt(whole, nanos).single()
}
