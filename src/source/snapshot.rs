//! Wire types exchanged with the status and control sources.
//!
//! These match the JSON served by the monitoring backend's `/status`,
//! `/start` and `/stop` endpoints. Every field defaults when missing so a
//! partial response degrades instead of failing to parse.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One complete poll response describing all currently monitored targets.
///
/// Per-target fields are keyed by the target address. The `targets` list is
/// authoritative: entries in the maps for addresses not listed there are
/// ignored, and listed addresses missing from a map fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSnapshot {
    /// Whether the backend is currently probing.
    pub is_monitoring: bool,
    /// Monitored target addresses, in the order the backend reports them.
    pub targets: Vec<String>,
    /// Latest latency per target, in milliseconds. 0 means no successful probe.
    pub current_latencies: HashMap<String, f64>,
    /// Rolling average latency per target, in milliseconds.
    pub baseline_avgs: HashMap<String, f64>,
    /// Human-readable status per target.
    pub status_messages: HashMap<String, String>,
    /// Recent latency window per target, oldest first.
    pub histories: HashMap<String, Vec<f64>>,
    /// Unix timestamps (seconds) of the samples in `histories`.
    pub timestamps: HashMap<String, Vec<f64>>,
}

impl StatusSnapshot {
    /// Status message reported before a target has been probed.
    pub const IDLE_STATUS: &'static str = "Idle";

    pub fn latency(&self, target: &str) -> f64 {
        self.current_latencies.get(target).copied().unwrap_or(0.0)
    }

    pub fn baseline(&self, target: &str) -> f64 {
        self.baseline_avgs.get(target).copied().unwrap_or(0.0)
    }

    pub fn status_message(&self, target: &str) -> &str {
        self.status_messages
            .get(target)
            .map(String::as_str)
            .unwrap_or(Self::IDLE_STATUS)
    }

    pub fn history(&self, target: &str) -> Option<&[f64]> {
        self.histories.get(target).map(Vec::as_slice)
    }

    /// Timestamp of the newest sample for a target, if reported.
    pub fn last_sample_at(&self, target: &str) -> Option<f64> {
        self.timestamps.get(target).and_then(|ts| ts.last().copied())
    }
}

/// Body of a successful start/stop reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlReply {
    pub message: String,
    /// Addresses the backend decided to monitor (start only).
    pub targets: Vec<String>,
}

/// Body of the start request.
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest<'a> {
    pub url: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_status() {
        let json = r#"{
            "is_monitoring": true,
            "targets": ["https://a.test", "https://b.test"],
            "current_latencies": { "https://a.test": 120.5, "https://b.test": 0 },
            "baseline_avgs": { "https://a.test": 110.0 },
            "status_messages": { "https://a.test": "Operational", "https://b.test": "CONNECTION REFUSED" },
            "histories": { "https://a.test": [100.0, 120.5] },
            "timestamps": { "https://a.test": [1700000000.0, 1700000001.5] }
        }"#;

        let snapshot: StatusSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.is_monitoring);
        assert_eq!(snapshot.targets.len(), 2);
        assert_eq!(snapshot.latency("https://a.test"), 120.5);
        assert_eq!(snapshot.baseline("https://b.test"), 0.0);
        assert_eq!(snapshot.status_message("https://b.test"), "CONNECTION REFUSED");
        assert_eq!(snapshot.history("https://a.test"), Some(&[100.0, 120.5][..]));
        assert!(snapshot.history("https://b.test").is_none());
        assert_eq!(snapshot.last_sample_at("https://a.test"), Some(1700000001.5));
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: StatusSnapshot = serde_json::from_str(r#"{"targets": ["x"]}"#).unwrap();
        assert!(!snapshot.is_monitoring);
        assert_eq!(snapshot.latency("x"), 0.0);
        assert_eq!(snapshot.status_message("x"), "Idle");
    }

    #[test]
    fn test_control_reply_tolerates_extra_fields() {
        let reply: ControlReply = serde_json::from_str(
            r#"{"message": "Monitoring Started", "targets": ["https://a.test"], "extra": 1}"#,
        )
        .unwrap();
        assert_eq!(reply.message, "Monitoring Started");
        assert_eq!(reply.targets, vec!["https://a.test".to_string()]);
    }
}
