//! Health classification of status messages.

/// Fragments of a status message that mark a target as failing.
///
/// Matched case-sensitively, exactly as the status source emits them
/// (`"CRITICAL: High Latency"`, `"HTTP 503 ERROR"`, `"TIMEOUT (Firewall/Net)"`,
/// `"CONNECTION REFUSED"`).
pub const UNHEALTHY_MARKERS: [&str; 4] = ["CRITICAL", "ERROR", "TIMEOUT", "REFUSED"];

/// Status messages reported before a target has produced data, or after
/// monitoring stopped.
const IDLE_MESSAGES: [&str; 4] = ["", "Idle", "Stopped", "Learning Baseline..."];

/// Health verdict for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "UP",
            HealthStatus::Unhealthy => "DOWN",
        }
    }
}

/// What the dashboard shows for a target.
///
/// Idle targets classify as healthy but are drawn differently so that "no
/// data yet" is never mistaken for "confirmed up".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Up,
    Down,
}

/// Classify a status message. Total: unknown messages are healthy.
pub fn classify(status_message: &str) -> HealthStatus {
    if UNHEALTHY_MARKERS.iter().any(|marker| status_message.contains(marker)) {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    }
}

/// Whether the message describes a target with no probe results yet.
pub fn is_idle(status_message: &str) -> bool {
    IDLE_MESSAGES.contains(&status_message.trim())
}

/// Combine classification and idleness into a display state.
pub fn display_state(status_message: &str) -> DisplayState {
    match classify(status_message) {
        HealthStatus::Unhealthy => DisplayState::Down,
        HealthStatus::Healthy if is_idle(status_message) => DisplayState::Idle,
        HealthStatus::Healthy => DisplayState::Up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_failures_are_unhealthy() {
        for msg in [
            "CRITICAL: High Latency",
            "CRITICAL - connection refused",
            "HTTP 500 ERROR",
            "TIMEOUT (Firewall/Net)",
            "CONNECTION REFUSED",
            "ERROR: dns lookup fail",
        ] {
            assert_eq!(classify(msg), HealthStatus::Unhealthy, "{msg}");
        }
    }

    #[test]
    fn test_everything_else_is_healthy() {
        for msg in [
            "",
            "Idle",
            "Operational",
            "Warning: Unstable",
            "Learning Baseline...",
            "critical but lowercase",
            "Stopped",
        ] {
            assert_eq!(classify(msg), HealthStatus::Healthy, "{msg}");
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let inputs = ["Operational", "HTTP 404 ERROR", "ünïcödé", "REFUSEDREFUSED"];
        for msg in inputs {
            assert_eq!(classify(msg), classify(msg));
        }
    }

    #[test]
    fn test_display_state_distinguishes_idle() {
        assert_eq!(display_state("Idle"), DisplayState::Idle);
        assert_eq!(display_state("Learning Baseline..."), DisplayState::Idle);
        assert_eq!(display_state("Operational"), DisplayState::Up);
        assert_eq!(display_state("TIMEOUT (Firewall/Net)"), DisplayState::Down);
    }
}
