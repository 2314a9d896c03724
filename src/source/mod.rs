//! Status and control source abstraction.
//!
//! The dashboard talks to the monitoring backend through two narrow traits:
//! [`StatusSource`] hands out complete [`StatusSnapshot`]s on demand, and
//! [`ControlSource`] starts and stops monitoring. [`HttpSource`] implements
//! both over the backend's HTTP API.

mod http;
mod snapshot;
#[cfg(test)]
pub(crate) mod testing;

pub use http::{HttpSource, HttpSourceBuilder};
pub use snapshot::{ControlReply, StartRequest, StatusSnapshot};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::MonitorError;

/// Something that can report the current state of every monitored target.
///
/// # Example
///
/// ```no_run
/// use pulsewatch::{HttpSource, StatusSource};
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::builder().endpoint("http://localhost:8000").build();
/// let snapshot = source.fetch_snapshot().await.unwrap();
/// println!("Got {} targets", snapshot.targets.len());
/// # });
/// ```
#[async_trait]
pub trait StatusSource: Send + Sync + Debug {
    /// Fetch a full snapshot of all monitored targets.
    async fn fetch_snapshot(&self) -> Result<StatusSnapshot, MonitorError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}

/// Something that can add or remove targets from monitoring.
#[async_trait]
pub trait ControlSource: Send + Sync + Debug {
    /// Ask the backend to start monitoring `target`.
    async fn start(&self, target: &str) -> Result<ControlReply, MonitorError>;

    /// Ask the backend to stop monitoring. Best effort.
    async fn stop(&self) -> Result<ControlReply, MonitorError>;
}
