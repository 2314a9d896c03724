//! Data models and processing for status snapshots.
//!
//! This module turns raw [`StatusSnapshot`](crate::source::StatusSnapshot)s
//! into the per-target view model the dashboard renders.
//!
//! ## Submodules
//!
//! - [`classify`]: Health verdicts derived from status messages
//! - [`duration`]: Parsing of duration strings (e.g., "1s", "500ms") and latency formatting
//! - [`filter`]: Search text and up/down filtering over the target list
//! - [`history`]: Bounded per-target latency history for trend charts
//! - [`target`]: The [`Target`] record and snapshot reconciliation into a [`TargetSet`]
//!
//! ## Data Flow
//!
//! ```text
//! StatusSnapshot (raw JSON)
//!        │
//!        ▼
//! TargetSet::reconcile()
//!        │
//!        ├──▶ Target (status, latency, baseline)
//!        │
//!        └──▶ SampleHistory::push() / replace_tail() (for trend charts)
//! ```

pub mod classify;
pub mod duration;
pub mod filter;
pub mod history;
pub mod target;

pub use classify::{classify, display_state, is_idle, DisplayState, HealthStatus};
pub use filter::{filter_targets, StatusFilter};
pub use history::SampleHistory;
pub use target::{Target, TargetSet};
