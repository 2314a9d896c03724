//! # pulsewatch
//!
//! A terminal dashboard and library for watching the latency and health of
//! monitored network endpoints.
//!
//! The dashboard polls a status source on a fixed cadence, reconciles each
//! snapshot into a stable per-target view model, classifies targets as up or
//! down from their status messages, and draws a bounded latency history per
//! target as a filled trend chart. Search and up/down filtering run locally
//! over the reconciled view without re-polling.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐ │
//! │  │  app    │───▶│   data   │───▶│    ui    │───▶│ Terminal │ │
//! │  │ (state) │    │ (model)  │    │(rendering)    │          │ │
//! │  └────┬────┘    └──────────┘    └──────────┘    └──────────┘ │
//! │       │ owns                                                 │
//! │       ▼                                                      │
//! │  ┌─────────┐  spawned requests  ┌─────────┐                  │
//! │  │  sync   │◀──── mpsc ────────▶│ source  │◀── HttpSource    │
//! │  │ (loop)  │                    │ (input) │                  │
//! │  └─────────┘                    └─────────┘                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Dashboard state, view navigation, prompts, and export
//! - **[`sync`]**: The polling state machine ([`SyncLoop`]) with single-flight
//!   requests and stale-response protection
//! - **[`source`]**: [`StatusSource`] and [`ControlSource`] traits, the wire
//!   [`StatusSnapshot`], and the reqwest-backed [`HttpSource`]
//! - **[`data`]**: Targets, bounded sample history, health classification,
//!   and filtering
//! - **[`ui`]**: ratatui rendering, including the [`TrendChart`](ui::trend::TrendChart) widget
//! - **[`config`]**: Layered [`Settings`] from defaults, file, and environment
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the backend on localhost:8000
//! pulsewatch
//!
//! # Point at another backend and start monitoring right away
//! pulsewatch --url http://monitor.internal:8000 --target https://example.com
//!
//! # One-shot JSON export, no TUI
//! pulsewatch --export status.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Instant;
//! use pulsewatch::{HttpSource, SyncLoop, SyncOptions};
//!
//! # tokio_test::block_on(async {
//! let source = Arc::new(HttpSource::builder().endpoint("http://localhost:8000").build());
//! let mut sync = SyncLoop::new(source.clone(), source, SyncOptions::default());
//!
//! sync.start("https://example.com").unwrap();
//! sync.settle().await;
//! sync.tick(Instant::now());
//! sync.settle().await;
//!
//! for target in sync.targets().iter() {
//!     println!("{} {:?}", target.address, target.health());
//! }
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod sync;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{HealthStatus, SampleHistory, StatusFilter, Target, TargetSet};
pub use error::MonitorError;
pub use source::{ControlReply, ControlSource, HttpSource, StatusSnapshot, StatusSource};
pub use sync::{SyncLoop, SyncOptions, SyncUpdate, TickOutcome};
