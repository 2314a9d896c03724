//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local};
use serde_json::json;

use crate::config::Settings;
use crate::data::duration::format_duration;
use crate::data::{filter_targets, HealthStatus, StatusFilter, Target, TargetSet};
use crate::sync::{SyncLoop, SyncUpdate};
use crate::ui::trend::TrendCache;
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live list of targets with trend charts.
    Monitoring,
    /// Targets currently classified unhealthy.
    Incidents,
    /// Ephemeral status pages created this session.
    StatusPages,
    /// Effective configuration.
    Settings,
}

impl View {
    pub const ALL: [View; 4] = [View::Monitoring, View::Incidents, View::StatusPages, View::Settings];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Monitoring => View::Incidents,
            View::Incidents => View::StatusPages,
            View::StatusPages => View::Settings,
            View::Settings => View::Monitoring,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Monitoring => View::Settings,
            View::Incidents => View::Monitoring,
            View::StatusPages => View::Incidents,
            View::Settings => View::StatusPages,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Monitoring => "Monitoring",
            View::Incidents => "Incidents",
            View::StatusPages => "Status Pages",
            View::Settings => "Settings",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Monitoring => 0,
            View::Incidents => 1,
            View::StatusPages => 2,
            View::Settings => 3,
        }
    }
}

/// What keystrokes are currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing edits the search term live.
    Search,
    /// Typing an address to start monitoring.
    StartUrl,
    /// Typing the name of a new status page.
    StatusPageName,
}

/// Search and status filter applied to the monitoring list.
///
/// UI-only; never sent to the status source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilterState {
    pub search_term: String,
    pub status_filter: StatusFilter,
}

impl ViewFilterState {
    pub fn is_active(&self) -> bool {
        !self.search_term.is_empty() || self.status_filter != StatusFilter::All
    }
}

/// A status page created during this session. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPage {
    pub name: String,
    pub created_at: DateTime<Local>,
}

/// Aggregate counts over all targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    /// `up / total * 100`, rounded to two decimals; 0 with no targets.
    pub uptime_percent: f64,
    /// Mean latency of targets that have responded.
    pub avg_latency_ms: Option<f64>,
}

impl Summary {
    pub fn from_targets(targets: &TargetSet) -> Self {
        let (up, down) = targets.health_counts();
        let total = targets.len();
        let uptime_percent = if total == 0 {
            0.0
        } else {
            (up as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        };

        let responding: Vec<f64> = targets
            .iter()
            .map(|t| t.current_latency_ms)
            .filter(|&ms| ms > 0.0)
            .collect();
        let avg_latency_ms = if responding.is_empty() {
            None
        } else {
            Some(responding.iter().sum::<f64>() / responding.len() as f64)
        };

        Self {
            total,
            up,
            down,
            uptime_percent,
            avg_latency_ms,
        }
    }
}

/// Connection indicator shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionBadge {
    Live,
    Idle,
    Disconnected,
}

impl ConnectionBadge {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionBadge::Live => "LIVE",
            ConnectionBadge::Idle => "IDLE",
            ConnectionBadge::Disconnected => "DISCONNECTED",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    sync: SyncLoop,
    settings: Settings,

    // Navigation state
    pub selected_index: usize,
    /// First row drawn by the last render of a list view.
    pub list_offset: usize,

    // Search/filter and prompts
    pub filter: ViewFilterState,
    pub input_mode: InputMode,
    pub input: String,

    pub status_pages: Vec<StatusPage>,

    // UI
    pub theme: Theme,
    pub trends: TrendCache,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a sync loop.
    pub fn new(sync: SyncLoop, settings: Settings, theme: Theme) -> Self {
        let trends = TrendCache::new(settings.trend(), theme.chart_background);
        Self {
            running: true,
            current_view: View::Monitoring,
            show_help: false,
            sync,
            settings,
            selected_index: 0,
            list_offset: 0,
            filter: ViewFilterState::default(),
            input_mode: InputMode::Normal,
            input: String::new(),
            status_pages: Vec::new(),
            theme,
            trends,
            status_message: None,
        }
    }

    pub fn sync(&self) -> &SyncLoop {
        &self.sync
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns a description of the current status source.
    pub fn source_description(&self) -> &str {
        self.sync.source_description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Apply finished requests and issue the next poll if due.
    pub fn pump(&mut self, now: Instant) {
        let updates = self.sync.pump(now);
        self.apply_updates(updates);
    }

    /// Surface sync updates to the user and refresh derived state.
    pub fn apply_updates(&mut self, updates: Vec<SyncUpdate>) {
        for update in updates {
            if let Some(notice) = update.notice() {
                self.set_status_message(notice);
            }
            if let SyncUpdate::Reconciled { .. } = update {
                let live: Vec<String> = self.sync.targets().iter().map(|t| t.address.clone()).collect();
                self.trends.retain(live.iter().map(String::as_str));
            }
        }
        self.clamp_selection();
    }

    pub fn targets(&self) -> &TargetSet {
        self.sync.targets()
    }

    /// Targets shown on the monitoring tab, in source order.
    pub fn visible_targets(&self) -> Vec<&Target> {
        filter_targets(
            self.sync.targets().iter(),
            &self.filter.search_term,
            self.filter.status_filter,
        )
    }

    /// Visible targets together with the chart cache, for rendering.
    pub fn monitoring_parts(&mut self) -> (Vec<&Target>, &mut TrendCache) {
        let visible = filter_targets(
            self.sync.targets().iter(),
            &self.filter.search_term,
            self.filter.status_filter,
        );
        (visible, &mut self.trends)
    }

    /// Targets currently classified unhealthy.
    pub fn incidents(&self) -> Vec<&Target> {
        self.sync
            .targets()
            .iter()
            .filter(|t| t.health() == HealthStatus::Unhealthy)
            .collect()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_targets(self.sync.targets())
    }

    pub fn connection_badge(&self) -> ConnectionBadge {
        if self.sync.is_disconnected() {
            ConnectionBadge::Disconnected
        } else if self.sync.session().is_some() {
            ConnectionBadge::Live
        } else {
            ConnectionBadge::Idle
        }
    }

    /// Ask the backend to start monitoring `raw`.
    pub fn start_monitoring(&mut self, raw: &str) {
        match self.sync.start(raw) {
            Ok(()) => self.set_status_message(format!("Starting monitor for {}...", raw.trim())),
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    /// Stop monitoring. The last view stays visible.
    pub fn stop_monitoring(&mut self) {
        self.sync.stop();
        self.set_status_message("Monitoring stopped".to_string());
    }

    /// Add an ephemeral status page.
    pub fn create_status_page(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            self.set_status_message("Status page name required".to_string());
            return;
        }
        self.status_pages.push(StatusPage {
            name: name.to_string(),
            created_at: Local::now(),
        });
        self.set_status_message(format!("Created status page {}", name));
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.selected_index = 0;
        self.list_offset = 0;
    }

    /// Number of selectable rows in the current view.
    pub fn list_len(&self) -> usize {
        match self.current_view {
            View::Monitoring => self.visible_targets().len(),
            View::Incidents => self.incidents().len(),
            // The built-in all-monitors page is listed first.
            View::StatusPages => self.status_pages.len() + 1,
            View::Settings => 0,
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.list_len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.list_len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let max = self.list_len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max);
    }

    /// Navigate back: close help, then return to the monitoring tab.
    pub fn go_back(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else if self.current_view != View::Monitoring {
            self.set_view(View::Monitoring);
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle the status filter All → Up → Down.
    pub fn cycle_status_filter(&mut self) {
        self.filter.status_filter = self.filter.status_filter.next();
        self.clamp_selection();
    }

    /// Enter search mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.set_view(View::Monitoring);
        self.input_mode = InputMode::Search;
    }

    /// Clear the search term and status filter.
    pub fn clear_filter(&mut self) {
        self.filter = ViewFilterState::default();
        if self.input_mode == InputMode::Search {
            self.input_mode = InputMode::Normal;
        }
    }

    /// Open a text prompt.
    pub fn open_prompt(&mut self, mode: InputMode) {
        self.input.clear();
        self.input_mode = mode;
    }

    /// Append a character to whatever is being edited.
    pub fn input_push(&mut self, c: char) {
        match self.input_mode {
            InputMode::Search => {
                self.filter.search_term.push(c);
                self.clamp_selection();
            }
            InputMode::StartUrl | InputMode::StatusPageName => self.input.push(c),
            InputMode::Normal => {}
        }
    }

    /// Remove the last character from whatever is being edited.
    pub fn input_pop(&mut self) {
        match self.input_mode {
            InputMode::Search => {
                self.filter.search_term.pop();
                if self.filter.search_term.is_empty() {
                    self.input_mode = InputMode::Normal;
                }
            }
            InputMode::StartUrl | InputMode::StatusPageName => {
                self.input.pop();
            }
            InputMode::Normal => {}
        }
    }

    /// Confirm the current prompt.
    pub fn submit_input(&mut self) {
        let mode = std::mem::take(&mut self.input_mode);
        let input = std::mem::take(&mut self.input);
        match mode {
            InputMode::StartUrl => self.start_monitoring(&input),
            InputMode::StatusPageName => self.create_status_page(&input),
            InputMode::Search | InputMode::Normal => {}
        }
    }

    /// Leave the current prompt. Search text is kept.
    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    /// Signal the application to quit and tear down the session.
    pub fn quit(&mut self) {
        self.running = false;
        self.sync.shutdown();
    }

    /// Current view model as JSON.
    pub fn export_value(&self) -> serde_json::Value {
        let mut value = export_targets(self.sync.targets());
        value["session"] = match self.sync.session() {
            Some(session) => json!({
                "target": session.target,
                "monitored": session.monitored,
                "started_at": session.started_at.to_rfc3339(),
                "last_reconciled_at": session.last_reconciled_at.map(|t| t.to_rfc3339()),
            }),
            None => serde_json::Value::Null,
        };
        value["status_pages"] = self
            .status_pages
            .iter()
            .map(|p| json!({ "name": p.name, "created_at": p.created_at.to_rfc3339() }))
            .collect();
        value
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        write_export(&self.export_value(), path)
    }

    /// Poll interval for display.
    pub fn poll_interval_label(&self) -> String {
        format_duration(self.settings.poll_interval)
    }
}

/// Summary and per-target records as JSON.
pub fn export_targets(targets: &TargetSet) -> serde_json::Value {
    let summary = Summary::from_targets(targets);
    let records: Vec<serde_json::Value> = targets
        .iter()
        .map(|t| {
            json!({
                "address": t.address,
                "health": t.health().symbol(),
                "status_message": t.status_message,
                "current_latency_ms": t.current_latency_ms,
                "baseline_avg_ms": t.baseline_avg_ms,
                "history": t.history.samples(),
                "last_seen_at": t.last_seen_at.to_rfc3339(),
            })
        })
        .collect();

    json!({
        "summary": {
            "total": summary.total,
            "up": summary.up,
            "down": summary.down,
            "uptime_percent": summary.uptime_percent,
            "avg_latency_ms": summary.avg_latency_ms,
        },
        "targets": records,
    })
}

/// Write a JSON value to `path`, pretty-printed.
pub fn write_export(value: &serde_json::Value, path: &Path) -> Result<()> {
    use std::io::Write;

    let json = serde_json::to_string_pretty(value)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::source::testing::{snapshot_of, ScriptedSource};
    use crate::sync::SyncOptions;
    use std::sync::Arc;

    pub(crate) fn app_with(source: &Arc<ScriptedSource>) -> App {
        let sync = SyncLoop::new(source.clone(), source.clone(), SyncOptions::default());
        App::new(sync, Settings::default(), Theme::dark())
    }

    /// Start monitoring and reconcile one snapshot listing `entries`.
    pub(crate) async fn live_app(entries: &[(&str, f64, &str)]) -> (App, Arc<ScriptedSource>) {
        let source = ScriptedSource::new();
        source.push_snapshot(snapshot_of(entries));
        let mut app = app_with(&source);

        app.start_monitoring("https://a.test");
        settle(&mut app).await;
        app.pump(Instant::now());
        settle(&mut app).await;
        (app, source)
    }

    /// Wait for one completed request and apply it.
    pub(crate) async fn settle(app: &mut App) -> Option<SyncUpdate> {
        let update = app.sync.settle().await;
        app.apply_updates(update.clone().into_iter().collect());
        update
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{app_with, live_app};
    use super::*;
    use crate::source::testing::{snapshot_of as snapshot, ScriptedSource};

    fn addresses(targets: Vec<&Target>) -> Vec<&str> {
        targets.into_iter().map(|t| t.address.as_str()).collect()
    }

    #[tokio::test]
    async fn test_healthy_and_refused_targets() {
        let (mut app, _) = live_app(&[
            ("https://a.test", 120.0, "Operational"),
            ("https://b.test", 0.0, "CRITICAL - connection refused"),
        ])
        .await;

        let summary = app.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.up, 1);
        assert_eq!(summary.down, 1);
        assert_eq!(summary.uptime_percent, 50.0);
        assert_eq!(summary.avg_latency_ms, Some(120.0));

        assert_eq!(addresses(app.incidents()), vec!["https://b.test"]);

        app.cycle_status_filter();
        app.cycle_status_filter();
        assert_eq!(app.filter.status_filter, StatusFilter::Down);
        assert_eq!(addresses(app.visible_targets()), vec!["https://b.test"]);
        assert_eq!(app.connection_badge(), ConnectionBadge::Live);
    }

    #[tokio::test]
    async fn test_search_filters_without_polling() {
        let (mut app, source) = live_app(&[
            ("https://api.test", 10.0, "Operational"),
            ("https://www.test", 10.0, "Operational"),
        ])
        .await;
        let requests = source.total_requests();

        app.start_filter();
        for c in "API".chars() {
            app.input_push(c);
        }
        assert_eq!(addresses(app.visible_targets()), vec!["https://api.test"]);

        app.clear_filter();
        assert_eq!(app.visible_targets().len(), 2);
        assert_eq!(source.total_requests(), requests);
    }

    #[test]
    fn test_uptime_rounding() {
        let mut targets = TargetSet::new();
        targets.reconcile(
            &snapshot(&[
                ("a", 1.0, "Operational"),
                ("b", 1.0, "Operational"),
                ("c", 1.0, "TIMEOUT (Firewall/Net)"),
            ]),
            10,
            chrono::Utc::now(),
        );
        assert_eq!(Summary::from_targets(&targets).uptime_percent, 66.67);
        assert_eq!(Summary::from_targets(&TargetSet::new()).uptime_percent, 0.0);
    }

    #[test]
    fn test_idle_targets_count_as_up() {
        let mut targets = TargetSet::new();
        targets.reconcile(&snapshot(&[("a", 0.0, "Learning Baseline...")]), 10, chrono::Utc::now());
        let summary = Summary::from_targets(&targets);
        assert_eq!((summary.up, summary.down), (1, 0));
        assert_eq!(summary.avg_latency_ms, None);
    }

    #[tokio::test]
    async fn test_invalid_url_prompt_shows_message() {
        let source = ScriptedSource::new();
        let mut app = app_with(&source);

        app.open_prompt(InputMode::StartUrl);
        for c in "not-a-url".chars() {
            app.input_push(c);
        }
        app.submit_input();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.get_status_message().unwrap().contains("URL must start with"));
        tokio::task::yield_now().await;
        assert_eq!(source.total_requests(), 0);
        assert_eq!(app.connection_badge(), ConnectionBadge::Idle);
    }

    #[tokio::test]
    async fn test_stop_keeps_last_view() {
        let (mut app, _) = live_app(&[("https://a.test", 42.0, "Operational")]).await;

        app.stop_monitoring();
        assert_eq!(app.connection_badge(), ConnectionBadge::Idle);
        assert_eq!(app.targets().len(), 1);

        app.quit();
        assert!(!app.running);
        assert!(app.targets().is_empty());
    }

    #[tokio::test]
    async fn test_status_pages() {
        let source = ScriptedSource::new();
        let mut app = app_with(&source);

        app.open_prompt(InputMode::StatusPageName);
        app.submit_input();
        assert!(app.status_pages.is_empty());

        app.open_prompt(InputMode::StatusPageName);
        for c in " Public API ".chars() {
            app.input_push(c);
        }
        app.submit_input();
        assert_eq!(app.status_pages.len(), 1);
        assert_eq!(app.status_pages[0].name, "Public API");
    }

    #[tokio::test]
    async fn test_selection_is_clamped() {
        let (mut app, _) = live_app(&[
            ("https://a.test", 1.0, "Operational"),
            ("https://b.test", 1.0, "ERROR: boom"),
        ])
        .await;

        app.select_last();
        assert_eq!(app.selected_index, 1);
        app.filter.status_filter = StatusFilter::Down;
        app.cycle_status_filter();
        assert_eq!(app.filter.status_filter, StatusFilter::All);
        app.select_next_n(10);
        assert_eq!(app.selected_index, 1);

        app.filter.status_filter = StatusFilter::Up;
        app.clamp_selection();
        assert_eq!(app.selected_index, 0);
    }

    #[tokio::test]
    async fn test_export_state() {
        let (mut app, _) = live_app(&[("https://a.test", 120.0, "Operational")]).await;
        app.create_status_page("Public");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        app.export_state(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["uptime_percent"], 100.0);
        assert_eq!(value["targets"][0]["address"], "https://a.test");
        assert_eq!(value["targets"][0]["history"], json!([120.0]));
        assert_eq!(value["session"]["target"], "https://a.test");
        assert_eq!(value["status_pages"][0]["name"], "Public");
    }

    #[test]
    fn test_view_cycle() {
        let mut view = View::Monitoring;
        for _ in 0..4 {
            view = view.next();
        }
        assert_eq!(view, View::Monitoring);
        assert_eq!(View::Monitoring.prev(), View::Settings);
        assert_eq!(View::ALL.map(|v| v.index()), [0, 1, 2, 3]);
    }
}
