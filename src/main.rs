use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pulsewatch::app::{export_targets, write_export};
use pulsewatch::config::Overrides;
use pulsewatch::ui::{self, Theme};
use pulsewatch::{events, App, HttpSource, Settings, StatusSource, SyncLoop, TargetSet};

/// Variable holding the log filter directives (e.g. "pulsewatch=debug").
const LOG_ENV: &str = "PULSEWATCH_LOG";

#[derive(Parser, Debug)]
#[command(name = "pulsewatch")]
#[command(about = "Terminal dashboard for endpoint latency and health")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the status backend (e.g., "http://localhost:8000")
    #[arg(short, long)]
    url: Option<String>,

    /// Poll interval (e.g., "1s", "500ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Latency samples kept per target
    #[arg(long)]
    history: Option<usize>,

    /// Start monitoring this URL on launch
    #[arg(short, long, conflicts_with = "export")]
    target: Option<String>,

    /// Export current state to JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?.with_overrides(Overrides {
        status_url: args.url,
        poll_interval: args.refresh,
        history_capacity: args.history,
    })?;
    init_logging(&settings)?;
    info!(status_url = %settings.status_url, "pulsewatch starting");

    let rt = tokio::runtime::Runtime::new()?;
    let source = Arc::new(
        HttpSource::builder()
            .endpoint(settings.status_url.clone())
            .timeout(settings.request_timeout)
            .build(),
    );

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return rt.block_on(export_to_file(source.as_ref(), &settings, &export_path));
    }

    // Requests are spawned from the UI thread onto this runtime.
    let _guard = rt.enter();
    let sync = SyncLoop::new(source.clone(), source, settings.sync_options());
    let mut app = App::new(sync, settings, Theme::auto_detect());

    if let Some(target) = args.target {
        app.start_monitoring(&target);
    }

    run_tui(&mut app)
}

/// Log to a file; the terminal belongs to the TUI.
fn init_logging(settings: &Settings) -> Result<()> {
    let Some(path) = &settings.log_file else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Kick off the first poll right away if a target was given on the command line.
    app.pump(Instant::now());

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        if app.running {
            app.pump(Instant::now());
        }
    }

    info!("pulsewatch exiting");
    Ok(())
}

/// Fetch one snapshot and export it to a JSON file
async fn export_to_file(
    source: &dyn StatusSource,
    settings: &Settings,
    export_path: &Path,
) -> Result<()> {
    let snapshot = source
        .fetch_snapshot()
        .await
        .with_context(|| format!("Failed to fetch status from {}", settings.status_url))?;

    let mut targets = TargetSet::new();
    targets.reconcile(&snapshot, settings.history_capacity, chrono::Utc::now());

    write_export(&export_targets(&targets), export_path)?;
    println!("Exported {} targets to: {}", targets.len(), export_path.display());
    Ok(())
}
