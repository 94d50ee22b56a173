//! # PDF Presenter
//!
//! Presentation mode for a PDF viewer with gamepad page turning.
//!
//! This application runs the presentation controller against a headless page
//! deck and turns pages from any gamepad found under `/dev/input`.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use pdf_presenter::app::Presenter;
use pdf_presenter::config::{Config, DocumentConfig, LoggingConfig};
use pdf_presenter::event_bus::{BusEvent, EventBus, EventSource};
use pdf_presenter::gamepad::evdev_source::EvdevGamepads;
use pdf_presenter::gamepad::{ActionSender, ActionSink, GamepadDispatcher};
use pdf_presenter::headless::HeadlessHost;
use pdf_presenter::presentation::PresentationOptions;
use pdf_presenter::viewer::deck::{PageDeck, PageSize};
use pdf_presenter::viewer::PageViewer;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Log file name prefix inside the configured log directory
const LOG_FILE_NAME: &str = "pdf-presenter.log";

/// Main entry point for PDF Presenter
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, `config/default.toml`, or defaults)
///    - Set up logging with tracing subscriber, optionally to a daily log file
///    - Build the page deck and presenter
///    - Spawn the gamepad dispatcher
///
/// 2. **Main Loop**
///    - Apply gamepad actions, window events and bus events to the presenter
///    - Hide the controls when their deadline passes
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration file cannot be read or is invalid.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO pdf_presenter: PDF Presenter v0.1.0 starting...
/// INFO pdf_presenter::gamepad::registry: Gamepad connected: 'Joy-Con (R) (Vendor: 057e Product: 2007)' (JoyConRight)
/// INFO pdf_presenter::presentation: Entered presentation mode at page 1
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _log_guard = init_logging(&config.logging);

    info!("PDF Presenter v{} starting...", env!("CARGO_PKG_VERSION"));

    let bus = EventBus::default();
    let mut bus_rx = bus.subscribe();
    let (host, mut window_rx) = HeadlessHost::new();
    let mut presenter = Presenter::new(
        build_deck(&config.document),
        host,
        bus.clone(),
        PresentationOptions::from(&config.presentation),
    );

    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    if config.gamepad.enabled {
        let source = EvdevGamepads::new(
            &config.gamepad.input_dir,
            Duration::from_millis(config.gamepad.rescan_interval_ms),
        );
        let mut dispatcher = GamepadDispatcher::new(
            source,
            config.gamepad.button_layout,
            config.gamepad.refresh_rate_hz,
        );
        let mut sink = ActionSender::new(action_tx);
        tokio::spawn(async move { dispatcher.run(&mut sink).await });
        info!(
            "Gamepad dispatcher watching {} at {}Hz",
            config.gamepad.input_dir, config.gamepad.refresh_rate_hz
        );
    } else {
        info!("Gamepad input disabled");
        drop(action_tx);
    }

    bus.dispatch(BusEvent::PagesInit);
    if config.presentation.auto_start {
        bus.dispatch(BusEvent::PresentationMode {
            source: EventSource::Startup,
        });
    }

    info!("Press Ctrl+C to exit");

    // Main event loop
    loop {
        let controls_deadline = presenter.controls_deadline();

        tokio::select! {
            Some(action) = action_rx.recv() => {
                debug!("Gamepad action {:?}", action);
                if let Err(e) = presenter.perform(action).await {
                    warn!("Gamepad action {:?} failed: {}", action, e);
                }
            }

            Some(event) = window_rx.recv() => {
                presenter.handle_window_event(event, Instant::now()).await;
            }

            event = bus_rx.recv() => match event {
                Ok(event) => presenter.handle_bus_event(&event).await,
                Err(RecvError::Lagged(skipped)) => warn!("Event bus lagged, {} events dropped", skipped),
                Err(RecvError::Closed) => break,
            },

            // Hide controls after inactivity
            _ = sleep_until(controls_deadline.unwrap_or_else(Instant::now)), if controls_deadline.is_some() => {
                presenter.tick(Instant::now());
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!(
        "Stopped at page {}/{}",
        presenter.viewer().current_page_number(),
        presenter.viewer().pages_count()
    );

    Ok(())
}

/// Loads the configuration named on the command line, else the default file
/// if present, else built-in defaults.
fn load_config() -> Result<Config> {
    if let Some(path) = std::env::args().nth(1) {
        return Config::load(&path).with_context(|| format!("Failed to load config from {}", path));
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH));
    }
    Ok(Config::default())
}

/// Initializes tracing. `RUST_LOG` takes precedence over the configured level.
///
/// The returned guard must be held for file logs to be flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

/// Builds the headless document. Mixed sizes alternate portrait and landscape pages.
fn build_deck(config: &DocumentConfig) -> PageDeck {
    if config.equal_page_sizes {
        return PageDeck::new(config.page_count);
    }

    let pages = (0..config.page_count)
        .map(|i| {
            if i % 2 == 0 {
                PageSize { width: 612.0, height: 792.0 }
            } else {
                PageSize { width: 792.0, height: 612.0 }
            }
        })
        .collect();
    PageDeck::with_page_sizes(pages)
}
