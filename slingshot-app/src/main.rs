//! Slingshot - terminal single-page application shell
//!
//! The main loop applies host events one at a time:
//! 1. Terminal input -> Shell::handle_event() -> intents -> router / store
//! 2. Connectivity probe results -> Environment::online -> watcher -> store
//! 3. Timer actions (snackbar close) -> store
//! 4. Redraw
//!
//! # Usage
//!
//! ```sh
//! # Start on the home page
//! cargo run -p slingshot-app
//!
//! # Start on an unknown route, offline, with a custom title
//! cargo run -p slingshot-app -- --path /nowhere --offline --title Demo
//!
//! # Log to $TMPDIR/slingshot.log
//! SLINGSHOT_LOG=debug cargo run -p slingshot-app
//! ```

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use slingshot::{process_raw_event, spawn_event_poller, Environment, LoggingMiddleware, Store};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use slingshot_app::config::Config;
use slingshot_app::host::{spawn_connectivity_probe, viewport_width_px, TerminalDocument};
use slingshot_app::reducer::reducer;
use slingshot_app::shell::Shell;
use slingshot_app::state::AppState;

/// Slingshot - single-page application shell for the terminal
#[derive(Parser, Debug)]
#[command(name = "slingshot")]
#[command(about = "A store-synchronised single-page shell in the terminal")]
struct Args {
    /// Config file (default: ~/.config/slingshot/config.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Path to open on start
    #[arg(long, short)]
    path: Option<String>,

    /// Application title
    #[arg(long, short)]
    title: Option<String>,

    /// Start offline and do not probe connectivity
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(path) = args.path {
        config.initial_path = path;
    }
    if let Some(title) = args.title {
        config.app_title = title;
    }
    if args.offline {
        config.connectivity.enabled = false;
    }
    config.validate().context("validating command line overrides")?;

    // ===== Terminal setup =====
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, config, args.offline).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Log to a file when `SLINGSHOT_LOG` holds a filter; stdout belongs to the UI
fn init_logging() -> anyhow::Result<()> {
    let Ok(filter) = EnvFilter::try_from_env("SLINGSHOT_LOG") else {
        return Ok(());
    };
    let path = std::env::var_os("SLINGSHOT_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("slingshot.log"));
    let file = File::create(&path)
        .with_context(|| format!("creating log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    config: Config,
    start_offline: bool,
) -> anyhow::Result<()> {
    let options = config.shell_options()?;
    let size = terminal.size()?;
    let env = Environment::new(
        &config.origin,
        &config.initial_path,
        !start_offline,
        viewport_width_px(size.width, options.cell_width_px),
    );

    let store = Store::new(AppState::default(), reducer).with_middleware(LoggingMiddleware::new());
    let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();
    let mut shell = Shell::new(store, env.clone(), TerminalDocument::new(), options, timer_tx);

    let cancel_token = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let poller = spawn_event_poller(
        event_tx,
        Duration::from_millis(10),
        Duration::from_millis(16),
        cancel_token.clone(),
    );

    let (probe_tx, mut probe_rx) = mpsc::unbounded_channel();
    let probe = config.connectivity.enabled.then(|| {
        spawn_connectivity_probe(
            config.connectivity.probe_addr.clone(),
            config.probe_interval(),
            config.probe_timeout(),
            probe_tx,
            cancel_token.clone(),
        )
    });

    let mut should_render = true;
    loop {
        if should_render {
            terminal.draw(|frame| shell.render(frame))?;
            should_render = false;
        }

        tokio::select! {
            Some(raw) = event_rx.recv() => {
                if let Some(event) = process_raw_event(raw) {
                    should_render = shell.handle_event(&event);
                }
            }
            Some(online) = probe_rx.recv() => {
                env.online.set(online);
                should_render = shell.needs_render();
            }
            Some(action) = timer_rx.recv() => {
                shell.dispatch(action);
                should_render = shell.needs_render();
            }
            else => break,
        }

        if shell.should_quit() {
            break;
        }
    }

    cancel_token.cancel();
    shell.dispose();
    if let Err(e) = poller.await {
        tracing::warn!(error = %e, "event poller ended abnormally");
    }
    if let Some(probe) = probe {
        probe.abort();
    }
    Ok(())
}
