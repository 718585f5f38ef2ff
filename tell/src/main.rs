//! Scan & Tell terminal application.
//!
//! Type an object name, scan it into a short story, save stories into a
//! storybook and co-write with an AI story assistant.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripting:
//!
//! ```bash
//! echo "#scan lamp" | cargo run -p tell -- --headless
//! ```

mod app;
mod events;
mod headless;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tell_core::{KeyStore, ProviderKind, SessionConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

const DEFAULT_LOG_FILTER: &str = "tell=info,tell_core=info,llm=warn";

#[derive(Debug, Parser)]
#[command(name = "tell")]
#[command(about = "Scan objects into stories and co-write with an AI assistant", long_about = None)]
struct Cli {
    /// Run in headless mode (text-only, no TUI)
    #[arg(long)]
    headless: bool,

    /// Text generation provider: openai or gemini (overrides TELL_PROVIDER)
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Model name (overrides TELL_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// API key (overrides TELL_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Write logs to this file (the TUI logs nowhere otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = SessionConfig::from_env()?;
    if let Some(provider) = cli.provider {
        config = config.with_provider(provider);
    }
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }

    let key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("TELL_API_KEY").ok())
        .unwrap_or_default();
    let keys = KeyStore::with_key(key);

    tracing::info!(
        provider = %config.provider,
        model = config.effective_model(),
        key_configured = keys.is_configured(),
        "Starting Scan & Tell"
    );

    if cli.headless {
        return headless::run_headless(config, keys).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(config, keys)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result.context("terminal UI failed")
}

/// Install the tracing subscriber.
///
/// Headless mode logs to stderr. The TUI owns the terminal, so it only logs
/// when a log file was requested.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
    };

    if let Some(path) = &cli.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else if cli.headless {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        // Apply replies from finished provider calls
        app.drain_replies();

        terminal.draw(|f| render(f, &app))?;

        // Poll for events with timeout so replies and the seed debounce advance
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
