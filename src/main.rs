use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, time::Duration};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod app;
mod app_event;
mod context;
mod error;
mod forms;
mod models;
mod services;
mod store;
mod ui;

use app::App;
use store::EndpointStore;

#[derive(Debug, Parser)]
#[command(name = "endr", about = "A TUI for managing remote endpoints and their TLS configuration")]
struct Cli {
    /// Data directory holding endpoints.toml, groups.toml and TLS material
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if !cli.log_dir.exists() {
        std::fs::create_dir_all(&cli.log_dir)?;
    }

    let log_file = cli
        .log_dir
        .join(format!("endr_{}.log", Local::now().format("%Y%m%d_%H%M%S")));
    let file = File::create(&log_file)?;

    fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(EnvFilter::from_default_env().add_directive("endr=debug".parse()?))
        .with_ansi(false)
        .with_writer(file)
        .init();

    debug!("Initializing application...");

    let store = Arc::new(EndpointStore::new(cli.data_dir).context("Failed to open data store")?);
    let endpoints_file = store.endpoints_path().to_path_buf();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store.clone(), store, Some(endpoints_file));
    app.reload_endpoints();
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> Result<()> {
    loop {
        app.process_events();

        terminal.draw(|f| ui::draw::<B>(f, &mut app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key)?;

                if app.should_quit {
                    return Ok(());
                }
            }
        }
    }
}
