use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use quire::download::DownloadManager;
use quire::event_source::KeyboardEventSource;
use quire::main_app::{App, run_app_with_event_source};
use quire::pages::PageSet;
use quire::panic_handler::initialize_panic_handler;
use quire::settings;
use quire::theme::{self, ThemeMode};

/// Remote fallback for the full document when no local copy exists.
const DEFAULT_REMOTE_URL: &str = "https://example.com/document.pdf";

#[derive(Parser, Debug)]
#[command(name = "quire", version, about = "Terminal paginated page-image viewer")]
struct Cli {
    /// Directory holding the page images (0001.svg, 0002.png, ...)
    pages_dir: PathBuf,

    /// Local copy of the full document offered by the save action.
    /// Defaults to document.pdf next to the pages.
    #[arg(long)]
    local_asset: Option<PathBuf>,

    /// Remote fallback URL for the full document
    #[arg(long, default_value = DEFAULT_REMOTE_URL)]
    remote_url: String,

    /// Log file path
    #[arg(long, default_value = "quire.log")]
    log_file: PathBuf,

    /// Pin the color theme for this session instead of probing the terminal
    #[arg(long, value_parser = ["light", "dark"])]
    theme: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create(&cli.log_file)?,
    )?;

    info!("Starting quire");

    initialize_panic_handler();
    settings::load_settings();

    match cli.theme.as_deref().and_then(ThemeMode::from_name) {
        Some(mode) => theme::force_theme_mode(mode),
        None => theme::init_from_environment(),
    }

    let pages = PageSet::discover(&cli.pages_dir)?;
    info!(
        "Loaded {} pages from {}",
        pages.count(),
        cli.pages_dir.display()
    );

    let local_asset = cli
        .local_asset
        .unwrap_or_else(|| cli.pages_dir.join("document.pdf"));
    let downloads = DownloadManager::new(local_asset, cli.remote_url, None);

    // Terminal initialization
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(pages, downloads);
    let mut event_source = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut event_source);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {:?}", err);
        println!("{err:?}");
    }

    info!("Shutting down quire");
    Ok(())
}
