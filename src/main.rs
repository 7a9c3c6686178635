// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # Marquee Player.
//!
//! A terminal player for a single song at a time, with a scrolling title.
//!
//! The library screen lists the songs of the catalog; opening one mounts a
//! player screen that owns its own audio session. Going back from the player
//! stops playback first, then leaves the screen.
//!
//! ## Architecture
//!
//! * The **Main Thread** owns all application state, processes events and
//!   renders the UI.
//! * An **Input Thread** forwards key presses, and a **Tick Thread** sends
//!   the frame ticks that drive the title animation.
//! * Each player screen has an **Audio Worker** thread executing its playback
//!   requests against MPV and acknowledging them.
//!
//! Communication between the threads is handled via `std::sync::mpsc`
//! channels. The terminal follows a strict setup-run-teardown pattern so its
//! state is restored even when the application fails.

mod config;
mod events;
mod lifecycle;
mod logging;
mod marquee;
mod model;
mod playback;
mod player;
mod render;
mod screen;
mod theme;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self},
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::{Duration, Instant},
};

use crate::{
    config::AppConfig,
    events::{AppEvent, process_events},
    lifecycle::BackHandler,
    model::{Track, catalog::Catalog},
    screen::{LibraryScreen, PlayerScreen, Screen},
    theme::Theme,
};

const FALLBACK_CONTAINER_WIDTH: u16 = 80;

#[derive(Parser, Debug)]
#[command(name = "marquee-player")]
#[command(about = "Play a song in the terminal, with a scrolling title")]
#[command(version)]
struct Args {
    /// Open the player for the catalog song at this index
    #[arg(short, long, conflicts_with = "url")]
    index: Option<usize>,

    /// Open the player for a remote song
    #[arg(short, long, requires = "title")]
    url: Option<String>,

    /// Title of the remote song
    #[arg(short, long, requires = "url")]
    title: Option<String>,

    /// Artist of the remote song
    #[arg(short, long, requires = "url")]
    artist: Option<String>,

    /// Album art reference of the remote song
    #[arg(long, requires = "url")]
    album_art: Option<String>,
}

/// Application state.
pub(crate) struct App {
    pub config: AppConfig,
    pub theme: Theme,
    pub catalog: Catalog,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub back_handler: BackHandler,
    pub screens: Vec<Screen>,

    pub last_tick: Instant,
}

impl App {
    /// Create a new instance of application state, with no screen mounted.
    pub fn new(config: AppConfig, catalog: Catalog) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        Self {
            config,
            theme: Theme::default(),
            catalog,
            event_tx,
            event_rx,
            back_handler: BackHandler::new(),
            screens: Vec::new(),
            last_tick: Instant::now(),
        }
    }

    /// Pushes the library screen listing the catalog.
    pub fn open_library(&mut self) {
        self.screens.push(Screen::Library(LibraryScreen::new(self.catalog.len())));
    }

    /// Mounts a player screen for `track` on top of the stack.
    ///
    /// The title container spans the terminal width, read once here.
    pub fn open_player(&mut self, track: Track) {
        let container_width = terminal::size()
            .map(|(width, _)| width)
            .unwrap_or(FALLBACK_CONTAINER_WIDTH);

        let player = PlayerScreen::mount(track, container_width, &self.config, &self.event_tx, &self.back_handler);
        self.screens.push(Screen::Player(player));
    }
}

/// The entry point of the application.
///
/// Resolves the track to open (if any) from the command line, sets up the
/// terminal, runs the event loop and restores the terminal afterwards.
fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== Marquee Player starting ===");

    let config = config::load_config();
    let catalog = Catalog::from_config(&config);

    let initial_track = initial_track(&args, &catalog)?;

    let mut app = App::new(config, catalog);
    match initial_track {
        Some(track) => app.open_player(track),
        None => app.open_library(),
    }

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal);

    // Unmount remaining screens, releasing their audio sessions.
    app.screens.clear();

    tracing::info!("Marquee Player shutting down");

    res.context("Application error occurred")
}

/// The track requested on the command line, if any.
fn initial_track(args: &Args, catalog: &Catalog) -> Result<Option<Track>> {
    if let Some(index) = args.index {
        let track = catalog.track(index).context("Invalid song index")?;
        return Ok(Some(track));
    }

    Ok(args.url.as_ref().map(|url| {
        Track::remote(
            url.clone(),
            args.title.clone().unwrap_or_default(),
            args.artist.clone(),
            args.album_art.clone(),
        )
    }))
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the provided theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    util::term::set_terminal_bg(&Theme::to_hex(app.theme.background_colour));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`]. It is "best-effort"
/// and does not return a result, as it is called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg();
    terminal.show_cursor().ok();
}

/// Starts the input and tick threads and enters the main event loop.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Spawn a thread to translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event::Event::Key(key)) => {
                    if tx_keys.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read terminal event");
                    break;
                }
            }
        }
    });

    // Spawn a thread to send a periodic tick application event, this is the
    // frame rate of the title animation.
    let tx_tick = app.event_tx.clone();
    let frame_interval = Duration::from_millis(app.config.frame_interval_ms.max(1));
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(frame_interval);
        }
    });

    app.last_tick = Instant::now();

    // Application event loop, process events until the user quits
    process_events(terminal, app)
}
