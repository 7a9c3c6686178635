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

use std::{sync::mpsc::Sender, time::Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    App,
    events::AppEvent,
    player::{PlayerEvent, SessionId},
    screen::{LibraryScreen, PlayerScreen, Screen},
};

/// Maps keyboard input to application actions and playback commands.
///
/// Global keys (quit, back) are handled first, everything else is routed to
/// the screen on top of the stack.
///
/// # Errors
///
/// Returns an error if an event cannot be sent to the event loop.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => app.event_tx.send(AppEvent::ExitApplication)?,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => app.event_tx.send(AppEvent::ExitApplication)?,

        (KeyCode::Esc, _) | (KeyCode::Backspace, _) => handle_back_signal(app),

        _ => match app.screens.last_mut() {
            Some(Screen::Library(library)) => process_library_key(library, key, &app.event_tx)?,
            Some(Screen::Player(player)) => process_player_key(player, key),
            None => {}
        },
    }

    Ok(())
}

fn process_library_key(library: &mut LibraryScreen, key: KeyEvent, event_tx: &Sender<AppEvent>) -> Result<()> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => library.next(),
        KeyCode::Char('k') | KeyCode::Up => library.previous(),
        KeyCode::Enter => {
            if let Some(index) = library.selected_index() {
                event_tx.send(AppEvent::OpenTrack(index))?;
            }
        }
        _ => {}
    }

    Ok(())
}

fn process_player_key(player: &PlayerScreen, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => player.toggle_play_pause(),
        KeyCode::Char('h') | KeyCode::Left => player.skip_to_previous(),
        KeyCode::Char('l') | KeyCode::Right => player.skip_to_next(),
        _ => {}
    }
}

/// Offers the back signal to the registered listeners, falling back to
/// leaving the current screen when none of them handles it.
pub(super) fn handle_back_signal(app: &mut App) {
    if !app.back_handler.dispatch() {
        handle_navigate_back(app);
    }
}

pub(super) fn handle_navigate_back(app: &mut App) {
    if app.screens.pop().is_some() {
        tracing::debug!(remaining = app.screens.len(), "Navigated back");
    }
}

pub(super) fn handle_open_track(app: &mut App, index: usize) {
    match app.catalog.track(index) {
        Ok(track) => app.open_player(track),
        Err(e) => tracing::error!(error = %e, "Cannot open track"),
    }
}

pub(super) fn handle_player_event(app: &mut App, session: SessionId, event: PlayerEvent) {
    let screen = app.screens.iter().find_map(|screen| match screen {
        Screen::Player(player) if player.session() == session => Some(player),
        _ => None,
    });

    match screen {
        Some(player) => player.handle_player_event(event),
        None => tracing::debug!(session = %session, ?event, "Dropping event for unmounted session"),
    }
}

pub(super) fn handle_tick(app: &mut App) {
    let now = Instant::now();
    let elapsed = now.saturating_duration_since(app.last_tick);
    app.last_tick = now;

    if let Some(Screen::Player(player)) = app.screens.last() {
        player.tick(elapsed);
    }
}
