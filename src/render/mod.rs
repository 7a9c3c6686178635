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

//! User interface rendering logic.
//!
//! This module handles the translation of the [`App`] state into visual
//! widgets using the `ratatui` framework.
//!
//! # Rendering Pipeline
//!
//! The primary entry point is the [`draw`] function, which is called after
//! every processed event (including frame ticks, which drive the title
//! marquee). Only the screen on top of the stack is drawn.

mod icons;
mod library;
mod player;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Paragraph,
};

use crate::{
    App,
    render::{library::draw_library, player::draw_player},
    screen::Screen,
    theme::Theme,
};

const LIBRARY_KEYS: &str = " j/k select  enter play  esc back  q quit";
const PLAYER_KEYS: &str = " space play/pause  h/l previous/next  esc back  q quit";

/// Renders the user interface to the terminal frame.
///
/// # Arguments
///
/// * `f` - The current terminal frame used for drawing.
/// * `app` - A mutable reference to the application state, allowing the UI
///   to update internal view state (like list scroll positions).
pub(crate) fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let keys = match app.screens.last_mut() {
        Some(Screen::Library(library)) => {
            draw_library(f, outer[0], library, &app.catalog, &app.theme);
            LIBRARY_KEYS
        }
        Some(Screen::Player(player)) => {
            draw_player(f, outer[0], player, &app.theme);
            PLAYER_KEYS
        }
        None => "",
    };

    draw_key_hints(f, outer[1], keys, &app.theme);
}

fn draw_key_hints(f: &mut Frame, area: Rect, keys: &str, theme: &Theme) {
    let hints = Paragraph::new(keys).style(Style::default().fg(theme.muted_fg));
    f.render_widget(hints, area);
}
