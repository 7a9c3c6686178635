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

//! Render the library screen.
//!
//! This module renders the catalog as a selectable list of songs.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{model::catalog::Catalog, screen::LibraryScreen, theme::Theme};

/// Renders the catalog list with the current selection highlighted.
pub(crate) fn draw_library(f: &mut Frame, area: Rect, library: &mut LibraryScreen, catalog: &Catalog, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Library ")
        .border_style(Style::default().fg(theme.border_colour));

    if catalog.is_empty() {
        let message = Paragraph::new("No songs configured. Add library entries or media directories to the configuration file.")
            .style(Style::default().fg(theme.muted_fg))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(message, area);
        return;
    }

    let width = catalog.len().to_string().len().max(2);
    let items: Vec<ListItem> = catalog
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let label = match &entry.artist {
                Some(artist) => format!("{:0width$} {} - {}", i + 1, entry.title, artist),
                None => format!("{:0width$} {}", i + 1, entry.title),
            };
            ListItem::new(label)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .style(Style::default().fg(theme.foreground_colour))
        .highlight_style(Style::default().bg(theme.highlight_bg).fg(theme.accent_colour).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut library.state);
}
