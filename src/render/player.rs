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

//! Render the player screen.
//!
//! Album art reference, the scrolling title band, playback position and the
//! transport controls.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    render::icons::{ICON_NEXT, ICON_PREV, transport_icon},
    screen::PlayerScreen,
    theme::Theme,
    util,
};

/// Renders the player screen for the mounted track.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, player: &PlayerScreen, theme: &Theme) {
    let now_playing = player.now_playing();
    let track = now_playing.track();

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border_colour))
        .title(" Now Playing ")
        .padding(Padding::vertical(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner_area);

    let art_line = match &track.album_art {
        Some(art) => Line::from(vec![
            Span::raw("Album art: "),
            Span::styled(art.as_str(), Style::default().fg(theme.muted_fg)),
        ]),
        None => Line::from(Span::styled("No album art", Style::default().fg(theme.muted_fg))),
    };
    f.render_widget(Paragraph::new(art_line).alignment(Alignment::Center), chunks[1]);

    // Both marquee copies are composed onto a band exactly as wide as the
    // title container.
    let title_area = chunks[3];
    let band = now_playing.marquee().compose(&track.display_title(), title_area.width);
    let title = Paragraph::new(band)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .fg(theme.accent_colour);
    f.render_widget(title, title_area);

    let time = now_playing.time().unwrap_or(0.0);
    let duration = now_playing.duration().unwrap_or(0.0);

    let time_line = Line::from(vec![
        Span::styled(util::format::format_time(time as u64), Style::default().add_modifier(Modifier::BOLD)).fg(theme.accent_colour),
        Span::styled(" / ", Style::default().add_modifier(Modifier::BOLD)).fg(theme.foreground_colour),
        Span::styled(util::format::format_time(duration as u64), Style::default().add_modifier(Modifier::BOLD)).fg(theme.accent_colour),
    ]);
    f.render_widget(Paragraph::new(time_line).alignment(Alignment::Center), chunks[5]);

    let position = if duration > 0.0 { (time / duration).clamp(0.0, 1.0) } else { 0.0 };
    let position_gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent_colour).bg(theme.gauge_track_colour))
        .ratio(position)
        .label("")
        .use_unicode(true);
    f.render_widget(position_gauge, centered(chunks[6], 60));

    // Dimmed while a request is awaiting the audio subsystem.
    let transport_style = if now_playing.is_busy() {
        Style::default().fg(theme.muted_fg)
    } else {
        Style::default().fg(theme.foreground_colour).add_modifier(Modifier::BOLD)
    };

    let controls = Line::from(vec![
        Span::styled(ICON_PREV, Style::default().fg(theme.foreground_colour)),
        Span::raw("     "),
        Span::styled(transport_icon(now_playing.is_playing()), transport_style),
        Span::raw("     "),
        Span::styled(ICON_NEXT, Style::default().fg(theme.foreground_colour)),
    ]);
    f.render_widget(Paragraph::new(controls).alignment(Alignment::Center), chunks[8]);
}

// A horizontally centred slice of `area`, `percent` of its width.
fn centered(area: Rect, percent: u16) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent) / 2),
            Constraint::Percentage(percent),
            Constraint::Min(0),
        ])
        .split(area);
    chunks[1]
}
