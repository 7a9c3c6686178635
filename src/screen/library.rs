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

//! Library screen state.
//!
//! Lists the catalog and tracks the selected entry. Opening the selection
//! mounts a player screen for the catalog track at that index.

use ratatui::widgets::ListState;

#[derive(Default)]
pub(crate) struct LibraryScreen {
    pub(crate) state: ListState,
    len: usize,
}

impl LibraryScreen {
    pub(crate) fn new(len: usize) -> Self {
        let mut state = ListState::default();
        state.select((len > 0).then_some(0));
        Self { state, len }
    }

    pub(crate) fn selected_index(&self) -> Option<usize> {
        self.state.selected().filter(|&i| i < self.len)
    }

    pub(crate) fn next(&mut self) {
        if self.len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) => if i >= self.len - 1 { 0 } else { i + 1 },
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub(crate) fn previous(&mut self) {
        if self.len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) => if i == 0 { self.len - 1 } else { i - 1 },
            None => 0,
        };
        self.state.select(Some(i));
    }
}
