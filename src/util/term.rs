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

//! Terminal background control.
//!
//! The player paints the whole terminal window in the theme background using
//! OSC (Operating System Command) escape sequences, and hands the original
//! background back on exit. Terminals that do not understand the sequences
//! (most modern ones do) simply ignore them.

use std::io::{self, Write};

/// Sets the terminal background colour (OSC 11).
///
/// # Arguments
///
/// * `hex_colour` - The colour as a CSS-style hex string, e.g. `"#000000"`.
pub(crate) fn set_terminal_bg(hex_colour: &str) {
    write_osc(&format!("11;{}", hex_colour));
}

/// Restores the background the terminal was configured with (OSC 111).
pub(crate) fn reset_terminal_bg() {
    write_osc("111");
}

fn osc_sequence(body: &str) -> String {
    format!("\x1b]{}\x07", body)
}

// Best effort, a terminal we cannot write to has bigger problems.
fn write_osc(body: &str) {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(osc_sequence(body).as_bytes());
    let _ = stdout.flush();
}
