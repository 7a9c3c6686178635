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

//! Application configuration.
//!
//! This module manages the application configuration file: the song catalog,
//! and the tuning of the title marquee and frame rate.

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "marquee-player";

/// Extra width added to the title container, so the scrolling title has
/// fully left the container before its second copy arrives.
pub(crate) const DEFAULT_OVERSCROLL: u16 = 300;

/// Time taken for the title to scroll one full title width.
pub(crate) const DEFAULT_SCROLL_DURATION_MS: u64 = 10_000;

pub(crate) const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct LibraryEntry {
    pub(crate) file: String,
    pub(crate) title: Option<String>,
    pub(crate) artist: Option<String>,
    pub(crate) album_art: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) version: u32,
    pub(crate) overscroll: u16,
    pub(crate) scroll_duration_ms: u64,
    pub(crate) frame_interval_ms: u64,
    /// Mark playback as stopped when a track plays to its end. Off by
    /// default, the screen otherwise keeps showing the track as playing.
    pub(crate) stop_on_track_end: bool,
    pub(crate) library: Vec<LibraryEntry>,
    pub(crate) media_dirs: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            overscroll: DEFAULT_OVERSCROLL,
            scroll_duration_ms: DEFAULT_SCROLL_DURATION_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            stop_on_track_end: false,
            library: vec![],
            media_dirs: vec![],
        }
    }
}

pub(crate) fn load_config() -> AppConfig {
    match confy::load(CONFIG_NAME, None) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load configuration, using defaults");
            AppConfig::default()
        }
    }
}
