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

//! Domain models and core data structures.
//!
//! This module defines the [`Track`] handed to a player screen, and the
//! [`TrackSource`] it is played from. A track is immutable once a screen has
//! been created for it.

pub(crate) mod catalog;

use std::{fmt, path::PathBuf};

/// Where the audio for a track comes from.
///
/// A track always has exactly one source, either a file shipped with the
/// local catalog or a remote stream that the audio backend fetches itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TrackSource {
    Asset(PathBuf),
    Remote(String),
}

impl TrackSource {
    /// Remote streams are created with autoplay requested, assets are started
    /// with a separate play request once loaded.
    pub(crate) fn autoplay_on_create(&self) -> bool {
        matches!(self, TrackSource::Remote(_))
    }

    /// The location string handed to the audio backend.
    pub(crate) fn location(&self) -> String {
        match self {
            TrackSource::Asset(path) => path.to_string_lossy().into_owned(),
            TrackSource::Remote(url) => url.clone(),
        }
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSource::Asset(path) => write!(f, "asset:{}", path.display()),
            TrackSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Track {
    pub(crate) source: TrackSource,
    pub(crate) title: String,
    pub(crate) artist: Option<String>,
    pub(crate) album_art: Option<String>,
}

impl Track {
    pub(crate) fn remote(url: String, title: String, artist: Option<String>, album_art: Option<String>) -> Self {
        Self {
            source: TrackSource::Remote(url),
            title,
            artist,
            album_art,
        }
    }

    /// The text scrolled by the marquee, "title - artist" when an artist is
    /// known.
    pub(crate) fn display_title(&self) -> String {
        match &self.artist {
            Some(artist) if !artist.is_empty() => format!("{} - {}", self.title, artist),
            _ => self.title.clone(),
        }
    }
}
