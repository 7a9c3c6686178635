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

//! The song catalog.
//!
//! Player screens look songs up by index. The catalog is assembled from the
//! entries listed in the configuration file, followed by any audio files found
//! under the configured media directories. Titles missing from the
//! configuration are read from file tags, falling back to the file name.

use std::path::{Path, PathBuf};

use lofty::prelude::*;
use lofty::probe::Probe;
use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    config::{AppConfig, LibraryEntry},
    model::{Track, TrackSource},
};

const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "m4a", "flac", "ogg", "wav"];

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("no catalog entry at index {index} (catalog has {len} entries)")]
    NoSuchEntry { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CatalogEntry {
    pub(crate) file: PathBuf,
    pub(crate) title: String,
    pub(crate) artist: Option<String>,
    pub(crate) album_art: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub(crate) fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Builds the catalog from the application configuration.
    ///
    /// Configured entries keep their order and come first. Files discovered in
    /// the media directories are appended sorted by path so that indexes are
    /// stable between runs.
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        let mut entries: Vec<CatalogEntry> = config.library.iter().map(CatalogEntry::from_config).collect();

        for dir in &config.media_dirs {
            let mut found: Vec<PathBuf> = WalkDir::new(dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();

            tracing::debug!(dir = %dir, count = found.len(), "Scanned media directory");

            entries.extend(found.into_iter().map(|file| {
                let (title, artist) = read_tags(&file);
                CatalogEntry {
                    title: title.unwrap_or_else(|| file_title(&file)),
                    artist,
                    album_art: None,
                    file,
                }
            }));
        }

        tracing::info!(entries = entries.len(), "Catalog loaded");

        Self::new(entries)
    }

    pub(crate) fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the track at `index`.
    pub(crate) fn track(&self, index: usize) -> Result<Track, CatalogError> {
        let entry = self.entries.get(index).ok_or(CatalogError::NoSuchEntry {
            index,
            len: self.entries.len(),
        })?;

        Ok(Track {
            source: TrackSource::Asset(entry.file.clone()),
            title: entry.title.clone(),
            artist: entry.artist.clone(),
            album_art: entry.album_art.clone(),
        })
    }
}

impl CatalogEntry {
    fn from_config(entry: &LibraryEntry) -> Self {
        let file = PathBuf::from(&entry.file);

        let (tag_title, tag_artist) = match (&entry.title, &entry.artist) {
            (Some(_), Some(_)) => (None, None),
            _ => read_tags(&file),
        };

        Self {
            title: entry
                .title
                .clone()
                .or(tag_title)
                .unwrap_or_else(|| file_title(&file)),
            artist: entry.artist.clone().or(tag_artist),
            album_art: entry.album_art.clone(),
            file,
        }
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// Title and artist from the file tags, when the file can be read at all.
fn read_tags(path: &Path) -> (Option<String>, Option<String>) {
    let tagged_file = match Probe::open(path).and_then(|p| p.read()) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Could not read tags");
            return (None, None);
        }
    };

    match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        Some(tag) => (
            tag.title().map(|t| t.to_string()),
            tag.artist().map(|a| a.to_string()),
        ),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: &str, title: &str) -> CatalogEntry {
        CatalogEntry {
            file: PathBuf::from(file),
            title: title.to_string(),
            artist: None,
            album_art: Some("art/cover.png".to_string()),
        }
    }

    #[test]
    fn track_lookup_by_index_resolves_an_asset() {
        let catalog = Catalog::new(vec![
            entry("assets/back-to-life.mp3", "Back To Life - Bethel Music and Zahriya Zachary"),
            entry("assets/praise.mp3", "Praise - Elevation Worship"),
        ]);

        let track = catalog.track(1).unwrap();
        assert_eq!(track.source, TrackSource::Asset(PathBuf::from("assets/praise.mp3")));
        assert_eq!(track.title, "Praise - Elevation Worship");
        assert_eq!(track.album_art.as_deref(), Some("art/cover.png"));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let catalog = Catalog::new(vec![entry("a.mp3", "A")]);

        match catalog.track(3) {
            Err(CatalogError::NoSuchEntry { index, len }) => {
                assert_eq!(index, 3);
                assert_eq!(len, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn configured_titles_take_precedence_over_file_names() {
        let configured = LibraryEntry {
            file: "does/not/exist/joy.m4a".to_string(),
            title: Some("joy. - for KING & COUNTRY".to_string()),
            artist: None,
            album_art: None,
        };
        let untitled = LibraryEntry {
            file: "does/not/exist/Same God.mp3".to_string(),
            title: None,
            artist: None,
            album_art: None,
        };

        assert_eq!(CatalogEntry::from_config(&configured).title, "joy. - for KING & COUNTRY");
        assert_eq!(CatalogEntry::from_config(&untitled).title, "Same God");
    }

    #[test]
    fn audio_files_are_recognised_by_extension() {
        assert!(is_audio_file(Path::new("a/b/song.MP3")));
        assert!(is_audio_file(Path::new("song.m4a")));
        assert!(!is_audio_file(Path::new("cover.png")));
        assert!(!is_audio_file(Path::new("README")));
    }
}
