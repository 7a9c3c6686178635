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

//! Playback state machine for a single track.
//!
//! The [`PlaybackController`] coordinates the transport controls of a player
//! screen with the asynchronous audio resource behind it. Requests are
//! submitted to an [`AudioSink`] and their acknowledgements are applied later
//! with [`PlaybackController::complete`].
//!
//! # Invariants
//!
//! * No resource exists until the first play request creates it, and it is
//!   never created twice.
//! * `is_playing` is only set once the audio subsystem has acknowledged that
//!   playback started.
//! * At most one request is in flight. Presses arriving while a request is
//!   outstanding are ignored.
//! * Failures are logged and leave the state as it was.

use crate::{
    model::Track,
    player::{AudioError, AudioRequest, AudioSink},
};

/// The request currently awaiting acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Create { autoplay: bool },
    // Asset creation whose follow-up play request has been called off.
    CreateOnly,
    Play,
    Pause,
    Stop,
}

/// Effect of an acknowledgement on the playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaybackChange {
    Started,
    Paused,
    Stopped,
    Unchanged,
}

pub(crate) struct PlaybackController<S> {
    track: Track,
    sink: S,
    loaded: bool,
    is_playing: bool,
    pending: Option<Pending>,
}

impl<S: AudioSink> PlaybackController<S> {
    pub(crate) fn new(track: Track, sink: S) -> Self {
        Self {
            track,
            sink,
            loaded: false,
            is_playing: false,
            pending: None,
        }
    }

    pub(crate) fn track(&self) -> &Track {
        &self.track
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[cfg(test)]
    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a request is awaiting acknowledgement.
    pub(crate) fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Pauses when playing, otherwise starts playback, creating the audio
    /// resource on first use.
    ///
    /// Returns whether a request was submitted.
    pub(crate) fn toggle_play_pause(&mut self) -> bool {
        if let Some(pending) = self.pending {
            tracing::debug!(?pending, "Ignoring play/pause while a request is in flight");
            return false;
        }

        tracing::debug!(is_playing = self.is_playing, loaded = self.loaded, "Toggling playback");

        if self.is_playing {
            self.submit(AudioRequest::Pause, Pending::Pause)
        } else if self.loaded {
            self.submit(AudioRequest::Play, Pending::Play)
        } else {
            let source = self.track.source.clone();
            let autoplay = source.autoplay_on_create();
            tracing::info!(source = %source, autoplay, "Creating audio resource");
            self.submit(AudioRequest::Create { source, autoplay }, Pending::Create { autoplay })
        }
    }

    /// Stops playback.
    ///
    /// Does nothing, and submits nothing, unless the track is playing and no
    /// other request is in flight. Returns whether a request was submitted.
    pub(crate) fn stop(&mut self) -> bool {
        if !self.is_playing || self.pending.is_some() {
            return false;
        }

        self.submit(AudioRequest::Stop, Pending::Stop)
    }

    /// Calls off the play request that follows the creation of an asset
    /// resource still in flight. The resource is loaded but left paused.
    pub(crate) fn cancel_autostart(&mut self) {
        if self.pending == Some(Pending::Create { autoplay: false }) {
            tracing::debug!("Cancelling playback start after load");
            self.pending = Some(Pending::CreateOnly);
        }
    }

    /// Applies the acknowledgement of the request in flight.
    ///
    /// Loading an asset completes in two steps: once the resource has been
    /// created, playback is started with a separate play request and the
    /// controller stays busy until that one is acknowledged too.
    pub(crate) fn complete(&mut self, result: Result<(), AudioError>) -> PlaybackChange {
        let Some(pending) = self.pending.take() else {
            tracing::warn!(?result, "Acknowledgement received with no request in flight");
            return PlaybackChange::Unchanged;
        };

        if let Err(e) = result {
            match pending {
                Pending::Create { .. } | Pending::CreateOnly => tracing::error!(error = %e, track = %self.track.title, "Error creating audio resource"),
                _ => tracing::error!(error = %e, request = ?pending, "Error playing/pausing sound"),
            }
            return PlaybackChange::Unchanged;
        }

        match pending {
            Pending::Create { autoplay: true } => {
                self.loaded = true;
                self.started()
            }
            Pending::Create { autoplay: false } => {
                self.loaded = true;
                self.submit(AudioRequest::Play, Pending::Play);
                PlaybackChange::Unchanged
            }
            Pending::CreateOnly => {
                self.loaded = true;
                tracing::info!(track = %self.track.title, "Audio resource loaded, not starting playback");
                PlaybackChange::Unchanged
            }
            Pending::Play => self.started(),
            Pending::Pause => {
                self.is_playing = false;
                tracing::info!("Playback paused");
                PlaybackChange::Paused
            }
            Pending::Stop => {
                self.is_playing = false;
                tracing::info!("Playback stopped");
                PlaybackChange::Stopped
            }
        }
    }

    /// The track played to its end.
    ///
    /// The next play request loads the resource again, from the start.
    pub(crate) fn finish(&mut self) -> PlaybackChange {
        if self.pending.is_some() || !self.is_playing {
            return PlaybackChange::Unchanged;
        }

        self.is_playing = false;
        self.loaded = false;
        tracing::info!(track = %self.track.title, "Track finished");
        PlaybackChange::Stopped
    }

    /// The audio worker is gone, taking the resource and any request in
    /// flight with it.
    pub(crate) fn disconnect(&mut self) -> PlaybackChange {
        let was_playing = self.is_playing;
        if let Some(pending) = self.pending.take() {
            tracing::error!(request = ?pending, "Audio worker stopped with a request in flight");
        }
        self.is_playing = false;
        self.loaded = false;

        if was_playing {
            PlaybackChange::Stopped
        } else {
            PlaybackChange::Unchanged
        }
    }

    pub(crate) fn skip_to_previous(&self) {
        tracing::info!("Previous button pressed");
    }

    pub(crate) fn skip_to_next(&self) {
        tracing::info!("Next button pressed");
    }

    fn started(&mut self) -> PlaybackChange {
        self.is_playing = true;
        tracing::info!(track = %self.track.title, "Playback started");
        PlaybackChange::Started
    }

    fn submit(&mut self, request: AudioRequest, pending: Pending) -> bool {
        match self.sink.submit(request) {
            Ok(()) => {
                self.pending = Some(pending);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, request = ?pending, "Failed to submit audio request");
                false
            }
        }
    }
}
