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

//! Audio playback requests and the per-screen audio worker.
//!
//! This module provides the [`AudioPlayer`] handle used by a player screen to
//! drive its audio resource. Every request is executed on a background worker
//! thread that owns the underlying audio library (MPV), and is acknowledged
//! with a [`PlayerEvent::RequestCompleted`] sent back to the main event loop.
//!
//! Each handle owns its own worker. Dropping the handle closes the request
//! channel, the worker exits, and the audio resource is released with it.

mod commands;
mod mpv_engine;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc,
};

use thiserror::Error;

use crate::{events::AppEvent, model::TrackSource};

pub(crate) use commands::{AudioEngine, EngineEvent};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies the playback session of one player screen.
///
/// Worker events are tagged with the session they belong to, so that late
/// events from a screen that has already gone can be discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SessionId(u64);

impl SessionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum AudioError {
    /// The source could not be opened, fetched or decoded.
    #[error("failed to create audio resource: {0}")]
    Creation(String),

    /// The audio subsystem rejected a play, pause or stop.
    #[error("audio command failed: {0}")]
    Command(String),

    #[error("no audio resource has been loaded")]
    NotLoaded,

    #[error("audio worker is no longer running")]
    Disconnected,
}

/// A single request against the audio resource of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AudioRequest {
    /// Create the resource from a source, optionally starting playback as
    /// part of creation.
    Create { source: TrackSource, autoplay: bool },
    Play,
    Pause,
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlayerEvent {
    /// Acknowledges the request that was most recently submitted.
    RequestCompleted(Result<(), AudioError>),
    DurationChanged(f64),
    TimeChanged(f64),
    TrackFinished,
    /// The worker thread has exited. Anything still in flight will never be
    /// acknowledged.
    WorkerStopped,
}

/// Destination for audio requests.
///
/// Submission only queues the request, the outcome arrives later as a
/// [`PlayerEvent::RequestCompleted`].
pub(crate) trait AudioSink {
    fn submit(&self, request: AudioRequest) -> Result<(), AudioError>;
}

/// A handle to the audio worker of one playback session.
///
/// This struct acts as a command proxy; it does not perform audio processing
/// itself but instead sends requests to a background worker thread.
pub(crate) struct AudioPlayer {
    session: SessionId,
    command_tx: mpsc::Sender<AudioRequest>,
}

impl AudioPlayer {
    /// Spawns an MPV-backed audio worker for `session`.
    ///
    /// The MPV context is not created until the first
    /// [`AudioRequest::Create`] is executed.
    pub(crate) fn new(session: SessionId, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<AudioRequest>();

        // A worker that failed to start leaves the channel closed, so every
        // request is refused as disconnected.
        if let Err(e) = commands::spawn_player_worker(session, mpv_engine::MpvEngine::new, command_rx, event_tx) {
            tracing::error!(session = %session, error = %e, "Failed to spawn audio worker");
        }

        Self { session, command_tx }
    }
}

impl AudioSink for AudioPlayer {
    fn submit(&self, request: AudioRequest) -> Result<(), AudioError> {
        tracing::trace!(session = %self.session, ?request, "Submitting audio request");
        self.command_tx
            .send(request)
            .map_err(|_| AudioError::Disconnected)
    }
}
