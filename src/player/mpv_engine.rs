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

//! MPV-backed audio engine.
//!
//! Wraps a `libmpv` context configured for audio only. MPV executes
//! `loadfile` asynchronously, so loading waits for the file to be opened (or
//! to fail) before acknowledging, buffering any property observations that
//! arrive in the meantime.
//!
//! The file stays loaded when it reaches its end (`keep-open`), so the end of
//! a track is seen through the `eof-reached` property rather than an
//! `EndFile` event.

use std::{collections::VecDeque, time::Duration};

use mpv::Format;

use crate::{
    model::TrackSource,
    player::{AudioEngine, AudioError, EngineEvent},
};

pub(crate) struct MpvEngine {
    handler: mpv::MpvHandler,
    backlog: VecDeque<EngineEvent>,
}

impl MpvEngine {
    /// Creates an MPV context with video output disabled, the file kept open
    /// at its end, and the playback properties observed.
    pub(crate) fn new() -> Result<Self, AudioError> {
        let mut builder = mpv::MpvHandlerBuilder::new().map_err(creation_error)?;
        builder.set_option("vo", "null").map_err(creation_error)?;
        builder.set_option("keep-open", "yes").map_err(creation_error)?;
        let mut handler = builder.build().map_err(creation_error)?;

        handler
            .observe_property::<f64>("duration", 0)
            .map_err(creation_error)?;
        handler
            .observe_property::<f64>("time-pos", 0)
            .map_err(creation_error)?;
        handler
            .observe_property::<bool>("eof-reached", 0)
            .map_err(creation_error)?;

        tracing::debug!("MPV context created");

        Ok(Self {
            handler,
            backlog: VecDeque::new(),
        })
    }
}

impl AudioEngine for MpvEngine {
    fn load(&mut self, source: &TrackSource, autoplay: bool) -> Result<(), AudioError> {
        let location = source.location();

        self.handler
            .set_property("pause", !autoplay)
            .map_err(command_error)?;
        self.handler
            .command(&["loadfile", &location, "replace"])
            .map_err(creation_error)?;

        loop {
            match self.handler.wait_event(POLL_SECONDS) {
                Some(mpv::Event::FileLoaded) => return Ok(()),
                Some(mpv::Event::EndFile(Err(e))) => return Err(creation_error(e)),
                Some(mpv::Event::EndFile(Ok(_))) => {
                    return Err(AudioError::Creation(format!("{} closed while loading", location)));
                }
                Some(event) => {
                    if let Some(observed) = translate_event(event) {
                        self.backlog.push_back(observed);
                    }
                }
                None => {}
            }
        }
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.handler.set_property("pause", false).map_err(command_error)
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.handler.set_property("pause", true).map_err(command_error)
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.handler.command(&["stop"]).map_err(command_error)
    }

    fn wait_event(&mut self, timeout: Duration) -> Option<EngineEvent> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        self.handler
            .wait_event(timeout.as_secs_f64())
            .and_then(translate_event)
    }
}

const POLL_SECONDS: f64 = 0.05;

fn translate_event(event: mpv::Event) -> Option<EngineEvent> {
    match event {
        mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
            ("duration", Format::Double(seconds)) => Some(EngineEvent::Duration(seconds)),
            ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => Some(EngineEvent::Time(seconds)),
            ("eof-reached", Format::Flag(true)) => Some(EngineEvent::EndOfTrack),
            _ => None,
        },
        mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF)) => Some(EngineEvent::EndOfTrack),
        _ => None,
    }
}

fn creation_error(e: mpv::Error) -> AudioError {
    AudioError::Creation(format!("{:?}", e))
}

fn command_error(e: mpv::Error) -> AudioError {
    AudioError::Command(format!("{:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(name: &'static str, change: Format<'static>) -> mpv::Event<'static> {
        mpv::Event::PropertyChange {
            name,
            change,
            reply_userdata: 0,
        }
    }

    #[test]
    fn reaching_the_end_of_a_kept_open_file_finishes_the_track() {
        assert_eq!(
            translate_event(property("eof-reached", Format::Flag(true))),
            Some(EngineEvent::EndOfTrack)
        );
        assert_eq!(translate_event(property("eof-reached", Format::Flag(false))), None);
    }

    #[test]
    fn position_and_duration_are_reported() {
        assert_eq!(
            translate_event(property("duration", Format::Double(212.5))),
            Some(EngineEvent::Duration(212.5))
        );
        assert_eq!(
            translate_event(property("time-pos", Format::Double(3.0))),
            Some(EngineEvent::Time(3.0))
        );
        assert_eq!(translate_event(property("time-pos", Format::Double(-1.0))), None);
    }
}
