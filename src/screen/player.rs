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

//! The player screen.
//!
//! A player screen plays one track. [`NowPlaying`] composes the playback
//! controller, the title marquee and the back navigation logic of the
//! screen; [`PlayerScreen`] mounts it, giving it its own audio worker and
//! registering its back listener for as long as the screen exists.

use std::{
    cell::{Ref, RefCell},
    rc::Rc,
    sync::mpsc::Sender,
    time::Duration,
};

use crate::{
    config::AppConfig,
    events::AppEvent,
    lifecycle::{BackHandler, BackSubscription, Navigator, ScreenLifecycle},
    marquee::MarqueeAnimator,
    model::Track,
    playback::{PlaybackChange, PlaybackController},
    player::{AudioPlayer, AudioSink, PlayerEvent, SessionId},
};

pub(crate) struct NowPlaying<S, N> {
    controller: PlaybackController<S>,
    marquee: MarqueeAnimator,
    lifecycle: ScreenLifecycle<N>,
    title_width: u16,
    stop_on_track_end: bool,
    time: Option<f64>,
    duration: Option<f64>,
}

impl<S: AudioSink, N: Navigator> NowPlaying<S, N> {
    /// The marquee title width is fixed here, from the container width at the
    /// time the screen is created.
    pub(crate) fn new(track: Track, sink: S, navigator: N, container_width: u16, config: &AppConfig) -> Self {
        Self {
            controller: PlaybackController::new(track, sink),
            marquee: MarqueeAnimator::new(Duration::from_millis(config.scroll_duration_ms)),
            lifecycle: ScreenLifecycle::new(navigator),
            title_width: container_width.saturating_add(config.overscroll),
            stop_on_track_end: config.stop_on_track_end,
            time: None,
            duration: None,
        }
    }

    pub(crate) fn track(&self) -> &Track {
        self.controller.track()
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.controller.is_busy()
    }

    pub(crate) fn marquee(&self) -> &MarqueeAnimator {
        &self.marquee
    }

    #[cfg(test)]
    pub(crate) fn title_width(&self) -> u16 {
        self.title_width
    }

    pub(crate) fn time(&self) -> Option<f64> {
        self.time
    }

    pub(crate) fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub(crate) fn toggle_play_pause(&mut self) {
        if self.lifecycle.is_leaving() {
            return;
        }
        self.controller.toggle_play_pause();
    }

    pub(crate) fn skip_to_previous(&self) {
        self.controller.skip_to_previous();
    }

    pub(crate) fn skip_to_next(&self) {
        self.controller.skip_to_next();
    }

    /// Reacts to the back signal. Always handles it.
    pub(crate) fn handle_back(&mut self) -> bool {
        self.lifecycle.request_back(&mut self.controller, &mut self.marquee);
        true
    }

    pub(crate) fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::RequestCompleted(result) => {
                let change = self.controller.complete(result);
                self.apply(change);
                self.lifecycle.settle(&mut self.controller, &mut self.marquee);
            }
            PlayerEvent::DurationChanged(seconds) => self.duration = Some(seconds),
            PlayerEvent::TimeChanged(seconds) => self.time = Some(seconds),
            PlayerEvent::TrackFinished => {
                self.time = self.duration;
                if self.stop_on_track_end {
                    let change = self.controller.finish();
                    self.apply(change);
                } else {
                    tracing::info!(track = %self.track().title, "Track reached its end");
                }
            }
            PlayerEvent::WorkerStopped => {
                tracing::warn!(track = %self.track().title, "Audio worker stopped");
                let change = self.controller.disconnect();
                self.apply(change);
                self.lifecycle.settle(&mut self.controller, &mut self.marquee);
            }
        }
    }

    pub(crate) fn tick(&mut self, elapsed: Duration) {
        self.marquee.tick(elapsed);
    }

    // Playing restarts the marquee from the beginning, anything else holds
    // it where it is.
    fn apply(&mut self, change: PlaybackChange) {
        match change {
            PlaybackChange::Started => self.marquee.start(self.title_width),
            PlaybackChange::Paused | PlaybackChange::Stopped => self.marquee.freeze(),
            PlaybackChange::Unchanged => {}
        }
    }
}

pub(crate) struct PlayerScreen<S = AudioPlayer, N = Sender<AppEvent>> {
    session: SessionId,
    now_playing: Rc<RefCell<NowPlaying<S, N>>>,
    // Declared last: removing the listener drops the last reference to the
    // session, which shuts its audio worker down.
    _back_subscription: BackSubscription,
}

impl PlayerScreen {
    /// Mounts a player screen for `track`, with a fresh audio session, and
    /// registers its back listener.
    pub(crate) fn mount(
        track: Track,
        container_width: u16,
        config: &AppConfig,
        event_tx: &Sender<AppEvent>,
        back_handler: &BackHandler,
    ) -> Self {
        let session = SessionId::next();
        let player = AudioPlayer::new(session, event_tx.clone());

        tracing::info!(session = %session, title = %track.title, source = %track.source, "Mounting player screen");

        let now_playing = NowPlaying::new(track, player, event_tx.clone(), container_width, config);

        Self::attach(session, now_playing, back_handler)
    }
}

impl<S: AudioSink + 'static, N: Navigator + 'static> PlayerScreen<S, N> {
    /// Puts `now_playing` on screen and registers its back listener.
    fn attach(session: SessionId, now_playing: NowPlaying<S, N>, back_handler: &BackHandler) -> Self {
        let now_playing = Rc::new(RefCell::new(now_playing));

        // The listener reads the session when the signal fires, never a copy
        // taken at mount time.
        let listener_state = Rc::clone(&now_playing);
        let back_subscription = back_handler.add_listener(move || listener_state.borrow_mut().handle_back());

        Self {
            session,
            now_playing,
            _back_subscription: back_subscription,
        }
    }

    pub(crate) fn session(&self) -> SessionId {
        self.session
    }

    pub(crate) fn now_playing(&self) -> Ref<'_, NowPlaying<S, N>> {
        self.now_playing.borrow()
    }

    pub(crate) fn toggle_play_pause(&self) {
        self.now_playing.borrow_mut().toggle_play_pause();
    }

    pub(crate) fn skip_to_previous(&self) {
        self.now_playing.borrow().skip_to_previous();
    }

    pub(crate) fn skip_to_next(&self) {
        self.now_playing.borrow().skip_to_next();
    }

    pub(crate) fn handle_player_event(&self, event: PlayerEvent) {
        self.now_playing.borrow_mut().handle_player_event(event);
    }

    pub(crate) fn tick(&self, elapsed: Duration) {
        self.now_playing.borrow_mut().tick(elapsed);
    }
}

impl<S, N> Drop for PlayerScreen<S, N> {
    fn drop(&mut self) {
        tracing::debug!(session = %self.session, "Unmounting player screen");
    }
}
