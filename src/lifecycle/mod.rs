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

//! Back navigation and screen teardown.
//!
//! [`BackHandler`] is the registry for the "back" signal. A screen registers a
//! listener when it is mounted and holds on to the returned
//! [`BackSubscription`]; dropping the subscription when the screen goes away
//! removes the listener, so it can never fire against a torn-down session.
//!
//! [`ScreenLifecycle`] holds the back logic of a player screen: stop playback
//! if it is running, release the marquee, then navigate back exactly once.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{
    marquee::MarqueeAnimator,
    playback::PlaybackController,
    player::AudioSink,
};

type Listener = Rc<RefCell<dyn FnMut() -> bool>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Dispatches the back signal to registered listeners.
#[derive(Clone, Default)]
pub(crate) struct BackHandler {
    registry: Rc<RefCell<Registry>>,
}

/// Keeps a back listener registered until dropped.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub(crate) struct BackSubscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl BackHandler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. It returns `true` when it has handled the signal,
    /// suppressing the default back behaviour.
    pub(crate) fn add_listener<F>(&self, listener: F) -> BackSubscription
    where
        F: FnMut() -> bool + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        registry.listeners.push((id, listener));

        tracing::trace!(id, "Back listener added");

        BackSubscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Offers the back signal to the listeners, most recently registered
    /// first, until one handles it.
    ///
    /// Returns `false` when no listener handled the signal.
    pub(crate) fn dispatch(&self) -> bool {
        // Listeners may add or remove subscriptions while being called.
        let snapshot: Vec<(u64, Listener)> = self.registry.borrow().listeners.iter().rev().cloned().collect();

        for (id, listener) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            let mut callback = listener.borrow_mut();
            if (&mut *callback)() {
                return true;
            }
        }

        false
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    fn is_registered(&self, id: u64) -> bool {
        self.registry.borrow().listeners.iter().any(|(i, _)| *i == id)
    }
}

impl Drop for BackSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
            tracing::trace!(id = self.id, "Back listener removed");
        }
    }
}

/// Receives the "go back one screen" command.
pub(crate) trait Navigator {
    fn go_back(&self);
}

/// Back navigation state of one player screen.
pub(crate) struct ScreenLifecycle<N> {
    navigator: N,
    back_requested: bool,
    stop_issued: bool,
    navigated: bool,
}

impl<N: Navigator> ScreenLifecycle<N> {
    pub(crate) fn new(navigator: N) -> Self {
        Self {
            navigator,
            back_requested: false,
            stop_issued: false,
            navigated: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn has_navigated(&self) -> bool {
        self.navigated
    }

    /// Whether the screen is on its way out.
    pub(crate) fn is_leaving(&self) -> bool {
        self.back_requested
    }

    /// Handles the back signal.
    ///
    /// Navigation happens immediately when nothing is playing. Otherwise it
    /// is deferred until the stop request (and any request already in
    /// flight) has been acknowledged, see [`ScreenLifecycle::settle`]. An
    /// asset still loading is not started once it is ready.
    pub(crate) fn request_back<S: AudioSink>(
        &mut self,
        controller: &mut PlaybackController<S>,
        marquee: &mut MarqueeAnimator,
    ) {
        if self.back_requested {
            tracing::debug!("Back already requested");
        }
        self.back_requested = true;
        controller.cancel_autostart();
        self.settle(controller, marquee);
    }

    /// Progresses a pending back navigation. Called after every
    /// acknowledgement from the audio worker.
    pub(crate) fn settle<S: AudioSink>(
        &mut self,
        controller: &mut PlaybackController<S>,
        marquee: &mut MarqueeAnimator,
    ) {
        if !self.back_requested || self.navigated {
            return;
        }

        if controller.is_busy() {
            tracing::debug!("Back navigation waiting for audio request in flight");
            return;
        }

        if controller.is_playing() && !self.stop_issued {
            self.stop_issued = true;
            if controller.stop() {
                return;
            }
        }

        if controller.is_playing() {
            tracing::warn!("Playback could not be stopped, leaving screen anyway");
        }

        marquee.release();
        self.navigated = true;
        self.navigator.go_back();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::Cell, time::Duration};

    use super::*;
    use crate::{
        playback::tests::{RecordingSink, asset_track},
        player::{AudioError, AudioRequest},
    };

    #[derive(Clone, Default)]
    pub(crate) struct RecordingNavigator {
        pub(crate) back_count: Rc<Cell<usize>>,
    }

    impl Navigator for RecordingNavigator {
        fn go_back(&self) {
            self.back_count.set(self.back_count.get() + 1);
        }
    }

    #[test]
    fn listeners_are_offered_the_signal_newest_first() {
        let handler = BackHandler::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let c = calls.clone();
        let _first = handler.add_listener(move || {
            c.borrow_mut().push("first");
            true
        });
        let c = calls.clone();
        let _second = handler.add_listener(move || {
            c.borrow_mut().push("second");
            false
        });

        assert!(handler.dispatch());
        assert_eq!(*calls.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn dropping_the_subscription_removes_the_listener() {
        let handler = BackHandler::new();
        let fired = Rc::new(Cell::new(0));

        let f = fired.clone();
        let subscription = handler.add_listener(move || {
            f.set(f.get() + 1);
            true
        });
        assert_eq!(handler.listener_count(), 1);
        assert!(handler.dispatch());

        drop(subscription);
        assert_eq!(handler.listener_count(), 0);
        assert!(!handler.dispatch());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn subscription_outliving_the_handler_is_harmless() {
        let handler = BackHandler::new();
        let subscription = handler.add_listener(|| true);
        drop(handler);
        drop(subscription);
    }

    fn playing_controller() -> (PlaybackController<RecordingSink>, RecordingSink) {
        let sink = RecordingSink::default();
        let mut controller = PlaybackController::new(asset_track(), sink.clone());
        controller.toggle_play_pause();
        controller.complete(Ok(()));
        controller.complete(Ok(()));
        sink.taken();
        (controller, sink)
    }

    #[test]
    fn back_while_idle_navigates_immediately() {
        let sink = RecordingSink::default();
        let mut controller = PlaybackController::new(asset_track(), sink.clone());
        let mut marquee = MarqueeAnimator::new(Duration::from_secs(10));
        let navigator = RecordingNavigator::default();
        let mut lifecycle = ScreenLifecycle::new(navigator.clone());

        lifecycle.request_back(&mut controller, &mut marquee);

        assert!(sink.taken().is_empty());
        assert_eq!(navigator.back_count.get(), 1);
        assert!(lifecycle.has_navigated());
    }

    #[test]
    fn back_while_playing_stops_before_navigating() {
        let (mut controller, sink) = playing_controller();
        let mut marquee = MarqueeAnimator::new(Duration::from_secs(10));
        marquee.start(380);
        let navigator = RecordingNavigator::default();
        let mut lifecycle = ScreenLifecycle::new(navigator.clone());

        lifecycle.request_back(&mut controller, &mut marquee);
        assert_eq!(sink.taken(), vec![AudioRequest::Stop]);
        assert_eq!(navigator.back_count.get(), 0);

        controller.complete(Ok(()));
        lifecycle.settle(&mut controller, &mut marquee);

        assert!(!controller.is_playing());
        assert!(!marquee.is_running());
        assert_eq!(navigator.back_count.get(), 1);
    }

    #[test]
    fn back_waits_for_the_request_in_flight() {
        let sink = RecordingSink::default();
        let mut controller = PlaybackController::new(asset_track(), sink.clone());
        let mut marquee = MarqueeAnimator::new(Duration::from_secs(10));
        let navigator = RecordingNavigator::default();
        let mut lifecycle = ScreenLifecycle::new(navigator.clone());

        controller.toggle_play_pause();
        sink.taken();
        lifecycle.request_back(&mut controller, &mut marquee);
        assert_eq!(navigator.back_count.get(), 0);

        // The asset finishes loading but is never started.
        controller.complete(Ok(()));
        lifecycle.settle(&mut controller, &mut marquee);
        assert!(sink.taken().is_empty());
        assert!(!controller.is_playing());
        assert!(!marquee.is_running());
        assert_eq!(navigator.back_count.get(), 1);
    }

    #[test]
    fn back_during_remote_autoplay_stops_once_it_is_playing() {
        let sink = RecordingSink::default();
        let track = crate::model::Track::remote("https://cdn.example.com/a.mp3".into(), "A".into(), None, None);
        let mut controller = PlaybackController::new(track, sink.clone());
        let mut marquee = MarqueeAnimator::new(Duration::from_secs(10));
        let navigator = RecordingNavigator::default();
        let mut lifecycle = ScreenLifecycle::new(navigator.clone());

        controller.toggle_play_pause();
        sink.taken();
        lifecycle.request_back(&mut controller, &mut marquee);

        controller.complete(Ok(()));
        lifecycle.settle(&mut controller, &mut marquee);
        assert_eq!(sink.taken(), vec![AudioRequest::Stop]);
        assert_eq!(navigator.back_count.get(), 0);

        controller.complete(Ok(()));
        lifecycle.settle(&mut controller, &mut marquee);
        assert_eq!(navigator.back_count.get(), 1);
    }

    #[test]
    fn back_navigates_when_the_worker_is_lost_mid_request() {
        let (mut controller, sink) = playing_controller();
        let mut marquee = MarqueeAnimator::new(Duration::from_secs(10));
        let navigator = RecordingNavigator::default();
        let mut lifecycle = ScreenLifecycle::new(navigator.clone());

        controller.toggle_play_pause();
        lifecycle.request_back(&mut controller, &mut marquee);
        assert_eq!(navigator.back_count.get(), 0);

        controller.disconnect();
        lifecycle.settle(&mut controller, &mut marquee);

        assert_eq!(sink.taken(), vec![AudioRequest::Pause]);
        assert_eq!(navigator.back_count.get(), 1);
    }

    #[test]
    fn failed_stop_still_navigates_once() {
        let (mut controller, _sink) = playing_controller();
        let mut marquee = MarqueeAnimator::new(Duration::from_secs(10));
        let navigator = RecordingNavigator::default();
        let mut lifecycle = ScreenLifecycle::new(navigator.clone());

        lifecycle.request_back(&mut controller, &mut marquee);
        controller.complete(Err(AudioError::Command("released".into())));
        lifecycle.settle(&mut controller, &mut marquee);
        lifecycle.request_back(&mut controller, &mut marquee);
        lifecycle.settle(&mut controller, &mut marquee);

        assert_eq!(navigator.back_count.get(), 1);
    }
}
