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

//! Audio worker thread and request execution.
//!
//! The worker owns the audio engine of a single playback session. It executes
//! requests strictly one at a time and in order, acknowledging each one, and
//! in between requests forwards engine observations (duration, position, end
//! of track) to the main event loop.
//!
//! # Lifecycle
//!
//! The engine is created lazily by the first [`AudioRequest::Create`]. The
//! worker runs until the request channel is closed, at which point the engine
//! is dropped and the audio resource released. However the worker ends, even
//! by panicking inside the audio library, it reports
//! [`PlayerEvent::WorkerStopped`] on its way out.

use std::{
    io,
    sync::mpsc::{Receiver, Sender, TryRecvError},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};

use crate::{
    events::AppEvent,
    model::TrackSource,
    player::{AudioError, AudioRequest, PlayerEvent, SessionId},
};

/// How long the worker waits for an engine event before checking for new
/// requests again.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Observations reported by an audio engine while it has a resource loaded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineEvent {
    Duration(f64),
    Time(f64),
    EndOfTrack,
}

impl From<EngineEvent> for PlayerEvent {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::Duration(seconds) => PlayerEvent::DurationChanged(seconds),
            EngineEvent::Time(seconds) => PlayerEvent::TimeChanged(seconds),
            EngineEvent::EndOfTrack => PlayerEvent::TrackFinished,
        }
    }
}

/// The audio library operations a session needs.
///
/// Every operation blocks until the library has acknowledged it.
pub(crate) trait AudioEngine {
    /// Loads `source`. Playback starts straight away only when `autoplay` is
    /// set.
    fn load(&mut self, source: &TrackSource, autoplay: bool) -> Result<(), AudioError>;

    fn play(&mut self) -> Result<(), AudioError>;

    fn pause(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;

    /// Waits up to `timeout` for the next engine observation.
    fn wait_event(&mut self, timeout: Duration) -> Option<EngineEvent>;
}

/// Sends [`PlayerEvent::WorkerStopped`] when dropped, which includes
/// unwinding out of a panicking worker.
struct StopNotice {
    session: SessionId,
    event_tx: Sender<AppEvent>,
}

impl Drop for StopNotice {
    fn drop(&mut self) {
        tracing::debug!(session = %self.session, panicking = thread::panicking(), "Audio worker exiting");
        let _ = self
            .event_tx
            .send(AppEvent::Player(self.session, PlayerEvent::WorkerStopped));
    }
}

/// Spawns the audio worker thread for a session.
///
/// The engine is built on the worker thread by `factory`, so the engine type
/// itself does not need to be sendable.
///
/// # Arguments
///
/// * `session` - The session every event sent by this worker is tagged with.
/// * `factory` - Creates the engine when the first resource is created.
/// * `command_rx` - The receiving end of the session's request channel.
/// * `event_tx` - The channel used to acknowledge requests and report engine
///   observations.
///
/// # Errors
///
/// Returns an error if the operating system refuses to create the thread.
pub(crate) fn spawn_player_worker<E, F>(
    session: SessionId,
    factory: F,
    command_rx: Receiver<AudioRequest>,
    event_tx: Sender<AppEvent>,
) -> io::Result<thread::JoinHandle<()>>
where
    E: AudioEngine,
    F: FnMut() -> Result<E, AudioError> + Send + 'static,
{
    thread::Builder::new()
        .name(format!("audio-{}", session))
        .spawn(move || {
            let _notice = StopNotice {
                session,
                event_tx: event_tx.clone(),
            };
            if let Err(e) = audio_player_worker(session, factory, command_rx, event_tx) {
                tracing::error!(session = %session, error = ?e, "Audio worker failure");
            }
        })
}

/// The execution loop of the audio worker.
///
/// While no engine exists there is nothing to observe, so the worker simply
/// blocks on the request channel. Once an engine exists the worker alternates
/// between draining requests and waiting briefly for engine events.
///
/// # Errors
///
/// Returns an error if the main event loop has gone away.
fn audio_player_worker<E, F>(
    session: SessionId,
    mut factory: F,
    command_rx: Receiver<AudioRequest>,
    event_tx: Sender<AppEvent>,
) -> Result<()>
where
    E: AudioEngine,
    F: FnMut() -> Result<E, AudioError>,
{
    let mut engine: Option<E> = None;

    loop {
        let request = if engine.is_some() {
            match command_rx.try_recv() {
                Ok(request) => Some(request),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match command_rx.recv() {
                Ok(request) => Some(request),
                Err(_) => break,
            }
        };

        if let Some(request) = request {
            let result = execute_request(&mut engine, &mut factory, &request);
            tracing::debug!(session = %session, ?request, ?result, "Audio request executed");

            event_tx
                .send(AppEvent::Player(session, PlayerEvent::RequestCompleted(result)))
                .context("Failed to send request acknowledgement")?;
            continue;
        }

        if let Some(event) = engine.as_mut().and_then(|e| e.wait_event(POLL_INTERVAL)) {
            event_tx
                .send(AppEvent::Player(session, event.into()))
                .context("Failed to send player event")?;
        }
    }

    tracing::debug!(session = %session, loaded = engine.is_some(), "Audio worker finished, releasing resource");

    Ok(())
}

/// Executes one request against the session engine, creating the engine
/// first when required.
///
/// A failed creation leaves no engine behind, so a session that failed to
/// load holds no resource.
fn execute_request<E, F>(
    engine: &mut Option<E>,
    factory: &mut F,
    request: &AudioRequest,
) -> Result<(), AudioError>
where
    E: AudioEngine,
    F: FnMut() -> Result<E, AudioError>,
{
    match request {
        AudioRequest::Create { source, autoplay } => {
            let mut created = match engine.take() {
                Some(existing) => existing,
                None => factory()?,
            };
            created.load(source, *autoplay)?;
            *engine = Some(created);
            Ok(())
        }
        AudioRequest::Play => engine.as_mut().ok_or(AudioError::NotLoaded)?.play(),
        AudioRequest::Pause => engine.as_mut().ok_or(AudioError::NotLoaded)?.pause(),
        AudioRequest::Stop => engine.as_mut().ok_or(AudioError::NotLoaded)?.stop(),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{Arc, Mutex, mpsc},
    };

    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    struct FakeEngine {
        log: Log,
        fail_load: bool,
        crash_on_play: bool,
        pending_events: Vec<EngineEvent>,
    }

    impl AudioEngine for FakeEngine {
        fn load(&mut self, source: &TrackSource, autoplay: bool) -> Result<(), AudioError> {
            if self.fail_load {
                return Err(AudioError::Creation("unreachable".into()));
            }
            self.log.lock().unwrap().push(format!("load {} autoplay={}", source.location(), autoplay));
            self.pending_events.push(EngineEvent::Duration(180.0));
            Ok(())
        }

        fn play(&mut self) -> Result<(), AudioError> {
            if self.crash_on_play {
                panic!("audio library crashed");
            }
            self.log.lock().unwrap().push("play".into());
            Ok(())
        }

        fn pause(&mut self) -> Result<(), AudioError> {
            self.log.lock().unwrap().push("pause".into());
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            self.log.lock().unwrap().push("stop".into());
            Ok(())
        }

        fn wait_event(&mut self, timeout: Duration) -> Option<EngineEvent> {
            if self.pending_events.is_empty() {
                thread::sleep(timeout);
                None
            } else {
                Some(self.pending_events.remove(0))
            }
        }
    }

    struct Harness {
        session: SessionId,
        command_tx: Sender<AudioRequest>,
        event_rx: Receiver<AppEvent>,
        worker: thread::JoinHandle<()>,
        log: Log,
        created: Arc<Mutex<usize>>,
    }

    fn spawn(fail_load: bool) -> Harness {
        spawn_engine(fail_load, false)
    }

    fn spawn_engine(fail_load: bool, crash_on_play: bool) -> Harness {
        let session = SessionId::next();
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let log: Log = Arc::default();
        let created = Arc::new(Mutex::new(0));

        let factory_log = log.clone();
        let factory_created = created.clone();
        let worker = spawn_player_worker(
            session,
            move || {
                *factory_created.lock().unwrap() += 1;
                Ok(FakeEngine {
                    log: factory_log.clone(),
                    fail_load,
                    crash_on_play,
                    pending_events: vec![],
                })
            },
            command_rx,
            event_tx,
        )
        .unwrap();

        Harness {
            session,
            command_tx,
            event_rx,
            worker,
            log,
            created,
        }
    }

    // Waits for the next acknowledgement, skipping engine observations.
    fn next_ack(h: &Harness) -> Result<(), AudioError> {
        loop {
            match h.event_rx.recv_timeout(Duration::from_secs(5)).expect("no event from worker") {
                AppEvent::Player(session, PlayerEvent::RequestCompleted(result)) => {
                    assert_eq!(session, h.session);
                    return result;
                }
                AppEvent::Player(_, _) => continue,
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    fn asset() -> AudioRequest {
        AudioRequest::Create {
            source: TrackSource::Asset(PathBuf::from("assets/praise.mp3")),
            autoplay: false,
        }
    }

    #[test]
    fn requests_are_acknowledged_in_order() {
        let h = spawn(false);

        h.command_tx.send(asset()).unwrap();
        h.command_tx.send(AudioRequest::Play).unwrap();
        h.command_tx.send(AudioRequest::Pause).unwrap();

        assert_eq!(next_ack(&h), Ok(()));
        assert_eq!(next_ack(&h), Ok(()));
        assert_eq!(next_ack(&h), Ok(()));

        assert_eq!(
            *h.log.lock().unwrap(),
            vec!["load assets/praise.mp3 autoplay=false", "play", "pause"]
        );
    }

    #[test]
    fn engine_is_created_once_and_only_on_demand() {
        let h = spawn(false);

        h.command_tx.send(AudioRequest::Play).unwrap();
        assert_eq!(next_ack(&h), Err(AudioError::NotLoaded));
        assert_eq!(*h.created.lock().unwrap(), 0);

        h.command_tx.send(asset()).unwrap();
        assert_eq!(next_ack(&h), Ok(()));
        h.command_tx.send(AudioRequest::Stop).unwrap();
        assert_eq!(next_ack(&h), Ok(()));

        assert_eq!(*h.created.lock().unwrap(), 1);
    }

    #[test]
    fn failed_creation_leaves_no_resource() {
        let h = spawn(true);

        h.command_tx.send(asset()).unwrap();
        assert_eq!(next_ack(&h), Err(AudioError::Creation("unreachable".into())));

        h.command_tx.send(AudioRequest::Play).unwrap();
        assert_eq!(next_ack(&h), Err(AudioError::NotLoaded));
    }

    #[test]
    fn engine_events_are_forwarded_with_the_session() {
        let h = spawn(false);

        h.command_tx.send(asset()).unwrap();
        assert_eq!(next_ack(&h), Ok(()));

        match h.event_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Player(session, PlayerEvent::DurationChanged(seconds)) => {
                assert_eq!(session, h.session);
                assert_eq!(seconds, 180.0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn closing_the_request_channel_ends_the_worker() {
        let h = spawn(false);

        h.command_tx.send(asset()).unwrap();
        assert_eq!(next_ack(&h), Ok(()));

        drop(h.command_tx);
        h.worker.join().unwrap();
    }

    #[test]
    fn a_crashed_worker_reports_that_it_stopped() {
        let h = spawn_engine(false, true);

        h.command_tx.send(asset()).unwrap();
        assert_eq!(next_ack(&h), Ok(()));
        h.command_tx.send(AudioRequest::Play).unwrap();

        loop {
            match h.event_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                AppEvent::Player(session, PlayerEvent::WorkerStopped) => {
                    assert_eq!(session, h.session);
                    break;
                }
                AppEvent::Player(_, PlayerEvent::RequestCompleted(result)) => {
                    panic!("request acknowledged by a crashed worker: {:?}", result)
                }
                _ => continue,
            }
        }
        assert!(h.worker.join().is_err());
        assert!(h.command_tx.send(AudioRequest::Stop).is_err());
    }
}
