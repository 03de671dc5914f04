// Playback controller state machine
//
// Single-threaded and cooperative: operations never block, engine events are
// queued by the engine and applied on the next `pump_events()`. Each engine
// binding carries a generation; events from a superseded binding are dropped.

use crate::handle::{PlayHandle, Resolver};
use tapvoice_core::config::{validate_seek_time, validate_uri};
use tapvoice_core::{
    ErrorReport, Generation, ListenerRegistry, PlaybackConfiguration, PlaybackError,
    PlaybackState, PlaybackStatus, Result, Session, SessionId, StateMachine,
};
use tapvoice_engine_api::{EngineEvent, EventQueue, MediaEngine, TaggedEvent};

/// Owns the single live session and the engine it plays through
pub struct PlaybackController {
    engine: Option<Box<dyn MediaEngine>>,
    events: EventQueue,
    config: PlaybackConfiguration,
    machine: StateMachine,
    generation: Generation,
    session: Option<Session>,
    current_audio_id: Option<SessionId>,
    progress: u8,
    last_error: Option<PlaybackError>,
    pending: Vec<Resolver>,
    // Set when pause() cancels a resume the engine has not answered yet
    resume_cancelled: bool,
    listeners: ListenerRegistry,
}

impl PlaybackController {
    pub fn new(engine: impl MediaEngine + 'static) -> Self {
        Self::with_configuration(engine, PlaybackConfiguration::default())
    }

    pub fn with_configuration(
        engine: impl MediaEngine + 'static,
        config: PlaybackConfiguration,
    ) -> Self {
        let mut engine: Box<dyn MediaEngine> = Box::new(engine);
        engine.set_volume(config.volume());
        engine.set_playback_rate(config.playback_rate());

        log::info!(
            "Playback controller ready (voice={}, volume={}, rate={})",
            config.voice_id(),
            config.volume(),
            config.playback_rate()
        );

        Self {
            engine: Some(engine),
            events: EventQueue::new(),
            config,
            machine: StateMachine::new(),
            generation: Generation::INITIAL,
            session: None,
            current_audio_id: None,
            progress: 0,
            last_error: None,
            pending: Vec::new(),
            resume_cancelled: false,
            listeners: ListenerRegistry::new(),
        }
    }

    // ---- playback operations ----

    /// Start playing `uri`, superseding any live session
    ///
    /// Argument errors fail immediately. Engine acceptance or rejection
    /// arrives through the returned handle; a rejection is also reported to
    /// the error listener.
    pub fn play<'a>(&mut self, uri: impl Into<Option<&'a str>>) -> Result<PlayHandle> {
        let uri = validate_uri(uri.into())?;
        if self.engine.is_none() {
            return Err(PlaybackError::InvalidState(
                "Playback controller has been destroyed".to_string(),
            ));
        }

        if self.machine.current().is_live() {
            if let Some(previous) = &self.session {
                log::info!("Superseding session {}", previous.id);
            }
            self.halt("superseded by a new play request");
        }

        self.generation = self.generation.next();
        let session = Session::new(uri, self.generation);
        log::info!("Playing {} as {} ({})", uri, session.id, session.generation);

        self.progress = 0;
        self.last_error = None;
        self.set_state(PlaybackState::Loading);

        let (resolver, handle) = PlayHandle::pending();
        self.pending.push(resolver);

        let sink = self.events.sink(self.generation);
        if let Some(engine) = self.engine.as_mut() {
            engine.load(uri, sink);
            // Engines may reset these on load
            engine.set_volume(self.config.volume());
            engine.set_playback_rate(self.config.playback_rate());
            engine.play();
        }

        self.session = Some(session);
        Ok(handle)
    }

    /// Stop playback and reset position and progress. Safe in any state.
    pub fn stop(&mut self) {
        log::info!("Stopping playback");
        self.halt("stopped");
    }

    /// Pause the live session
    ///
    /// Does nothing unless playing, or paused with a resume still waiting on
    /// the engine. In the latter case the resume fails with `EngineAborted`
    /// and the engine's late `Play` is not applied.
    pub fn pause(&mut self) {
        let state = self.machine.current();
        if state == PlaybackState::Paused && !self.pending.is_empty() {
            log::info!("Pause cancels pending resume");
            if let Some(engine) = self.engine.as_mut() {
                engine.pause();
            }
            self.abort_pending("paused before the engine resumed");
            self.resume_cancelled = true;
            return;
        }
        if state != PlaybackState::Playing {
            log::debug!("pause ignored in {:?}", state);
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.pause();
        }
        self.set_state(PlaybackState::Paused);
    }

    /// Continue a paused session
    ///
    /// Without a bound source this resolves immediately with `Ok`. While the
    /// source is still loading, the handle follows the pending load.
    pub fn resume(&mut self) -> PlayHandle {
        match self.machine.current() {
            PlaybackState::Paused => {
                let (resolver, handle) = PlayHandle::pending();
                self.pending.push(resolver);
                self.resume_cancelled = false;
                if let Some(engine) = self.engine.as_mut() {
                    engine.play();
                }
                handle
            }
            PlaybackState::Loading => {
                let (resolver, handle) = PlayHandle::pending();
                self.pending.push(resolver);
                handle
            }
            PlaybackState::Errored => {
                let err = self.last_error.clone().unwrap_or_else(|| {
                    PlaybackError::EngineUnknown("previous playback failed".to_string())
                });
                PlayHandle::resolved(Err(err))
            }
            state => {
                log::debug!("resume ignored in {:?}", state);
                PlayHandle::resolved(Ok(()))
            }
        }
    }

    /// Move to `seconds`, clamped to the known duration
    pub fn seek_to(&mut self, seconds: f64) -> Result<()> {
        let seconds = validate_seek_time(seconds)?;
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        let target = match engine.duration() {
            Some(duration) if duration.is_finite() && seconds > duration => {
                log::debug!("Seek to {}s clamped to duration {}s", seconds, duration);
                duration
            }
            _ => seconds,
        };
        engine.set_current_time(target);
        Ok(())
    }

    // ---- configuration ----

    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.config.set_volume(volume)?;
        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(volume);
        }
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.config.volume()
    }

    pub fn set_playback_rate(&mut self, rate: f32) -> Result<()> {
        self.config.set_playback_rate(rate)?;
        if let Some(engine) = self.engine.as_mut() {
            engine.set_playback_rate(rate);
        }
        Ok(())
    }

    pub fn playback_rate(&self) -> f32 {
        self.config.playback_rate()
    }

    /// Record the voice label; picking matching sources is up to the caller
    pub fn set_voice<'a>(&mut self, voice_id: impl Into<Option<&'a str>>) -> Result<()> {
        self.config.set_voice(voice_id)?;
        log::info!("Voice set to {}", self.config.voice_id());
        Ok(())
    }

    pub fn voice(&self) -> &str {
        self.config.voice_id()
    }

    pub fn configuration(&self) -> &PlaybackConfiguration {
        &self.config
    }

    // ---- queries ----

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            is_playing: self.is_playing(),
            current_audio_id: self.current_audio_id.clone(),
            progress: self.progress,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.current()
    }

    pub fn is_playing(&self) -> bool {
        self.machine.current() == PlaybackState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.machine.current() == PlaybackState::Paused
    }

    pub fn current_time(&self) -> f64 {
        self.engine.as_ref().map_or(0.0, |e| e.current_time())
    }

    pub fn duration(&self) -> Option<f64> {
        self.engine.as_ref().and_then(|e| e.duration())
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(|s| &s.id)
    }

    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    // ---- listeners ----

    pub fn on_complete<F>(&mut self, listener: F)
    where
        F: FnMut(&SessionId) + Send + 'static,
    {
        self.listeners.set_complete(Box::new(listener));
    }

    pub fn on_error<F>(&mut self, listener: F)
    where
        F: FnMut(&ErrorReport) + Send + 'static,
    {
        self.listeners.set_error(Box::new(listener));
    }

    pub fn on_progress<F>(&mut self, listener: F)
    where
        F: FnMut(u8, &SessionId) + Send + 'static,
    {
        self.listeners.set_progress(Box::new(listener));
    }

    pub fn remove_all_callbacks(&mut self) {
        self.listeners.clear();
    }

    /// Stop, drop listeners and release the engine. Idempotent.
    pub fn destroy(&mut self) {
        if self.engine.is_none() {
            return;
        }
        log::info!("Destroying playback controller");

        self.halt("controller destroyed");
        self.listeners.clear();
        if let Some(mut engine) = self.engine.take() {
            engine.release();
        }
        self.events.clear();
    }

    // ---- engine events ----

    /// Apply every queued engine event, returning how many were current
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let batch = self.events.drain();
            if batch.is_empty() {
                break;
            }
            for event in batch {
                if self.dispatch(event) {
                    applied += 1;
                }
            }
        }
        applied
    }

    /// Apply one engine event; false if it belonged to a retired binding
    pub fn dispatch(&mut self, tagged: TaggedEvent) -> bool {
        let current = self.engine.is_some()
            && self.session.is_some()
            && tagged.generation == self.generation;
        if !current {
            log::debug!(
                "Dropping stale {:?} from {} (current {})",
                tagged.event,
                tagged.generation,
                self.generation
            );
            return false;
        }

        let state = self.machine.current();
        match tagged.event {
            EngineEvent::CanPlay => {
                log::debug!("Engine ready in {:?}", state);
            }
            EngineEvent::Play => match state {
                PlaybackState::Loading => {
                    self.set_state(PlaybackState::Playing);
                    self.current_audio_id = self.session.as_ref().map(|s| s.id.clone());
                    self.resolve_pending(Ok(()));
                }
                PlaybackState::Paused if self.resume_cancelled => {
                    log::debug!("play event for a cancelled resume ignored");
                    self.resume_cancelled = false;
                    if let Some(engine) = self.engine.as_mut() {
                        engine.pause();
                    }
                }
                PlaybackState::Paused => {
                    self.set_state(PlaybackState::Playing);
                    self.resolve_pending(Ok(()));
                }
                _ => log::debug!("play event ignored in {:?}", state),
            },
            EngineEvent::Pause => {
                if state == PlaybackState::Playing {
                    log::info!("Engine paused playback");
                    self.set_state(PlaybackState::Paused);
                }
            }
            EngineEvent::Ended => {
                // A pause may land in the same turn the source ran out
                if matches!(state, PlaybackState::Playing | PlaybackState::Paused) {
                    self.complete();
                } else {
                    log::debug!("ended event ignored in {:?}", state);
                }
            }
            EngineEvent::TimeUpdate => {
                if state == PlaybackState::Playing {
                    self.update_progress();
                }
            }
            EngineEvent::Error { code, detail } => {
                let in_flight = matches!(state, PlaybackState::Loading | PlaybackState::Playing)
                    || (state == PlaybackState::Paused && !self.pending.is_empty());
                if in_flight {
                    self.fail(code.into_error(detail.as_deref()));
                } else {
                    log::warn!("Engine error {:?} ignored in {:?}", code, state);
                }
            }
        }
        true
    }

    // ---- internals ----

    fn set_state(&mut self, to: PlaybackState) {
        if let Err(err) = self.machine.transition(to) {
            log::warn!("{}", err);
        }
    }

    /// Retire the current binding: pause, rewind, reset progress, settle in Idle
    fn halt(&mut self, reason: &str) {
        self.generation = self.generation.next();
        if let Some(engine) = self.engine.as_mut() {
            engine.pause();
            engine.set_current_time(0.0);
        }
        self.progress = 0;
        self.abort_pending(reason);
        self.resume_cancelled = false;
        self.session = None;
        self.current_audio_id = None;
        self.set_state(PlaybackState::Stopped);
        self.set_state(PlaybackState::Idle);
    }

    fn complete(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        log::info!("Finished {}", session.id);

        if self.known_duration().is_some() {
            self.progress = 100;
            self.listeners.notify_progress(100, &session.id);
        }
        self.listeners.notify_complete(&session.id);
        self.abort_pending("source ended");
        self.resume_cancelled = false;

        // Duplicate `ended` events for this binding must not complete twice
        self.generation = self.generation.next();
        self.current_audio_id = None;
        self.progress = 0;
        self.set_state(PlaybackState::Idle);
    }

    fn fail(&mut self, err: PlaybackError) {
        let session_id = match &self.session {
            Some(session) => session.id.clone(),
            None => return,
        };
        log::warn!("Playback of {} failed: {}", session_id, err);

        self.set_state(PlaybackState::Errored);
        self.resolve_pending(Err(err.clone()));
        self.listeners.notify_error(&ErrorReport::new(session_id, &err));
        self.last_error = Some(err);
    }

    fn update_progress(&mut self) {
        let Some(duration) = self.known_duration() else {
            return;
        };
        let Some(session_id) = self.session.as_ref().map(|s| s.id.clone()) else {
            return;
        };

        let percent = progress_percent(self.current_time(), duration);
        self.progress = percent;
        self.listeners.notify_progress(percent, &session_id);
    }

    fn known_duration(&self) -> Option<f64> {
        self.duration().filter(|d| d.is_finite() && *d > 0.0)
    }

    fn resolve_pending(&mut self, result: Result<()>) {
        for resolver in self.pending.drain(..) {
            let _ = resolver.send(result.clone());
        }
    }

    fn abort_pending(&mut self, reason: &str) {
        if self.pending.is_empty() {
            return;
        }
        let err = PlaybackError::EngineAborted(format!("play request interrupted: {}", reason));
        self.resolve_pending(Err(err));
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// `round(elapsed / duration * 100)`, kept within 0..=100
pub fn progress_percent(elapsed: f64, duration: f64) -> u8 {
    if duration.is_nan() || duration <= 0.0 || !elapsed.is_finite() {
        return 0;
    }
    (elapsed / duration * 100.0).round().clamp(0.0, 100.0) as u8
}
