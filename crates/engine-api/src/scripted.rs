// Deterministic in-memory media engine
// Produces no sound; emits events synchronously when asked to. Useful for
// headless hosts and for driving the controller in tests.

use crate::event::{EngineErrorCode, EngineEvent, EventSink};
use crate::MediaEngine;
use parking_lot::Mutex;
use std::sync::Arc;

/// What the engine answers to a `play()` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayScript {
    /// Emit nothing; the caller emits events by hand
    #[default]
    Manual,
    /// Emit `CanPlay` (first play after a load) and `Play`
    Accept,
    /// Emit an `Error` with the given code
    Reject(EngineErrorCode),
}

/// Journal entry for every request the engine received
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    PlaybackRate(f32),
    Release,
}

struct ScriptState {
    sink: Option<EventSink>,
    source: Option<String>,
    ready: bool,
    paused: bool,
    released: bool,
    current_time: f64,
    duration: Option<f64>,
    volume: f32,
    playback_rate: f32,
    script: PlayScript,
    calls: Vec<EngineCall>,
}

impl ScriptState {
    fn new(script: PlayScript) -> Self {
        Self {
            sink: None,
            source: None,
            ready: false,
            paused: true,
            released: false,
            current_time: 0.0,
            duration: None,
            volume: 1.0,
            playback_rate: 1.0,
            script,
            calls: Vec::new(),
        }
    }
}

/// Cloneable handle; every clone drives the same engine
#[derive(Clone)]
pub struct ScriptedEngine {
    state: Arc<Mutex<ScriptState>>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::with_script(PlayScript::Manual)
    }

    pub fn with_script(script: PlayScript) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState::new(script))),
        }
    }

    pub fn set_script(&self, script: PlayScript) {
        self.state.lock().script = script;
    }

    /// Sink of the current binding, if any
    pub fn sink(&self) -> Option<EventSink> {
        self.state.lock().sink.clone()
    }

    /// Emit `event` on the current binding; false when nothing is bound
    pub fn emit(&self, event: EngineEvent) -> bool {
        match self.sink() {
            Some(sink) => {
                sink.emit(event);
                true
            }
            None => false,
        }
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        self.state.lock().duration = duration;
    }

    /// Move the timeline and emit `TimeUpdate`
    pub fn advance(&self, current_time: f64, duration: f64) -> bool {
        {
            let mut state = self.state.lock();
            state.current_time = current_time;
            state.duration = Some(duration);
        }
        self.emit(EngineEvent::TimeUpdate)
    }

    /// Jump to the end of the source and emit `Ended`
    pub fn finish(&self) -> bool {
        {
            let mut state = self.state.lock();
            if let Some(duration) = state.duration {
                state.current_time = duration;
            }
            state.paused = true;
        }
        self.emit(EngineEvent::Ended)
    }

    pub fn fail(&self, code: EngineErrorCode) -> bool {
        self.emit(EngineEvent::error(code))
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn playback_rate(&self) -> f32 {
        self.state.lock().playback_rate
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }
}

impl MediaEngine for ScriptedEngine {
    fn load(&mut self, uri: &str, events: EventSink) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Load(uri.to_string()));
        if state.released {
            log::warn!("ScriptedEngine: load after release ignored");
            return;
        }
        log::trace!("ScriptedEngine: load {} ({})", uri, events.generation());
        state.sink = Some(events);
        state.source = Some(uri.to_string());
        state.ready = false;
        state.paused = true;
        state.current_time = 0.0;
        state.duration = None;
    }

    fn play(&mut self) {
        let (sink, script, first) = {
            let mut state = self.state.lock();
            state.calls.push(EngineCall::Play);
            if state.released {
                return;
            }
            let Some(sink) = state.sink.clone() else {
                return;
            };
            let first = !state.ready;
            if state.script == PlayScript::Accept {
                state.ready = true;
                state.paused = false;
            }
            (sink, state.script, first)
        };

        match script {
            PlayScript::Manual => {}
            PlayScript::Accept => {
                if first {
                    sink.emit(EngineEvent::CanPlay);
                }
                sink.emit(EngineEvent::Play);
            }
            PlayScript::Reject(code) => sink.emit(EngineEvent::error(code)),
        }
    }

    fn pause(&mut self) {
        let sink = {
            let mut state = self.state.lock();
            state.calls.push(EngineCall::Pause);
            if state.paused || state.released {
                None
            } else {
                state.paused = true;
                state.sink.clone()
            }
        };
        if let Some(sink) = sink {
            sink.emit(EngineEvent::Pause);
        }
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Seek(seconds));
        state.current_time = seconds.max(0.0);
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Volume(volume));
        state.volume = volume;
    }

    fn set_playback_rate(&mut self, rate: f32) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::PlaybackRate(rate));
        state.playback_rate = rate;
    }

    fn release(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Release);
        state.released = true;
        state.sink = None;
        state.source = None;
        state.paused = true;
    }
}
