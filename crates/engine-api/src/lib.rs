// Media engine abstraction layer

pub mod event;
pub mod scripted;

pub use event::{EngineErrorCode, EngineEvent, EventQueue, EventSink, TaggedEvent};
pub use scripted::{EngineCall, PlayScript, ScriptedEngine};

/// Media engine trait
/// The audio-rendering resource the playback controller drives.
///
/// Requests never fail at the call site. Their outcome is reported later
/// through the [`EventSink`] handed over by the most recent `load`.
pub trait MediaEngine: Send {
    /// Bind the engine to `uri`, replacing any previous source
    /// Events for this binding must be emitted through `events`
    fn load(&mut self, uri: &str, events: EventSink);

    /// Request playback; answered with `Play` or `Error`
    fn play(&mut self);

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Move the playback position (seconds)
    fn set_current_time(&mut self, seconds: f64);

    /// Total duration in seconds, `None` until the engine knows it
    fn duration(&self) -> Option<f64>;

    /// Set volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32);

    /// Set playback rate (1.0 = normal speed)
    fn set_playback_rate(&mut self, rate: f32);

    /// Release all resources; the engine stays inert afterwards
    fn release(&mut self);
}
