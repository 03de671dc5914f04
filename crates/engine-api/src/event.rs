// Engine lifecycle events and the generation-tagged queue they travel through

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tapvoice_core::{Generation, PlaybackError};

/// Engine error classification, matching the numeric media error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorCode {
    /// Fetching was aborted (1)
    Aborted,
    /// A network error stopped fetching (2)
    Network,
    /// The source could not be decoded (3)
    Decode,
    /// The source format or URI is not supported (4)
    SourceNotSupported,
    /// Anything else
    Unknown,
}

impl EngineErrorCode {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => EngineErrorCode::Aborted,
            2 => EngineErrorCode::Network,
            3 => EngineErrorCode::Decode,
            4 => EngineErrorCode::SourceNotSupported,
            _ => EngineErrorCode::Unknown,
        }
    }

    fn description(self) -> &'static str {
        match self {
            EngineErrorCode::Aborted => "the audio request was aborted",
            EngineErrorCode::Network => "a network error interrupted loading the audio",
            EngineErrorCode::Decode => "the audio could not be decoded",
            EngineErrorCode::SourceNotSupported => "the audio source is not supported",
            EngineErrorCode::Unknown => "an unknown playback error occurred",
        }
    }

    /// Classify into a playback error, appending the engine's detail if any
    pub fn into_error(self, detail: Option<&str>) -> PlaybackError {
        let message = match detail {
            Some(detail) if !detail.is_empty() => {
                format!("{} ({})", self.description(), detail)
            }
            _ => self.description().to_string(),
        };

        match self {
            EngineErrorCode::Aborted => PlaybackError::EngineAborted(message),
            EngineErrorCode::Network => PlaybackError::EngineNetwork(message),
            EngineErrorCode::Decode => PlaybackError::EngineDecode(message),
            EngineErrorCode::SourceNotSupported => PlaybackError::EngineSourceUnsupported(message),
            EngineErrorCode::Unknown => PlaybackError::EngineUnknown(message),
        }
    }
}

impl From<u16> for EngineErrorCode {
    fn from(code: u16) -> Self {
        EngineErrorCode::from_code(code)
    }
}

/// Lifecycle events emitted by a media engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Enough data is buffered to start
    CanPlay,
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback reached the end of the source
    Ended,
    /// The position moved; read it back from the engine
    TimeUpdate,
    /// Loading or playback failed
    Error {
        code: EngineErrorCode,
        detail: Option<String>,
    },
}

impl EngineEvent {
    pub fn error(code: EngineErrorCode) -> Self {
        EngineEvent::Error { code, detail: None }
    }
}

/// An event together with the binding it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub generation: Generation,
    pub event: EngineEvent,
}

/// FIFO of engine events awaiting the controller's next pump
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<TaggedEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that stamps every event with `generation`
    pub fn sink(&self, generation: Generation) -> EventSink {
        EventSink {
            generation,
            queue: self.clone(),
        }
    }

    pub fn push(&self, event: TaggedEvent) {
        self.inner.lock().push_back(event);
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&self) -> Vec<TaggedEvent> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }
}

/// Handle an engine uses to report events for one binding
#[derive(Clone)]
pub struct EventSink {
    generation: Generation,
    queue: EventQueue,
}

impl EventSink {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn emit(&self, event: EngineEvent) {
        self.queue.push(TaggedEvent {
            generation: self.generation,
            event,
        });
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapvoice_core::ErrorKind;

    #[test]
    fn test_error_code_classification() {
        assert_eq!(EngineErrorCode::from_code(1), EngineErrorCode::Aborted);
        assert_eq!(EngineErrorCode::from(2), EngineErrorCode::Network);
        assert_eq!(EngineErrorCode::from_code(3), EngineErrorCode::Decode);
        assert_eq!(EngineErrorCode::from_code(4), EngineErrorCode::SourceNotSupported);
        assert_eq!(EngineErrorCode::from_code(0), EngineErrorCode::Unknown);
        assert_eq!(EngineErrorCode::from_code(99), EngineErrorCode::Unknown);
    }

    #[test]
    fn test_into_error_kind_and_detail() {
        let err = EngineErrorCode::Network.into_error(Some("HTTP 503"));
        assert_eq!(err.kind(), ErrorKind::EngineNetwork);
        assert_eq!(
            err.message(),
            "a network error interrupted loading the audio (HTTP 503)"
        );

        let err = EngineErrorCode::SourceNotSupported.into_error(None);
        assert_eq!(err.kind(), ErrorKind::EngineSourceUnsupported);
        assert_eq!(err.message(), "the audio source is not supported");
    }

    #[test]
    fn test_sinks_tag_events_with_their_generation() {
        let queue = EventQueue::new();
        let old = queue.sink(Generation::INITIAL);
        let new = queue.sink(Generation::INITIAL.next());

        old.emit(EngineEvent::CanPlay);
        new.emit(EngineEvent::Play);
        old.emit(EngineEvent::Ended);
        assert_eq!(queue.len(), 3);

        let drained = queue.drain();
        let gens: Vec<u64> = drained.iter().map(|e| e.generation.value()).collect();
        assert_eq!(gens, vec![0, 1, 0]);
        assert_eq!(drained[1].event, EngineEvent::Play);
        assert!(queue.is_empty());
    }
}
