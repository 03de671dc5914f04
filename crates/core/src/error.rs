// Error handling for the playback controller

use crate::session::SessionId;
use std::fmt;

/// Playback error types
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Malformed input rejected before touching the engine
    InvalidArgument(String),

    /// Operation not allowed in the current state
    InvalidState(String),

    /// The engine aborted fetching or playing the source
    EngineAborted(String),

    /// The engine hit a network failure while loading
    EngineNetwork(String),

    /// The engine could not decode the source
    EngineDecode(String),

    /// The engine does not support the source
    EngineSourceUnsupported(String),

    /// The engine reported an error it could not classify
    EngineUnknown(String),
}

/// Discriminant of a [`PlaybackError`], carried in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidState,
    EngineAborted,
    EngineNetwork,
    EngineDecode,
    EngineSourceUnsupported,
    EngineUnknown,
}

impl PlaybackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PlaybackError::InvalidState(_) => ErrorKind::InvalidState,
            PlaybackError::EngineAborted(_) => ErrorKind::EngineAborted,
            PlaybackError::EngineNetwork(_) => ErrorKind::EngineNetwork,
            PlaybackError::EngineDecode(_) => ErrorKind::EngineDecode,
            PlaybackError::EngineSourceUnsupported(_) => ErrorKind::EngineSourceUnsupported,
            PlaybackError::EngineUnknown(_) => ErrorKind::EngineUnknown,
        }
    }

    /// The message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            PlaybackError::InvalidArgument(msg)
            | PlaybackError::InvalidState(msg)
            | PlaybackError::EngineAborted(msg)
            | PlaybackError::EngineNetwork(msg)
            | PlaybackError::EngineDecode(msg)
            | PlaybackError::EngineSourceUnsupported(msg)
            | PlaybackError::EngineUnknown(msg) => msg,
        }
    }

    /// Whether the error originated in the media engine
    pub fn is_engine_error(&self) -> bool {
        !matches!(
            self,
            PlaybackError::InvalidArgument(_) | PlaybackError::InvalidState(_)
        )
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlaybackError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            PlaybackError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            PlaybackError::EngineAborted(msg) => write!(f, "Playback aborted: {}", msg),
            PlaybackError::EngineNetwork(msg) => write!(f, "Network error: {}", msg),
            PlaybackError::EngineDecode(msg) => write!(f, "Decoding error: {}", msg),
            PlaybackError::EngineSourceUnsupported(msg) => {
                write!(f, "Unsupported source: {}", msg)
            }
            PlaybackError::EngineUnknown(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for PlaybackError {}

/// Result type alias for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Payload handed to the error listener
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub session_id: SessionId,
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorReport {
    pub fn new(session_id: SessionId, error: &PlaybackError) -> Self {
        Self {
            session_id,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
