// Core types for the Tapvoice playback controller

pub mod callback;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use callback::{
    CompleteListener, ErrorListener, ListenerRegistry, ListenerSlot, ProgressListener,
};
pub use config::PlaybackConfiguration;
pub use error::{ErrorKind, ErrorReport, PlaybackError, Result};
pub use session::{Generation, Session, SessionId};
pub use state::{PlaybackState, PlaybackStatus, StateMachine};
