// Playback controller for tappable spoken content
// Owns one audio session at a time and drives it through a MediaEngine

pub mod controller;
pub mod handle;

pub use controller::PlaybackController;
pub use handle::PlayHandle;

// Re-exports so hosts only need this crate
pub use tapvoice_core::{
    ErrorKind, ErrorReport, PlaybackConfiguration, PlaybackError, PlaybackState,
    PlaybackStatus, Result, SessionId,
};
pub use tapvoice_engine_api::{
    EngineErrorCode, EngineEvent, EventSink, MediaEngine, ScriptedEngine, TaggedEvent,
};

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Install the env_logger backend (info level unless RUST_LOG says otherwise)
/// Safe to call more than once.
pub fn init_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();
    });
}
