// Playback state machine and status snapshots

use crate::error::{PlaybackError, Result};
use crate::session::SessionId;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No session bound
    #[default]
    Idle,
    /// Source handed to the engine, waiting for it to accept playback
    Loading,
    /// Audio is currently playing
    Playing,
    /// Audio is paused
    Paused,
    /// Playback was stopped; settles into Idle
    Stopped,
    /// The engine rejected or failed the session
    Errored,
}

impl PlaybackState {
    /// Whether a session currently owns the engine binding
    pub fn is_live(self) -> bool {
        matches!(
            self,
            PlaybackState::Loading | PlaybackState::Playing | PlaybackState::Paused
        )
    }
}

/// Immutable view of the controller handed out to callers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub current_audio_id: Option<SessionId>,
    /// Percentage in 0..=100
    pub progress: u8,
}

/// Current state plus the table of allowed transitions
#[derive(Debug, Default)]
pub struct StateMachine {
    state: PlaybackState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
        }
    }

    pub fn current(&self) -> PlaybackState {
        self.state
    }

    pub fn is_valid_transition(from: PlaybackState, to: PlaybackState) -> bool {
        use PlaybackState::*;

        match (from, to) {
            // play() is accepted from anywhere
            (_, Loading) => true,

            // stop() is accepted from anywhere
            (_, Stopped) => true,
            (Stopped, Idle) => true,

            (Loading, Playing) => true,
            (Loading, Errored) => true,

            (Playing, Paused) => true,
            (Playing, Idle) => true, // natural completion
            (Playing, Errored) => true,

            (Paused, Playing) => true,
            (Paused, Idle) => true, // source ended while paused
            (Paused, Errored) => true, // resume rejected

            _ => false,
        }
    }

    /// Move to `to`, rejecting transitions outside the table
    pub fn transition(&mut self, to: PlaybackState) -> Result<PlaybackState> {
        let from = self.state;
        if !Self::is_valid_transition(from, to) {
            return Err(PlaybackError::InvalidState(format!(
                "Invalid state transition from {:?} to {:?}",
                from, to
            )));
        }
        self.state = to;
        log::debug!("Playback state changed: {:?} -> {:?}", from, to);
        Ok(from)
    }
}
