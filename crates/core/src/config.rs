// Cross-session playback configuration and argument validation

use crate::error::{PlaybackError, Result};
use std::ops::RangeInclusive;

/// Voice used until the caller picks another one
pub const DEFAULT_VOICE: &str = "female";

pub const DEFAULT_VOLUME: f32 = 1.0;
pub const DEFAULT_PLAYBACK_RATE: f32 = 1.0;

pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const PLAYBACK_RATE_RANGE: RangeInclusive<f32> = 0.5..=2.0;

/// Settings that outlive any single session
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfiguration {
    voice_id: String,
    volume: f32,
    playback_rate: f32,
}

impl Default for PlaybackConfiguration {
    fn default() -> Self {
        Self {
            voice_id: DEFAULT_VOICE.to_string(),
            volume: DEFAULT_VOLUME,
            playback_rate: DEFAULT_PLAYBACK_RATE,
        }
    }
}

impl PlaybackConfiguration {
    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    pub fn set_voice<'a>(&mut self, voice_id: impl Into<Option<&'a str>>) -> Result<()> {
        self.voice_id = validate_voice(voice_id.into())?.to_string();
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = validate_volume(volume)?;
        Ok(())
    }

    pub fn set_playback_rate(&mut self, rate: f32) -> Result<()> {
        self.playback_rate = validate_playback_rate(rate)?;
        Ok(())
    }
}

pub fn validate_uri(uri: Option<&str>) -> Result<&str> {
    match uri {
        Some(uri) if !uri.is_empty() => Ok(uri),
        _ => Err(PlaybackError::InvalidArgument(
            "Audio source URI must be a non-empty string".to_string(),
        )),
    }
}

pub fn validate_voice(voice_id: Option<&str>) -> Result<&str> {
    match voice_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(PlaybackError::InvalidArgument(
            "Voice id must be a non-empty string".to_string(),
        )),
    }
}

// NaN fails `contains`, so non-numeric input is rejected with the range check
pub fn validate_volume(volume: f32) -> Result<f32> {
    if VOLUME_RANGE.contains(&volume) {
        Ok(volume)
    } else {
        Err(PlaybackError::InvalidArgument(format!(
            "Volume must be a number between 0 and 1 (got {})",
            volume
        )))
    }
}

pub fn validate_playback_rate(rate: f32) -> Result<f32> {
    if PLAYBACK_RATE_RANGE.contains(&rate) {
        Ok(rate)
    } else {
        Err(PlaybackError::InvalidArgument(format!(
            "Playback rate must be a number between 0.5 and 2 (got {})",
            rate
        )))
    }
}

pub fn validate_seek_time(seconds: f64) -> Result<f64> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(PlaybackError::InvalidArgument(format!(
            "Seek time must be a non-negative number (got {})",
            seconds
        )))
    }
}
