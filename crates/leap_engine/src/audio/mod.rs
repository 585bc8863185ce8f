//! Audio service contract
//!
//! Playback itself belongs to the platform. Gameplay code receives an
//! [`AudioService`] handle at construction instead of reaching for a global
//! player, which keeps the simulation testable without a sound device.

/// One-shot sound effects triggered by gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// The player hopped to another tile
    Hop,
    /// A coin was collected
    Coin,
    /// The level collectible was collected
    Collectible,
    /// The player died
    Death,
    /// The player reached the terminal row
    LevelComplete,
}

/// Plays sound effects and music
pub trait AudioService {
    /// Fire a one-shot effect
    fn play(&mut self, effect: SoundEffect);

    /// Start a music track, replacing any current one
    fn play_music(&mut self, track: &str, looped: bool);

    /// Stop the current music track
    fn stop_music(&mut self);
}

/// Audio service that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioService for NullAudio {
    fn play(&mut self, effect: SoundEffect) {
        log::trace!("(muted) effect {:?}", effect);
    }

    fn play_music(&mut self, track: &str, looped: bool) {
        log::trace!("(muted) music {} looped={}", track, looped);
    }

    fn stop_music(&mut self) {}
}
