//! Playback actions
//!
//! Translates media-key actions (Play, Stop, NextStation, etc.) into calls
//! on the host application's playback controller.

use tracing::debug;

/// Coarse playback state reported by the host player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Buffering,
    Paused,
}

/// Playback controller implemented by the host application.
///
/// Methods are called from the media-key dispatch thread and must return
/// quickly; long-running work belongs on the host's own executor.
pub trait Player: Send + Sync {
    fn play(&self);
    fn stop(&self);
    fn next_station(&self);
    fn previous_station(&self);
    fn volume_up(&self);
    fn volume_down(&self);

    /// Current playback state, queried when Play toggles
    fn state(&self) -> PlaybackState;
}

/// Actions a media key can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Play,
    Stop,
    NextStation,
    PreviousStation,
    VolumeUp,
    VolumeDown,
}

impl Action {
    /// Invoke this action on the player
    pub fn invoke(self, player: &dyn Player) {
        debug!(action = ?self, "invoking action");

        match self {
            Action::Play => player.play(),
            Action::Stop => player.stop(),
            Action::NextStation => player.next_station(),
            Action::PreviousStation => player.previous_station(),
            Action::VolumeUp => player.volume_up(),
            Action::VolumeDown => player.volume_down(),
        }
    }
}
