//! Media key signal handling
//!
//! Each `MediaPlayerKeyPressed` signal carries `(application, key)`. The
//! dispatcher validates the payload and resolves the key to an [`Action`]:
//! Stop always stops, Play toggles against the current playback state, and
//! anything else goes through the configured [`KeyMap`].
//!
//! The handler reads only immutable state, so it can run on whatever thread
//! the bus runtime delivers signals on.

use crate::keymap::KeyMap;
use crate::player::{Action, PlaybackState, Player};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Key name the settings daemon sends for the Stop key
pub const KEY_STOP: &str = "Stop";
/// Key name the settings daemon sends for the Play/Pause key
pub const KEY_PLAY: &str = "Play";

/// One field of a signal body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalField {
    Str(String),
    /// Any non-string value, described by its D-Bus signature
    Other(String),
}

/// Decoded body of an inbound key-press signal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalPayload {
    fields: Vec<SignalField>,
}

impl SignalPayload {
    pub fn new(fields: Vec<SignalField>) -> Self {
        Self { fields }
    }

    /// Well-formed `(application, key)` payload
    pub fn key_pressed(application: &str, key: &str) -> Self {
        Self::new(vec![
            SignalField::Str(application.to_string()),
            SignalField::Str(key.to_string()),
        ])
    }

    pub fn fields(&self) -> &[SignalField] {
        &self.fields
    }

    /// Extract the pressed key name
    pub fn key_name(&self) -> Result<&str, SignalError> {
        if self.fields.len() != 2 {
            return Err(SignalError::WrongArity(self.fields.len()));
        }
        match &self.fields[1] {
            SignalField::Str(key) => Ok(key.as_str()),
            SignalField::Other(signature) => Err(SignalError::NonStringKey(signature.clone())),
        }
    }
}

/// Reasons a signal payload is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("expected 2 signal fields, got {0}")]
    WrongArity(usize),
    #[error("key field is not a string (signature '{0}')")]
    NonStringKey(String),
}

/// What happened to a single signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The action was invoked on the player
    Invoked(Action),
    /// Valid key with nothing bound to it
    Ignored,
    /// Payload rejected, nothing invoked
    Malformed(SignalError),
}

/// Resolves key-press signals to player actions
#[derive(Clone)]
pub struct KeyDispatcher {
    keymap: Arc<KeyMap>,
    player: Arc<dyn Player>,
}

impl KeyDispatcher {
    pub fn new(keymap: KeyMap, player: Arc<dyn Player>) -> Self {
        Self {
            keymap: Arc::new(keymap),
            player,
        }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Handle one inbound key-press signal
    pub fn on_key_signal(&self, payload: &SignalPayload) -> KeyOutcome {
        let key = match payload.key_name() {
            Ok(key) => key,
            Err(err) => {
                error!(error = %err, "media key signal invalid, ignoring event");
                return KeyOutcome::Malformed(err);
            }
        };

        debug!(key, "media key pressed");

        let Some(action) = self.resolve(key) else {
            debug!(key, "ignoring media key");
            return KeyOutcome::Ignored;
        };

        action.invoke(self.player.as_ref());
        KeyOutcome::Invoked(action)
    }

    fn resolve(&self, key: &str) -> Option<Action> {
        match key {
            KEY_STOP => Some(Action::Stop),
            KEY_PLAY => match self.player.state() {
                PlaybackState::Stopped => Some(Action::Play),
                _ => Some(Action::Stop),
            },
            _ => self.keymap.lookup(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MEDIA_KEY_MAPPING, MEDIA_KEY_NEXT_STATION, MEDIA_KEY_VOLUME_UP};
    use crate::player::testing::RecordingPlayer;
    use assert2::assert;

    fn dispatcher(config: &Config, player: &Arc<RecordingPlayer>) -> KeyDispatcher {
        KeyDispatcher::new(KeyMap::from_config(config), player.clone())
    }

    #[test]
    fn test_stop_always_stops() {
        let config = Config::default().with_bool(MEDIA_KEY_MAPPING, false);
        for state in [
            PlaybackState::Stopped,
            PlaybackState::Playing,
            PlaybackState::Buffering,
        ] {
            let player = Arc::new(RecordingPlayer::new(state));
            let outcome = dispatcher(&config, &player)
                .on_key_signal(&SignalPayload::key_pressed("app", "Stop"));
            assert!(outcome == KeyOutcome::Invoked(Action::Stop));
            assert!(player.calls() == vec![Action::Stop]);
        }
    }

    #[test]
    fn test_stop_beats_a_mapping_named_stop() {
        let config = Config::default()
            .with_bool(MEDIA_KEY_MAPPING, true)
            .with_string(MEDIA_KEY_NEXT_STATION, "Stop");
        let player = Arc::new(RecordingPlayer::new(PlaybackState::Playing));
        let dispatcher = dispatcher(&config, &player);
        assert!(dispatcher.keymap().lookup("Stop") == Some(Action::NextStation));

        let outcome = dispatcher.on_key_signal(&SignalPayload::key_pressed("app", "Stop"));
        assert!(outcome == KeyOutcome::Invoked(Action::Stop));
        assert!(player.calls() == vec![Action::Stop]);
    }

    #[test]
    fn test_play_when_stopped_plays() {
        let player = Arc::new(RecordingPlayer::new(PlaybackState::Stopped));
        let outcome = dispatcher(&Config::default(), &player)
            .on_key_signal(&SignalPayload::key_pressed("app", "Play"));
        assert!(outcome == KeyOutcome::Invoked(Action::Play));
    }

    #[test]
    fn test_play_when_not_stopped_stops() {
        for state in [
            PlaybackState::Playing,
            PlaybackState::Buffering,
            PlaybackState::Paused,
        ] {
            let player = Arc::new(RecordingPlayer::new(state));
            let outcome = dispatcher(&Config::default(), &player)
                .on_key_signal(&SignalPayload::key_pressed("app", "Play"));
            assert!(outcome == KeyOutcome::Invoked(Action::Stop));
        }
    }

    #[test]
    fn test_play_toggles_play_then_stop() {
        let player = Arc::new(RecordingPlayer::new(PlaybackState::Stopped));
        let dispatcher = dispatcher(&Config::default(), &player);
        let play = SignalPayload::key_pressed("app", "Play");

        dispatcher.on_key_signal(&play);
        player.set_state(PlaybackState::Playing);
        dispatcher.on_key_signal(&play);

        assert!(player.calls() == vec![Action::Play, Action::Stop]);
    }

    #[test]
    fn test_play_and_stop_are_case_sensitive() {
        let config = Config::default().with_bool(MEDIA_KEY_MAPPING, false);
        let player = Arc::new(RecordingPlayer::new(PlaybackState::Playing));
        let outcome =
            dispatcher(&config, &player).on_key_signal(&SignalPayload::key_pressed("app", "stop"));
        assert!(outcome == KeyOutcome::Ignored);
        assert!(player.calls().is_empty());
    }

    #[test]
    fn test_mapped_key_any_case() {
        let config = Config::default().with_string(MEDIA_KEY_VOLUME_UP, "XF86AudioRaiseVolume");
        let player = Arc::new(RecordingPlayer::new(PlaybackState::Playing));
        let outcome = dispatcher(&config, &player)
            .on_key_signal(&SignalPayload::key_pressed("app", "xf86audioraisevolume"));
        assert!(outcome == KeyOutcome::Invoked(Action::VolumeUp));
        assert!(player.calls() == vec![Action::VolumeUp]);
    }

    #[test]
    fn test_mapping_disabled_ignores_exact_match() {
        let config = Config::default().with_bool(MEDIA_KEY_MAPPING, false);
        let player = Arc::new(RecordingPlayer::new(PlaybackState::Playing));
        let outcome =
            dispatcher(&config, &player).on_key_signal(&SignalPayload::key_pressed("app", "Next"));
        assert!(outcome == KeyOutcome::Ignored);
        assert!(player.calls().is_empty());
    }

    #[test]
    fn test_unbound_key_ignored() {
        let player = Arc::new(RecordingPlayer::new(PlaybackState::Playing));
        let outcome = dispatcher(&Config::default(), &player)
            .on_key_signal(&SignalPayload::key_pressed("app", "Eject"));
        assert!(outcome == KeyOutcome::Ignored);
    }

    #[test]
    fn test_malformed_payloads_invoke_nothing() {
        let player = Arc::new(RecordingPlayer::new(PlaybackState::Stopped));
        let dispatcher = dispatcher(&Config::default(), &player);

        let empty = SignalPayload::default();
        assert!(
            dispatcher.on_key_signal(&empty) == KeyOutcome::Malformed(SignalError::WrongArity(0))
        );

        let one = SignalPayload::new(vec![SignalField::Str("Play".to_string())]);
        assert!(
            dispatcher.on_key_signal(&one) == KeyOutcome::Malformed(SignalError::WrongArity(1))
        );

        let three = SignalPayload::new(vec![
            SignalField::Str("app".to_string()),
            SignalField::Str("Play".to_string()),
            SignalField::Str("extra".to_string()),
        ]);
        assert!(
            dispatcher.on_key_signal(&three) == KeyOutcome::Malformed(SignalError::WrongArity(3))
        );

        let non_string = SignalPayload::new(vec![
            SignalField::Str("app".to_string()),
            SignalField::Other("u".to_string()),
        ]);
        assert!(
            dispatcher.on_key_signal(&non_string)
                == KeyOutcome::Malformed(SignalError::NonStringKey("u".to_string()))
        );

        assert!(player.calls().is_empty());
    }
}
