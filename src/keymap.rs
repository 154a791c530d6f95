//! Configurable media key mapping
//!
//! Maps lower-cased key names reported by the settings daemon to the four
//! re-mappable actions. Play and Stop are handled by the dispatcher before
//! the map is consulted.

use crate::config::{
    ConfigStore, DEFAULT_MEDIA_KEY_MAPPING, DEFAULT_MEDIA_KEY_NEXT_STATION,
    DEFAULT_MEDIA_KEY_PREVIOUS_STATION, DEFAULT_MEDIA_KEY_VOLUME_DOWN,
    DEFAULT_MEDIA_KEY_VOLUME_UP, MEDIA_KEY_MAPPING, MEDIA_KEY_NEXT_STATION,
    MEDIA_KEY_PREVIOUS_STATION, MEDIA_KEY_VOLUME_DOWN, MEDIA_KEY_VOLUME_UP,
};
use crate::player::Action;
use std::collections::HashMap;
use tracing::{info, warn};

/// Immutable key name to action table
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: HashMap<String, Action>,
}

impl KeyMap {
    /// Build the map from configuration.
    ///
    /// When mapping is disabled the map stays empty. Colliding key names
    /// resolve last-write-wins in volume up, volume down, next, previous order.
    pub fn from_config(config: &dyn ConfigStore) -> Self {
        if !config.get_bool(MEDIA_KEY_MAPPING, DEFAULT_MEDIA_KEY_MAPPING) {
            info!("media key mapping disabled");
            return Self::default();
        }

        let volume_up = config.get_string(MEDIA_KEY_VOLUME_UP, DEFAULT_MEDIA_KEY_VOLUME_UP);
        let volume_down = config.get_string(MEDIA_KEY_VOLUME_DOWN, DEFAULT_MEDIA_KEY_VOLUME_DOWN);
        let next = config.get_string(MEDIA_KEY_NEXT_STATION, DEFAULT_MEDIA_KEY_NEXT_STATION);
        let previous =
            config.get_string(MEDIA_KEY_PREVIOUS_STATION, DEFAULT_MEDIA_KEY_PREVIOUS_STATION);

        info!("mapping volume up/down to: {volume_up}, {volume_down}");
        info!("mapping station previous/next to: {previous}, {next}");

        let mut map = Self::default();
        map.bind(&volume_up, Action::VolumeUp);
        map.bind(&volume_down, Action::VolumeDown);
        map.bind(&next, Action::NextStation);
        map.bind(&previous, Action::PreviousStation);
        map
    }

    fn bind(&mut self, key_name: &str, action: Action) {
        if let Some(previous) = self.bindings.insert(key_name.to_lowercase(), action) {
            warn!(
                key = key_name,
                ?previous,
                ?action,
                "media key mapped twice, keeping the later action"
            );
        }
    }

    /// Look up the action bound to `key_name`, ignoring case
    pub fn lookup(&self, key_name: &str) -> Option<Action> {
        self.bindings.get(&key_name.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
