//! Configuration type definitions
//!
//! Recognized option keys, their kinds and documented defaults.

use serde::Deserialize;
use std::ops::Range;

/// Byte span in the source file
pub type Span = Range<usize>;

/// Enable re-mapping of media key names to station/volume actions
pub const MEDIA_KEY_MAPPING: &str = "media-key-mapping";
pub const MEDIA_KEY_VOLUME_UP: &str = "media-key-volume-up";
pub const MEDIA_KEY_VOLUME_DOWN: &str = "media-key-volume-down";
pub const MEDIA_KEY_NEXT_STATION: &str = "media-key-next-station";
pub const MEDIA_KEY_PREVIOUS_STATION: &str = "media-key-previous-station";
/// Force the legacy settings daemon bus name (absent means auto-detect)
pub const MEDIA_KEY_OLD_DBUS_NAME: &str = "media-key-old-dbus-name";

pub const DEFAULT_MEDIA_KEY_MAPPING: bool = true;
pub const DEFAULT_MEDIA_KEY_VOLUME_UP: &str = "FastForward";
pub const DEFAULT_MEDIA_KEY_VOLUME_DOWN: &str = "Rewind";
pub const DEFAULT_MEDIA_KEY_NEXT_STATION: &str = "Next";
pub const DEFAULT_MEDIA_KEY_PREVIOUS_STATION: &str = "Previous";
pub const DEFAULT_MEDIA_KEY_OLD_DBUS_NAME: bool = false;

/// A scalar configuration value
///
/// Untagged so that TOML booleans and strings deserialize directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    String(String),
}

/// Expected kind of a recognized option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    String,
}

impl OptionKind {
    /// Kind of a recognized option key, `None` for unknown keys
    pub fn of(key: &str) -> Option<Self> {
        match key {
            MEDIA_KEY_MAPPING | MEDIA_KEY_OLD_DBUS_NAME => Some(OptionKind::Bool),
            MEDIA_KEY_VOLUME_UP
            | MEDIA_KEY_VOLUME_DOWN
            | MEDIA_KEY_NEXT_STATION
            | MEDIA_KEY_PREVIOUS_STATION => Some(OptionKind::String),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            OptionKind::Bool => "boolean",
            OptionKind::String => "string",
        }
    }
}
