//! Media-key client for the GNOME settings daemon
//!
//! Registers the host application as a media player over D-Bus, forwards
//! media-key presses to a [`Player`], and releases the keys when dropped.
//!
//! ```ignore
//! let config = gsd_mediakeys::config::load("config.toml")?;
//! let keys = MediaKeys::new(player, &config);
//! // ... run the application ...
//! drop(keys); // releases the grab and joins the dispatch thread
//! ```

pub mod bus;
pub mod config;
pub mod dispatch;
pub mod keymap;
pub mod lifecycle;
pub mod player;

pub use config::{Config, ConfigStore};
pub use lifecycle::{BusStatus, MediaKeys};
pub use player::{Action, PlaybackState, Player};
