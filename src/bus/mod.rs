//! Settings daemon bus client
//!
//! Provides:
//! - Resolution of the settings daemon's well-known bus name
//! - The per-process client identity sent with grab/release calls
//! - The `BusConnector` / `BusConnection` seam the dispatch loop drives
//!
//! The session implementation (session.rs) talks to the real session bus via
//! zbus. Tests drive the dispatch loop through the scripted mock in mock.rs.

#[cfg(test)]
pub(crate) mod mock;
#[cfg(unix)]
mod session;

#[cfg(unix)]
pub use session::SessionBusConnector;

use crate::config::{ConfigStore, DEFAULT_MEDIA_KEY_OLD_DBUS_NAME, MEDIA_KEY_OLD_DBUS_NAME};
use crate::dispatch::SignalPayload;
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Object path of the media keys interface on both service names
pub const MEDIA_KEYS_PATH: &str = "/org/gnome/SettingsDaemon/MediaKeys";
/// Interface carrying the grab/release methods and the key signal
pub const MEDIA_KEYS_INTERFACE: &str = "org.gnome.SettingsDaemon.MediaKeys";
/// Environment variable naming the running desktop session
pub const DESKTOP_SESSION_VAR: &str = "XDG_CURRENT_DESKTOP";

/// Priority passed with `GrabMediaPlayerKeys`
pub const GRAB_PRIORITY: u32 = 0;

/// Well-known bus name the settings daemon is reached at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusService {
    /// `org.gnome.SettingsDaemon.MediaKeys`, current GNOME releases
    #[default]
    Modern,
    /// `org.gnome.SettingsDaemon`, older GNOME and Unity-style sessions
    Legacy,
}

impl BusService {
    pub fn name(self) -> &'static str {
        match self {
            BusService::Modern => "org.gnome.SettingsDaemon.MediaKeys",
            BusService::Legacy => "org.gnome.SettingsDaemon",
        }
    }
}

impl std::fmt::Display for BusService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the bus name to connect to.
///
/// An explicit legacy-name preference wins. Otherwise any desktop session
/// that is not GNOME gets the legacy name; an unreadable session identifier
/// keeps the modern name.
pub fn resolve_service(config: &dyn ConfigStore, desktop: Option<&str>) -> BusService {
    if config.exists(MEDIA_KEY_OLD_DBUS_NAME) {
        return if config.get_bool(MEDIA_KEY_OLD_DBUS_NAME, DEFAULT_MEDIA_KEY_OLD_DBUS_NAME) {
            BusService::Legacy
        } else {
            BusService::Modern
        };
    }

    match desktop {
        Some(desktop) if !desktop.to_lowercase().contains("gnome") => BusService::Legacy,
        Some(_) => BusService::Modern,
        None => {
            warn!("could not read {DESKTOP_SESSION_VAR} environment variable");
            BusService::Modern
        }
    }
}

/// Current desktop session identifier, `None` when unset or not valid UTF-8
pub fn desktop_session() -> Option<String> {
    std::env::var(DESKTOP_SESSION_VAR).ok()
}

/// File name of the running executable, falling back to the crate name
pub fn process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// How this process identifies itself to the settings daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// `<application-name>-<pid>`, unique per process
    pub app_name: String,
    pub service: BusService,
}

impl ClientIdentity {
    pub fn new(application: &str, service: BusService) -> Self {
        Self {
            app_name: format!("{application}-{}", std::process::id()),
            service,
        }
    }
}

/// Bus client errors
#[derive(Debug, Error)]
pub enum BusError {
    #[error("could not connect to {service}")]
    Connect {
        service: BusService,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{method} call failed")]
    Call {
        method: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("media keys are not supported on this platform")]
    Unsupported,
}

/// Opens connections to the settings daemon.
///
/// Moved onto the dispatch thread, so it must be `Send`; the connection it
/// returns never leaves that thread.
#[async_trait(?Send)]
pub trait BusConnector: Send {
    /// Connect to `service` and subscribe to its key-press signals
    async fn connect(&self, service: BusService) -> Result<Box<dyn BusConnection>, BusError>;
}

/// A live connection to the settings daemon's media keys interface
#[async_trait(?Send)]
pub trait BusConnection {
    /// Send `GrabMediaPlayerKeys(app_name, priority)` without waiting for a reply
    async fn grab(&self, app_name: &str, priority: u32) -> Result<(), BusError>;

    /// Send `ReleaseMediaPlayerKeys(app_name)` without waiting for a reply
    async fn release(&self, app_name: &str) -> Result<(), BusError>;

    /// Next key-press signal, `None` once the signal stream has ended
    async fn next_signal(&mut self) -> Option<SignalPayload>;

    /// Close the connection; no further calls are made afterwards
    async fn close(&mut self);
}

/// Connector for the current platform's session bus
#[cfg(unix)]
pub fn default_connector() -> Box<dyn BusConnector> {
    Box::new(SessionBusConnector)
}

/// Connector for the current platform's session bus
#[cfg(not(unix))]
pub fn default_connector() -> Box<dyn BusConnector> {
    Box::new(UnsupportedConnector)
}

/// Connector that always fails, leaving media keys disabled
#[cfg(not(unix))]
struct UnsupportedConnector;

#[cfg(not(unix))]
#[async_trait(?Send)]
impl BusConnector for UnsupportedConnector {
    async fn connect(&self, _service: BusService) -> Result<Box<dyn BusConnection>, BusError> {
        Err(BusError::Unsupported)
    }
}
