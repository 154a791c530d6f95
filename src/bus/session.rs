//! Session bus implementation
//!
//! Talks to the settings daemon over the user's session bus via zbus. Grab
//! and release go out with no reply expected and without auto-starting the
//! daemon; whether the grab took effect only shows in later signal delivery.

use super::{BusConnection, BusConnector, BusError, BusService};
use crate::dispatch::{SignalField, SignalPayload};
use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, info};
use zbus::proxy::{CacheProperties, SignalStream};
use zbus::zvariant::{Structure, Value};
use zbus::{Connection, Message, proxy};

#[proxy(
    interface = "org.gnome.SettingsDaemon.MediaKeys",
    default_path = "/org/gnome/SettingsDaemon/MediaKeys",
    gen_blocking = false
)]
trait SettingsDaemonMediaKeys {
    #[zbus(no_reply, no_autostart)]
    fn grab_media_player_keys(&self, application: &str, time: u32) -> zbus::Result<()>;

    #[zbus(no_reply, no_autostart)]
    fn release_media_player_keys(&self, application: &str) -> zbus::Result<()>;
}

/// Connects to the settings daemon on the session bus
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionBusConnector;

#[async_trait(?Send)]
impl BusConnector for SessionBusConnector {
    async fn connect(&self, service: BusService) -> Result<Box<dyn BusConnection>, BusError> {
        let connect_err = |e: zbus::Error| BusError::Connect {
            service,
            source: Box::new(e),
        };

        let connection = Connection::session().await.map_err(connect_err)?;

        let proxy = SettingsDaemonMediaKeysProxy::builder(&connection)
            .destination(service.name())
            .map_err(connect_err)?
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(connect_err)?;

        // Subscribe before grabbing so no key press is missed
        let signals = proxy
            .inner()
            .receive_all_signals()
            .await
            .map_err(connect_err)?;

        info!(%service, "connected to settings daemon");

        Ok(Box::new(SessionBusConnection {
            connection,
            proxy,
            signals,
        }))
    }
}

/// Live session bus connection owned by the dispatch thread
struct SessionBusConnection {
    connection: Connection,
    proxy: SettingsDaemonMediaKeysProxy<'static>,
    signals: SignalStream<'static>,
}

#[async_trait(?Send)]
impl BusConnection for SessionBusConnection {
    async fn grab(&self, app_name: &str, priority: u32) -> Result<(), BusError> {
        self.proxy
            .grab_media_player_keys(app_name, priority)
            .await
            .map_err(|e| BusError::Call {
                method: "GrabMediaPlayerKeys",
                source: Box::new(e),
            })
    }

    async fn release(&self, app_name: &str) -> Result<(), BusError> {
        self.proxy
            .release_media_player_keys(app_name)
            .await
            .map_err(|e| BusError::Call {
                method: "ReleaseMediaPlayerKeys",
                source: Box::new(e),
            })
    }

    async fn next_signal(&mut self) -> Option<SignalPayload> {
        let message = self.signals.next().await?;
        Some(payload_from_message(&message))
    }

    async fn close(&mut self) {
        if let Err(e) = self.connection.clone().close().await {
            debug!(error = %e, "session bus close failed");
        }
    }
}

/// Decode a signal body into its top-level fields.
///
/// Bodies that cannot be decoded become an empty payload, which the
/// dispatcher rejects as malformed.
fn payload_from_message(message: &Message) -> SignalPayload {
    let body = message.body();
    match body.deserialize::<Structure<'_>>() {
        Ok(structure) => {
            SignalPayload::new(structure.fields().iter().map(field_from_value).collect())
        }
        Err(e) => {
            debug!(error = %e, "could not decode signal body");
            SignalPayload::default()
        }
    }
}

fn field_from_value(value: &Value<'_>) -> SignalField {
    match value {
        Value::Str(s) => SignalField::Str(s.as_str().to_string()),
        other => SignalField::Other(other.value_signature().to_string()),
    }
}
