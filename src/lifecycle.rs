//! Media key client lifecycle
//!
//! `MediaKeys` owns one background thread running the dispatch loop:
//! connect → grab → serve key signals → release → close.
//!
//! Startup and shutdown use two separate single-use signals. A ready channel
//! carries the connection outcome back to the constructor, and a oneshot
//! shutdown token wakes the loop from `Drop`.

use crate::bus::{self, BusConnector, ClientIdentity, GRAB_PRIORITY, resolve_service};
use crate::config::ConfigStore;
use crate::dispatch::KeyDispatcher;
use crate::keymap::KeyMap;
use crate::player::Player;
use std::sync::Arc;
use std::sync::mpsc::{SyncSender, sync_channel};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Name of the background dispatch thread
const THREAD_NAME: &str = "media-keys";

/// Outcome of the startup handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStatus {
    /// Connected and grab sent; key presses are dispatched
    Active,
    /// No connection this run; media keys are ignored until restart
    Disabled,
}

/// Registers the application for media keys for as long as it is alive.
///
/// Construction blocks until the background thread has connected (or given
/// up). Dropping it releases the keys and joins the thread.
pub struct MediaKeys {
    identity: ClientIdentity,
    status: BusStatus,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MediaKeys {
    /// Start media key handling on the session bus
    pub fn new(player: Arc<dyn Player>, config: &dyn ConfigStore) -> Self {
        let desktop = bus::desktop_session();
        Self::with_connector(
            player,
            config,
            bus::default_connector(),
            desktop.as_deref(),
        )
    }

    /// Start media key handling through `connector`.
    ///
    /// `desktop` is the desktop session identifier used to pick the settings
    /// daemon's bus name when the config does not force one.
    pub fn with_connector(
        player: Arc<dyn Player>,
        config: &dyn ConfigStore,
        connector: Box<dyn BusConnector>,
        desktop: Option<&str>,
    ) -> Self {
        let keymap = KeyMap::from_config(config);
        let service = resolve_service(config, desktop);
        let identity = ClientIdentity::new(&bus::process_name(), service);

        info!(
            "starting media keys thread for: {} using {}",
            identity.app_name, service
        );

        let (ready_tx, ready_rx) = sync_channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let dispatch = DispatchLoop {
            connector,
            identity: identity.clone(),
            dispatcher: KeyDispatcher::new(keymap, player),
            ready: ready_tx,
            shutdown: shutdown_rx,
        };

        let thread = match thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || dispatch.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                error!("could not start media keys thread, media keys disabled: {e}");
                return Self {
                    identity,
                    status: BusStatus::Disabled,
                    shutdown: None,
                    thread: None,
                };
            }
        };

        // A dropped sender means the thread died before reporting
        let status = ready_rx.recv().unwrap_or(BusStatus::Disabled);

        Self {
            identity,
            status,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    pub fn status(&self) -> BusStatus {
        self.status
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }
}

impl Drop for MediaKeys {
    fn drop(&mut self) {
        info!("stopping media keys thread");

        if let Some(shutdown) = self.shutdown.take() {
            // The loop may already have exited after a failed connect
            let _ = shutdown.send(());
        }

        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("media keys thread panicked");
        }
    }
}

/// State moved onto the background thread
struct DispatchLoop {
    connector: Box<dyn BusConnector>,
    identity: ClientIdentity,
    dispatcher: KeyDispatcher,
    ready: SyncSender<BusStatus>,
    shutdown: oneshot::Receiver<()>,
}

impl DispatchLoop {
    fn run(self) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!("could not create media keys runtime, media keys disabled: {e}");
                let _ = self.ready.send(BusStatus::Disabled);
                return;
            }
        };

        runtime.block_on(self.drive());
    }

    async fn drive(self) {
        let DispatchLoop {
            connector,
            identity,
            dispatcher,
            ready,
            mut shutdown,
        } = self;

        let mut connection = match connector.connect(identity.service).await {
            Ok(connection) => connection,
            Err(e) => {
                error!(error = ?e, "could not connect to {}, media keys disabled", identity.service);
                let _ = ready.send(BusStatus::Disabled);
                return;
            }
        };

        if let Err(e) = connection.grab(&identity.app_name, GRAB_PRIORITY).await {
            warn!(error = ?e, "media key grab failed");
        }

        let _ = ready.send(BusStatus::Active);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                signal = connection.next_signal() => match signal {
                    Some(payload) => {
                        dispatcher.on_key_signal(&payload);
                    }
                    None => {
                        warn!("media key signal stream ended, waiting for shutdown");
                        let _ = (&mut shutdown).await;
                        break;
                    }
                },
            }
        }

        if let Err(e) = connection.release(&identity.app_name).await {
            warn!(error = ?e, "media key release failed");
        }
        connection.close().await;

        info!("media keys released");
    }
}
