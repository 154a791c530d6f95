//! Mock bus implementation for testing
//!
//! Records every bus call instead of talking to a settings daemon, and lets
//! tests push key-press signals into the dispatch loop.

use super::{BusConnection, BusConnector, BusError, BusService};
use crate::dispatch::SignalPayload;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Recorded bus call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusCall {
    Connect(BusService),
    Grab { app_name: String, priority: u32 },
    Release { app_name: String },
    Close,
}

/// How the mock answers `connect`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectMode {
    Accept,
    Fail,
    Panic,
}

/// Mock connector shared between a test and the dispatch thread
#[derive(Clone)]
pub struct MockBus {
    calls: Arc<Mutex<Vec<BusCall>>>,
    mode: ConnectMode,
    signal_tx: Arc<Mutex<Option<mpsc::UnboundedSender<SignalPayload>>>>,
    signal_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<SignalPayload>>>>,
}

impl MockBus {
    /// Create a mock bus that accepts connections
    pub fn new() -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            mode: ConnectMode::Accept,
            signal_tx: Arc::new(Mutex::new(Some(signal_tx))),
            signal_rx: Arc::new(Mutex::new(Some(signal_rx))),
        }
    }

    /// Create a mock bus whose daemon is unreachable
    pub fn unreachable() -> Self {
        Self {
            mode: ConnectMode::Fail,
            ..Self::new()
        }
    }

    /// Create a mock bus whose connect panics, killing the dispatch thread
    /// before it reports readiness
    pub fn panicking() -> Self {
        Self {
            mode: ConnectMode::Panic,
            ..Self::new()
        }
    }

    /// Deliver a signal to the connected client
    pub fn emit(&self, payload: SignalPayload) {
        if let Some(tx) = self.signal_tx.lock().unwrap().as_ref() {
            let _ = tx.send(payload);
        }
    }

    /// End the signal stream, as if the daemon went away
    pub fn end_signals(&self) {
        self.signal_tx.lock().unwrap().take();
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BusCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BusCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait(?Send)]
impl BusConnector for MockBus {
    async fn connect(&self, service: BusService) -> Result<Box<dyn BusConnection>, BusError> {
        self.record(BusCall::Connect(service));

        match self.mode {
            ConnectMode::Accept => {}
            ConnectMode::Fail => {
                return Err(BusError::Connect {
                    service,
                    source: "service unknown".into(),
                });
            }
            ConnectMode::Panic => panic!("mock bus connect panicked"),
        }

        let signals = self
            .signal_rx
            .lock()
            .unwrap()
            .take()
            .expect("mock bus connected twice");

        Ok(Box::new(MockConnection {
            bus: self.clone(),
            signals,
        }))
    }
}

struct MockConnection {
    bus: MockBus,
    signals: mpsc::UnboundedReceiver<SignalPayload>,
}

#[async_trait(?Send)]
impl BusConnection for MockConnection {
    async fn grab(&self, app_name: &str, priority: u32) -> Result<(), BusError> {
        self.bus.record(BusCall::Grab {
            app_name: app_name.to_string(),
            priority,
        });
        Ok(())
    }

    async fn release(&self, app_name: &str) -> Result<(), BusError> {
        self.bus.record(BusCall::Release {
            app_name: app_name.to_string(),
        });
        Ok(())
    }

    async fn next_signal(&mut self) -> Option<SignalPayload> {
        self.signals.recv().await
    }

    async fn close(&mut self) {
        self.bus.record(BusCall::Close);
    }
}
