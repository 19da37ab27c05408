//! A transport that records what the engine asks of it, for tests and demos
//! without hardware. Events are injected by hand through
//! [`crate::MiBand::handle_event`].

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{BandError, Result};
use crate::profile::CharacteristicId;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Connect(String),
    DiscoverServices,
    Write(CharacteristicId, Vec<u8>),
    Read(CharacteristicId),
    ReadRssi,
    SetNotification(CharacteristicId, bool),
    Disconnect,
    Close,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<TransportCall>,
    refuse_operations: bool,
    refuse_notifications: bool,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// Test-side view of a [`MockTransport`] that has been moved into the engine.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> (Self, MockHandle) {
        let transport = Self::default();
        let handle = MockHandle {
            state: transport.state.clone(),
        };
        (transport, handle)
    }

    fn record(&self, call: TransportCall) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let refused = match &call {
            TransportCall::Write(..) | TransportCall::Read(_) | TransportCall::ReadRssi => {
                state.refuse_operations
            }
            TransportCall::SetNotification(_, true) => state.refuse_notifications,
            _ => false,
        };
        state.calls.push(call);
        if refused {
            return Err(BandError::TransportOperationFailed {
                code: -1,
                message: "BluetoothGatt operation failed".to_string(),
            });
        }
        Ok(())
    }
}

impl MockHandle {
    pub fn calls(&self) -> Vec<TransportCall> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .len()
    }

    pub fn last_call(&self) -> Option<TransportCall> {
        self.calls().pop()
    }

    /// Make reads, writes and RSSI requests fail as soon as they are issued.
    pub fn refuse_operations(&self, refuse: bool) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .refuse_operations = refuse;
    }

    /// Make enabling notification delivery fail, as for an undiscovered characteristic.
    pub fn refuse_notifications(&self, refuse: bool) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .refuse_notifications = refuse;
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, address: &str) -> Result<()> {
        self.record(TransportCall::Connect(address.to_string()))
    }

    fn discover_services(&mut self) -> Result<()> {
        self.record(TransportCall::DiscoverServices)
    }

    fn write_characteristic(&mut self, id: CharacteristicId, value: &[u8]) -> Result<()> {
        self.record(TransportCall::Write(id, value.to_vec()))
    }

    fn read_characteristic(&mut self, id: CharacteristicId) -> Result<()> {
        self.record(TransportCall::Read(id))
    }

    fn read_rssi(&mut self) -> Result<()> {
        self.record(TransportCall::ReadRssi)
    }

    fn set_notification_enabled(&mut self, id: CharacteristicId, enabled: bool) -> Result<()> {
        self.record(TransportCall::SetNotification(id, enabled))
    }

    fn disconnect(&mut self) -> Result<()> {
        self.record(TransportCall::Disconnect)
    }

    fn close(&mut self) {
        let _ = self.record(TransportCall::Close);
    }
}
