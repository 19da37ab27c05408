//! The boundary between the engine and the BLE stack.
//!
//! Every `Transport` method only *starts* an operation. Its outcome comes back
//! later as a [`TransportEvent`] handed to [`crate::MiBand::handle_event`], on
//! whatever context the stack uses for callbacks. Events must be delivered one
//! at a time and never from inside a `Transport` method.

use crate::error::{Result, TransportFailure};
use crate::profile::CharacteristicId;

pub trait Transport: Send {
    /// Open a link to the device with the given address.
    fn connect(&mut self, address: &str) -> Result<()>;

    fn discover_services(&mut self) -> Result<()>;

    fn write_characteristic(&mut self, id: CharacteristicId, value: &[u8]) -> Result<()>;

    fn read_characteristic(&mut self, id: CharacteristicId) -> Result<()>;

    fn read_rssi(&mut self) -> Result<()>;

    /// Turn notification delivery for a characteristic on or off.
    fn set_notification_enabled(&mut self, id: CharacteristicId, enabled: bool) -> Result<()>;

    /// Ask the device to drop the link. Completes with [`TransportEvent::LinkDown`].
    fn disconnect(&mut self) -> Result<()>;

    /// Release the link handle after the link went down.
    fn close(&mut self);
}

/// Something the transport observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    LinkUp,
    LinkDown,
    ServicesDiscovered(std::result::Result<(), TransportFailure>),
    /// Carries the value read
    CharacteristicRead {
        id: CharacteristicId,
        result: std::result::Result<Vec<u8>, TransportFailure>,
    },
    /// Carries the value of the characteristic after the write
    CharacteristicWrite {
        id: CharacteristicId,
        result: std::result::Result<Vec<u8>, TransportFailure>,
    },
    RssiRead(std::result::Result<i16, TransportFailure>),
    /// Unsolicited push from the device
    CharacteristicChanged { id: CharacteristicId, value: Vec<u8> },
}
