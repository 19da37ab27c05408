//! Services and characteristics exposed by the band.
//!
//! All identifiers are 16-bit Bluetooth SIG short UUIDs expanded onto the
//! base UUID `0000xxxx-0000-1000-8000-00805f9b34fb`.

use std::fmt;

use uuid::Uuid;

const BLUETOOTH_BASE_UUID: u128 = 0x0000_0000_0000_1000_8000_0080_5f9b_34fb;

/// Expand a 16-bit short UUID onto the Bluetooth base UUID.
pub const fn short_uuid(short: u16) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID | ((short as u128) << 96))
}

/// A characteristic is addressed by its service and its own UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacteristicId {
    pub service: Uuid,
    pub characteristic: Uuid,
}

impl CharacteristicId {
    pub const fn new(service: Uuid, characteristic: Uuid) -> Self {
        Self {
            service,
            characteristic,
        }
    }
}

impl fmt::Display for CharacteristicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.characteristic)
    }
}

/// Main data service
pub const SERVICE_MILI: Uuid = short_uuid(0xfee0);
/// Immediate alert service, used for vibration
pub const SERVICE_VIBRATION: Uuid = short_uuid(0x1802);
pub const SERVICE_HEART_RATE: Uuid = short_uuid(0x180d);

/// Generic device events
pub const NOTIFICATION: CharacteristicId = CharacteristicId::new(SERVICE_MILI, short_uuid(0xff03));
pub const USER_INFO: CharacteristicId = CharacteristicId::new(SERVICE_MILI, short_uuid(0xff04));
/// Accepts the LED, notify-toggle and device control commands
pub const CONTROL_POINT: CharacteristicId =
    CharacteristicId::new(SERVICE_MILI, short_uuid(0xff05));
pub const REALTIME_STEPS: CharacteristicId =
    CharacteristicId::new(SERVICE_MILI, short_uuid(0xff06));
pub const LE_PARAMS: CharacteristicId = CharacteristicId::new(SERVICE_MILI, short_uuid(0xff09));
pub const BATTERY: CharacteristicId = CharacteristicId::new(SERVICE_MILI, short_uuid(0xff0c));
pub const SENSOR_DATA: CharacteristicId = CharacteristicId::new(SERVICE_MILI, short_uuid(0xff0e));
pub const PAIR: CharacteristicId = CharacteristicId::new(SERVICE_MILI, short_uuid(0xff0f));

/// Alert level characteristic
pub const VIBRATION: CharacteristicId =
    CharacteristicId::new(SERVICE_VIBRATION, short_uuid(0x2a06));

/// Heart rate control point, takes the scan command
pub const HEART_RATE_CONTROL: CharacteristicId =
    CharacteristicId::new(SERVICE_HEART_RATE, short_uuid(0x2a39));
/// Heart rate measurement, pushes heart-rate frames
pub const HEART_RATE_MEASUREMENT: CharacteristicId =
    CharacteristicId::new(SERVICE_HEART_RATE, short_uuid(0x2a37));

#[test]
fn test_short_uuid_expansion() {
    assert_eq!(
        SERVICE_MILI,
        Uuid::parse_str("0000fee0-0000-1000-8000-00805f9b34fb").unwrap()
    );
    assert_eq!(
        HEART_RATE_MEASUREMENT.characteristic,
        Uuid::parse_str("00002a37-0000-1000-8000-00805f9b34fb").unwrap()
    );
    assert_eq!(
        PAIR.characteristic,
        Uuid::parse_str("0000ff0f-0000-1000-8000-00805f9b34fb").unwrap()
    );
}
