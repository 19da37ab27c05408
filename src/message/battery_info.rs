/// Length in bytes of a battery-info record
pub const BATTERY_INFO_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Unknown,
    Low,
    Full,
    Charging,
    NotCharging,
}

impl BatteryStatus {
    pub fn from_byte(b: u8) -> Self {
        match b {
            1 => BatteryStatus::Low,
            2 => BatteryStatus::Charging,
            3 => BatteryStatus::Full,
            4 => BatteryStatus::NotCharging,
            _ => BatteryStatus::Unknown,
        }
    }
}

/// When the battery was last charged, as reported by the band. Not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// The reported state of the band's battery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryInfo {
    /// Charge level in %
    pub level: u8,
    /// Lifetime number of charge cycles
    pub cycles: u16,
    pub status: BatteryStatus,
    pub last_charged: ChargeTimestamp,
}

impl BatteryInfo {
    /// Decode a battery-info record.
    ///
    /// Start Byte | End Byte | Meaning
    /// 0          | 0        | Level (%)
    /// 1          | 6        | Last charged: year - 2000, month, day, hour, minute, second
    /// 7          | 8        | Charge cycles, little endian
    /// 9          | 9        | Status
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != BATTERY_INFO_LEN {
            return None;
        }

        Some(Self {
            level: data[0],
            cycles: u16::from_le_bytes([data[7], data[8]]),
            status: BatteryStatus::from_byte(data[9]),
            last_charged: ChargeTimestamp {
                year: 2000 + u16::from(data[1]),
                month: data[2],
                day: data[3],
                hour: data[4],
                minute: data[5],
                second: data[6],
            },
        })
    }
}

#[test]
fn test_decode_happy() {
    let data = hex::decode("3711050f0e1e2d2a0002").unwrap();
    let info = BatteryInfo::decode(&data).unwrap();
    assert_eq!(
        info,
        BatteryInfo {
            level: 55,
            cycles: 42,
            status: BatteryStatus::Charging,
            last_charged: ChargeTimestamp {
                year: 2017,
                month: 5,
                day: 15,
                hour: 14,
                minute: 30,
                second: 45,
            },
        }
    );
}

#[test]
fn test_decode_cycles_little_endian() {
    let data = hex::decode("64000000000000010103").unwrap();
    let info = BatteryInfo::decode(&data).unwrap();
    assert_eq!(info.cycles, 0x0101);
    assert_eq!(info.status, BatteryStatus::Full);
}

#[test]
fn test_decode_wrong_length() {
    assert_eq!(BatteryInfo::decode(&[0u8; 9]), None);
    assert_eq!(BatteryInfo::decode(&[0u8; 11]), None);
    assert_eq!(BatteryInfo::decode(&[]), None);
}

#[test]
fn test_status_mapping() {
    assert_eq!(BatteryStatus::from_byte(1), BatteryStatus::Low);
    assert_eq!(BatteryStatus::from_byte(4), BatteryStatus::NotCharging);
    assert_eq!(BatteryStatus::from_byte(0), BatteryStatus::Unknown);
    assert_eq!(BatteryStatus::from_byte(200), BatteryStatus::Unknown);
}
