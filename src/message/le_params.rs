pub const LE_PARAMS_LEN: usize = 12;

/// Bluetooth LE connection parameters currently used by the band, in raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeParams {
    /// Units of 1.25 ms
    pub conn_interval_min: u16,
    /// Units of 1.25 ms
    pub conn_interval_max: u16,
    /// Number of connection events the band may skip
    pub latency: u16,
    /// Supervision timeout, units of 10 ms
    pub timeout: u16,
    /// Units of 1.25 ms
    pub conn_interval: u16,
    /// Units of 0.625 ms
    pub adv_interval: u16,
}

impl LeParams {
    /// Decode six little endian u16 fields. Returns `None` for fewer than 12 bytes.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < LE_PARAMS_LEN {
            return None;
        }
        let field = |i: usize| u16::from_le_bytes([data[2 * i], data[2 * i + 1]]);

        Some(Self {
            conn_interval_min: field(0),
            conn_interval_max: field(1),
            latency: field(2),
            timeout: field(3),
            conn_interval: field(4),
            adv_interval: field(5),
        })
    }

    pub fn conn_interval_min_ms(&self) -> f32 {
        f32::from(self.conn_interval_min) * 1.25
    }

    pub fn conn_interval_max_ms(&self) -> f32 {
        f32::from(self.conn_interval_max) * 1.25
    }

    pub fn conn_interval_ms(&self) -> f32 {
        f32::from(self.conn_interval) * 1.25
    }

    pub fn timeout_ms(&self) -> u32 {
        u32::from(self.timeout) * 10
    }

    pub fn adv_interval_ms(&self) -> f32 {
        f32::from(self.adv_interval) * 0.625
    }
}

#[test]
fn test_decode_le_params() {
    let data = hex::decode("2700280000001e0027004006").unwrap();
    let params = LeParams::decode(&data).unwrap();
    assert_eq!(params.conn_interval_min, 39);
    assert_eq!(params.conn_interval_max, 40);
    assert_eq!(params.latency, 0);
    assert_eq!(params.timeout, 30);
    assert_eq!(params.conn_interval, 39);
    assert_eq!(params.adv_interval, 1600);

    assert_eq!(params.conn_interval_max_ms(), 50.0);
    assert_eq!(params.timeout_ms(), 300);
    assert_eq!(params.adv_interval_ms(), 1000.0);
}

#[test]
fn test_decode_le_params_too_short() {
    assert_eq!(LeParams::decode(&[0u8; 11]), None);
}
