use crate::error::{BandError, Result};
use crate::protocol::USER_INFO_MARKER;

/// Length in bytes of an encoded user profile
pub const USER_INFO_LEN: usize = 20;

// Right after the marker. Decoding reads the alias from here as well, so a
// record always decodes to the profile it was encoded from.
const ALIAS_OFFSET: usize = 11;
const ALIAS_LEN: usize = 8;

/// The wearer's profile as stored by the band
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub uid: u32,
    /// 1 for male, 0 for female
    pub gender: u8,
    pub age: u8,
    /// Height in cm
    pub height_cm: u8,
    /// Weight in kg
    pub weight_kg: u8,
    /// At most 8 bytes of UTF-8 are sent, longer aliases are cut
    pub alias: String,
    pub profile_type: u8,
}

impl UserInfo {
    /// Encode the profile for writing to the user-info characteristic.
    ///
    /// The record layout is:
    ///
    /// Start Byte | End Byte | Meaning
    /// 0          | 3        | uid, little endian
    /// 4          | 8        | gender, age, height, weight, profile type
    /// 9          | 10       | A constant marker with value [0x04, 0x00]
    /// 11         | 18       | The alias, zero padded
    /// 19         | 19       | CRC-8 over bytes 0-18 XOR the device address tail
    pub fn encode(&self, address_tail: u8) -> [u8; USER_INFO_LEN] {
        let mut record = [0u8; USER_INFO_LEN];
        record[0..4].copy_from_slice(&self.uid.to_le_bytes());
        record[4] = self.gender;
        record[5] = self.age;
        record[6] = self.height_cm;
        record[7] = self.weight_kg;
        record[8] = self.profile_type;
        record[9..ALIAS_OFFSET].copy_from_slice(&USER_INFO_MARKER);

        let alias = self.alias.as_bytes();
        let alias_len = alias.len().min(ALIAS_LEN);
        record[ALIAS_OFFSET..ALIAS_OFFSET + alias_len].copy_from_slice(&alias[..alias_len]);

        record[USER_INFO_LEN - 1] = crc8(&record[..USER_INFO_LEN - 1]) ^ address_tail;
        record
    }

    /// Decode a user-info record. Returns `None` for anything shorter than 20 bytes.
    ///
    /// The checksum byte is not verified since it depends on the device address.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < USER_INFO_LEN {
            return None;
        }

        let alias_bytes = &data[ALIAS_OFFSET..ALIAS_OFFSET + ALIAS_LEN];
        let alias = std::str::from_utf8(alias_bytes)
            .map(|alias| alias.trim_end_matches('\0').to_string())
            .unwrap_or_default();

        Some(Self {
            uid: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            gender: data[4],
            age: data[5],
            height_cm: data[6],
            weight_kg: data[7],
            profile_type: data[8],
            alias,
        })
    }
}

/// The numeric value of the last two hex characters of a BLE address, e.g. `0x5E`
/// for `C8:0F:10:7A:2B:5E`.
pub fn address_tail(address: &str) -> Result<u8> {
    let tail = address
        .len()
        .checked_sub(2)
        .and_then(|start| address.get(start..))
        .ok_or_else(|| BandError::InvalidAddress(address.to_string()))?;
    u8::from_str_radix(tail, 16).map_err(|_| BandError::InvalidAddress(address.to_string()))
}

/// The band's CRC-8: bit serial, LSB first, reflected polynomial 0x8C, zero seed.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut extract = byte;
        for _ in 0..8 {
            let sum = (crc ^ extract) & 0x01;
            crc >>= 1;
            if sum != 0 {
                crc ^= 0x8c;
            }
            extract >>= 1;
        }
    }
    crc
}

#[cfg(test)]
fn sample() -> UserInfo {
    UserInfo {
        uid: 20271234,
        gender: 1,
        age: 32,
        height_cm: 160,
        weight_kg: 40,
        alias: "alias".to_string(),
        profile_type: 0,
    }
}

#[test]
fn test_encode_golden_vector() {
    let expected = hex::decode("825035010120a028000400616c6961730000009c").unwrap();
    let tail = address_tail("C8:0F:10:7A:2B:5E").unwrap();
    assert_eq!(sample().encode(tail).to_vec(), expected);
}

#[test]
fn test_crc8_check_value() {
    assert_eq!(crc8(b"123456789"), 0xa1);
    assert_eq!(crc8(&[]), 0x00);
    assert_eq!(crc8(&[0x01]), 0x5e);
}

#[test]
fn test_checksum_bound_to_address() {
    let a = sample().encode(0x5e);
    let b = sample().encode(0x5f);
    assert_eq!(a[..19], b[..19]);
    assert_eq!(a[19] ^ b[19], 0x5e ^ 0x5f);
}

#[test]
fn test_decode_round_trip() {
    let encoded = sample().encode(0x00);
    assert_eq!(UserInfo::decode(&encoded), Some(sample()));
}

#[test]
fn test_decode_too_short() {
    assert_eq!(UserInfo::decode(&[0u8; 19]), None);
}

#[test]
fn test_long_alias_is_cut() {
    let mut info = sample();
    info.alias = "a very long alias".to_string();
    let encoded = info.encode(0x00);
    assert_eq!(&encoded[11..19], b"a very l");
    assert_eq!(UserInfo::decode(&encoded).unwrap().alias, "a very l");
}

#[test]
fn test_invalid_utf8_alias_decodes_empty() {
    let mut encoded = sample().encode(0x00);
    encoded[11] = 0xff;
    assert_eq!(UserInfo::decode(&encoded).unwrap().alias, "");
}

#[test]
fn test_address_tail() {
    assert_eq!(address_tail("88:0F:10:12:34:ab"), Ok(0xab));
    assert!(matches!(address_tail(""), Err(BandError::InvalidAddress(_))));
    assert!(matches!(address_tail("88:0F:10:12:34:zz"), Err(BandError::InvalidAddress(_))));
}
