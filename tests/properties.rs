//! Property tests for the record decoders and the user-info codec.

use miband::message::{
    crc8, decode_heart_rate_frame, decode_step_frame, BatteryInfo, HeartRateTag, LeParams,
    UserInfo, BATTERY_INFO_LEN, LE_PARAMS_LEN, USER_INFO_LEN,
};
use proptest::prelude::*;

fn user_info() -> impl Strategy<Value = UserInfo> {
    (
        any::<u32>(),
        0u8..=1,
        any::<u8>(),
        any::<u8>(),
        any::<u8>(),
        "[a-zA-Z0-9 ]{0,8}",
        any::<u8>(),
    )
        .prop_map(
            |(uid, gender, age, height_cm, weight_kg, alias, profile_type)| UserInfo {
                uid,
                gender,
                age,
                height_cm,
                weight_kg,
                alias: alias.trim_end_matches(' ').to_string(),
                profile_type,
            },
        )
}

proptest! {
    /// Short ASCII aliases survive encoding and decoding unchanged.
    #[test]
    fn user_info_round_trip(user in user_info(), tail in any::<u8>()) {
        let record = user.encode(tail);
        prop_assert_eq!(UserInfo::decode(&record), Some(user));
    }

    /// The last byte is always the checksum of the rest, bound to the address tail.
    #[test]
    fn user_info_checksum(user in user_info(), tail in any::<u8>()) {
        let record = user.encode(tail);
        prop_assert_eq!(record[USER_INFO_LEN - 1], crc8(&record[..USER_INFO_LEN - 1]) ^ tail);
        prop_assert_eq!(&record[9..11], &[4u8, 0][..]);
    }

    #[test]
    fn user_info_short_input_rejected(data in proptest::collection::vec(any::<u8>(), 0..USER_INFO_LEN)) {
        prop_assert!(UserInfo::decode(&data).is_none());
    }

    #[test]
    fn step_frame_needs_four_bytes(data in proptest::collection::vec(any::<u8>(), 0..12)) {
        let decoded = decode_step_frame(&data);
        if data.len() == 4 {
            prop_assert_eq!(decoded, Some(u32::from_le_bytes([data[0], data[1], data[2], data[3]])));
        } else {
            prop_assert_eq!(decoded, None);
        }
    }

    #[test]
    fn heart_rate_frame_needs_tag_and_two_bytes(
        data in proptest::collection::vec(any::<u8>(), 0..6),
        tag in any::<u8>(),
    ) {
        let decoded = decode_heart_rate_frame(&data, HeartRateTag(tag));
        if data.len() == 2 && data[0] == tag {
            prop_assert_eq!(decoded, Some(data[1]));
        } else {
            prop_assert_eq!(decoded, None);
        }
    }

    #[test]
    fn battery_info_needs_exact_length(data in proptest::collection::vec(any::<u8>(), 0..24)) {
        let decoded = BatteryInfo::decode(&data);
        prop_assert_eq!(decoded.is_some(), data.len() == BATTERY_INFO_LEN);
        if let Some(info) = decoded {
            prop_assert_eq!(info.level, data[0]);
            prop_assert_eq!(info.cycles, u16::from_le_bytes([data[7], data[8]]));
        }
    }

    #[test]
    fn le_params_needs_twelve_bytes(data in proptest::collection::vec(any::<u8>(), 0..24)) {
        prop_assert_eq!(LeParams::decode(&data).is_some(), data.len() >= LE_PARAMS_LEN);
    }
}
