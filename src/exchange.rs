//! Table of logical operations: which characteristic each one targets and how
//! its completion payload is decoded.

use crate::connection::{Completion, Operation};
use crate::error::{BandError, Result};
use crate::message::{BatteryInfo, LeParams, UserInfo, BATTERY_INFO_LEN, USER_INFO_LEN};
use crate::profile;
use crate::protocol::{self, LedColor, VibrationMode};

/// One transport call plus the decoder for its result.
pub(crate) struct Exchange<R> {
    pub name: &'static str,
    pub operation: Operation,
    pub decode: fn(Completion) -> Result<R>,
}

impl<R> Exchange<R> {
    fn read(name: &'static str, id: profile::CharacteristicId, decode: fn(Completion) -> Result<R>) -> Self {
        Self {
            name,
            operation: Operation::Read(id),
            decode,
        }
    }

    fn write(
        name: &'static str,
        id: profile::CharacteristicId,
        value: &[u8],
        decode: fn(Completion) -> Result<R>,
    ) -> Self {
        Self {
            name,
            operation: Operation::Write(id, value.to_vec()),
            decode,
        }
    }
}

fn value(completion: Completion) -> Result<Vec<u8>> {
    match completion {
        Completion::Value(value) => Ok(value),
        Completion::Rssi(_) => Err(BandError::MalformedResponse(
            "expected a characteristic value, got RSSI".to_string(),
        )),
    }
}

fn ignore(_: Completion) -> Result<()> {
    Ok(())
}

pub(crate) fn pair_request() -> Exchange<()> {
    Exchange::write("pair", profile::PAIR, &protocol::PAIR, ignore)
}

/// Pairing succeeded when the pair characteristic reads back the single success byte
pub(crate) fn pair_readback() -> Exchange<()> {
    Exchange::read("pair readback", profile::PAIR, |completion| {
        let value = value(completion)?;
        if value == [protocol::PAIR_SUCCESS] {
            Ok(())
        } else {
            Err(BandError::MalformedResponse(format!(
                "Pairing failed: {}",
                hex::encode(&value)
            )))
        }
    })
}

pub(crate) fn rssi() -> Exchange<i16> {
    Exchange {
        name: "RSSI",
        operation: Operation::ReadRssi,
        decode: |completion| match completion {
            Completion::Rssi(rssi) => Ok(rssi),
            Completion::Value(_) => Err(BandError::MalformedResponse(
                "expected RSSI, got a characteristic value".to_string(),
            )),
        },
    }
}

pub(crate) fn battery_info() -> Exchange<BatteryInfo> {
    Exchange::read("battery info", profile::BATTERY, |completion| {
        let value = value(completion)?;
        BatteryInfo::decode(&value).ok_or_else(|| {
            BandError::MalformedResponse(format!(
                "Wrong data format for battery info: expected {BATTERY_INFO_LEN} bytes, got {}",
                value.len()
            ))
        })
    })
}

pub(crate) fn user_info() -> Exchange<UserInfo> {
    Exchange::read("user info", profile::USER_INFO, |completion| {
        let value = value(completion)?;
        UserInfo::decode(&value).ok_or_else(|| {
            BandError::MalformedResponse(format!(
                "Wrong data format for user info: expected {USER_INFO_LEN} bytes, got {}",
                value.len()
            ))
        })
    })
}

pub(crate) fn set_user_info(record: &[u8; USER_INFO_LEN]) -> Exchange<()> {
    Exchange::write("set user info", profile::USER_INFO, record, ignore)
}

pub(crate) fn start_vibration(mode: VibrationMode) -> Exchange<()> {
    Exchange::write("start vibration", profile::VIBRATION, mode.command(), ignore)
}

pub(crate) fn stop_vibration() -> Exchange<()> {
    Exchange::write("stop vibration", profile::VIBRATION, &protocol::STOP_VIBRATION, ignore)
}

/// Resolves with the color the control point echoes back
pub(crate) fn led_color(color: LedColor) -> Exchange<LedColor> {
    Exchange::write("LED color", profile::CONTROL_POINT, color.command(), |completion| {
        let value = value(completion)?;
        LedColor::from_command(&value).ok_or_else(|| {
            BandError::MalformedResponse(format!("Unknown LED color echo: {}", hex::encode(&value)))
        })
    })
}

/// Resolves with whether the echoed control-point value is the enable command
pub(crate) fn realtime_steps_notify(enable: bool) -> Exchange<bool> {
    let command = if enable {
        &protocol::ENABLE_REALTIME_STEPS_NOTIFY
    } else {
        &protocol::DISABLE_REALTIME_STEPS_NOTIFY
    };
    Exchange::write("realtime steps notify", profile::CONTROL_POINT, command, |completion| {
        Ok(value(completion)? == protocol::ENABLE_REALTIME_STEPS_NOTIFY)
    })
}

/// Resolves with whether the echoed control-point value is the enable command
pub(crate) fn sensor_data_notify(enable: bool) -> Exchange<bool> {
    let command = if enable {
        &protocol::ENABLE_SENSOR_DATA_NOTIFY
    } else {
        &protocol::DISABLE_SENSOR_DATA_NOTIFY
    };
    Exchange::write("sensor data notify", profile::CONTROL_POINT, command, |completion| {
        Ok(value(completion)? == protocol::ENABLE_SENSOR_DATA_NOTIFY)
    })
}

pub(crate) fn start_heart_rate_scan() -> Exchange<()> {
    Exchange::write(
        "start heart rate scan",
        profile::HEART_RATE_CONTROL,
        &protocol::START_HEART_RATE_SCAN,
        ignore,
    )
}

pub(crate) fn le_params() -> Exchange<LeParams> {
    Exchange::read("LE params", profile::LE_PARAMS, |completion| {
        let value = value(completion)?;
        LeParams::decode(&value).ok_or_else(|| {
            BandError::MalformedResponse(format!(
                "Wrong data format for LE params: {}",
                hex::encode(&value)
            ))
        })
    })
}

pub(crate) fn reboot() -> Exchange<()> {
    Exchange::write("reboot", profile::CONTROL_POINT, &protocol::REBOOT, ignore)
}

pub(crate) fn factory_reset() -> Exchange<()> {
    Exchange::write("factory reset", profile::CONTROL_POINT, &protocol::FACTORY_RESET, ignore)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_readback_sentinel() {
        let decode = pair_readback().decode;
        assert_eq!(decode(Completion::Value(vec![2])), Ok(()));
        assert!(matches!(
            decode(Completion::Value(vec![1])),
            Err(BandError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode(Completion::Value(vec![2, 2])),
            Err(BandError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_battery_info_requires_ten_bytes() {
        let decode = battery_info().decode;
        assert!(matches!(
            decode(Completion::Value(vec![0; 9])),
            Err(BandError::MalformedResponse(_))
        ));
        assert!(decode(Completion::Value(vec![0; 10])).is_ok());
    }

    #[test]
    fn test_notify_echo() {
        let enable = realtime_steps_notify(true);
        assert_eq!(
            enable.operation,
            Operation::Write(profile::CONTROL_POINT, vec![3, 1])
        );
        assert_eq!((enable.decode)(Completion::Value(vec![3, 1])), Ok(true));

        let disable = sensor_data_notify(false);
        assert_eq!((disable.decode)(Completion::Value(vec![18, 0])), Ok(false));
    }

    #[test]
    fn test_targets() {
        assert_eq!(
            start_vibration(VibrationMode::WithoutLed).operation,
            Operation::Write(profile::VIBRATION, vec![4])
        );
        assert_eq!(
            start_heart_rate_scan().operation,
            Operation::Write(profile::HEART_RATE_CONTROL, vec![21, 2, 1])
        );
        assert_eq!(rssi().operation, Operation::ReadRssi);
        assert_eq!(le_params().operation, Operation::Read(profile::LE_PARAMS));
        assert_eq!(
            reboot().operation,
            Operation::Write(profile::CONTROL_POINT, vec![12])
        );
        assert_eq!(
            factory_reset().operation,
            Operation::Write(profile::CONTROL_POINT, vec![9])
        );
    }

    #[test]
    fn test_le_params_rejects_short_payload() {
        let decode = le_params().decode;
        assert!(matches!(
            decode(Completion::Value(vec![0; 11])),
            Err(BandError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode(Completion::Rssi(-40)),
            Err(BandError::MalformedResponse(_))
        ));
    }
}
