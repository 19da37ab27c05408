//! Fixed command vectors understood by the band.

use std::str::FromStr;

use crate::error::BandError;

pub const PAIR: [u8; 1] = [2];
/// The pair characteristic reads back this single byte once pairing succeeded
pub const PAIR_SUCCESS: u8 = 2;

pub const VIBRATION_WITH_LED: [u8; 1] = [1];
pub const VIBRATION_10_TIMES_WITH_LED: [u8; 1] = [2];
pub const VIBRATION_WITHOUT_LED: [u8; 1] = [4];
pub const STOP_VIBRATION: [u8; 1] = [0];

pub const ENABLE_REALTIME_STEPS_NOTIFY: [u8; 2] = [3, 1];
pub const DISABLE_REALTIME_STEPS_NOTIFY: [u8; 2] = [3, 0];
pub const ENABLE_SENSOR_DATA_NOTIFY: [u8; 2] = [18, 1];
pub const DISABLE_SENSOR_DATA_NOTIFY: [u8; 2] = [18, 0];

pub const SET_COLOR_RED: [u8; 5] = [14, 6, 1, 2, 1];
pub const SET_COLOR_BLUE: [u8; 5] = [14, 0, 6, 6, 1];
pub const SET_COLOR_ORANGE: [u8; 5] = [14, 6, 2, 0, 1];
pub const SET_COLOR_GREEN: [u8; 5] = [14, 4, 5, 0, 1];

pub const START_HEART_RATE_SCAN: [u8; 3] = [21, 2, 1];

pub const REBOOT: [u8; 1] = [12];
pub const FACTORY_RESET: [u8; 1] = [9];

/// The two bytes between the profile fields and the alias of a user-info record
pub const USER_INFO_MARKER: [u8; 2] = [4, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VibrationMode {
    WithLed,
    TenTimesWithLed,
    WithoutLed,
}

impl VibrationMode {
    pub fn command(self) -> &'static [u8] {
        match self {
            VibrationMode::WithLed => &VIBRATION_WITH_LED,
            VibrationMode::TenTimesWithLed => &VIBRATION_10_TIMES_WITH_LED,
            VibrationMode::WithoutLed => &VIBRATION_WITHOUT_LED,
        }
    }
}

impl TryFrom<u8> for VibrationMode {
    type Error = BandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VibrationMode::WithLed),
            2 => Ok(VibrationMode::TenTimesWithLed),
            4 => Ok(VibrationMode::WithoutLed),
            other => Err(BandError::UnsupportedEnumValue {
                kind: "vibration mode",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for VibrationMode {
    type Err = BandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "led" | "with-led" => Ok(VibrationMode::WithLed),
            "10x" | "ten-times" => Ok(VibrationMode::TenTimesWithLed),
            "plain" | "without-led" => Ok(VibrationMode::WithoutLed),
            _ => Err(BandError::UnsupportedEnumValue {
                kind: "vibration mode",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedColor {
    Red,
    Blue,
    Orange,
    Green,
}

impl LedColor {
    pub fn command(self) -> &'static [u8] {
        match self {
            LedColor::Red => &SET_COLOR_RED,
            LedColor::Blue => &SET_COLOR_BLUE,
            LedColor::Orange => &SET_COLOR_ORANGE,
            LedColor::Green => &SET_COLOR_GREEN,
        }
    }

    /// Map an echoed control-point value back to the color it sets.
    pub fn from_command(value: &[u8]) -> Option<Self> {
        [LedColor::Red, LedColor::Blue, LedColor::Orange, LedColor::Green]
            .into_iter()
            .find(|color| color.command() == value)
    }
}

impl TryFrom<u8> for LedColor {
    type Error = BandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LedColor::Red),
            1 => Ok(LedColor::Blue),
            2 => Ok(LedColor::Orange),
            3 => Ok(LedColor::Green),
            other => Err(BandError::UnsupportedEnumValue {
                kind: "LED color",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for LedColor {
    type Err = BandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(LedColor::Red),
            "blue" => Ok(LedColor::Blue),
            "orange" => Ok(LedColor::Orange),
            "green" => Ok(LedColor::Green),
            _ => Err(BandError::UnsupportedEnumValue {
                kind: "LED color",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_color_command_round_trip() {
        for color in [LedColor::Red, LedColor::Blue, LedColor::Orange, LedColor::Green] {
            assert_eq!(LedColor::from_command(color.command()), Some(color));
        }
        assert_eq!(LedColor::from_command(&[14, 0, 0, 0, 1]), None);
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert_eq!(
            VibrationMode::try_from(3),
            Err(BandError::UnsupportedEnumValue {
                kind: "vibration mode",
                value: "3".to_string()
            })
        );
        assert!(matches!(
            "purple".parse::<LedColor>(),
            Err(BandError::UnsupportedEnumValue { kind: "LED color", .. })
        ));
        assert_eq!("Green".parse::<LedColor>(), Ok(LedColor::Green));
        assert_eq!("10x".parse::<VibrationMode>(), Ok(VibrationMode::TenTimesWithLed));
    }
}
