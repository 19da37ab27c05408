//! Fixed-layout records exchanged with the band.

mod battery_info;
mod heart_rate;
mod le_params;
mod realtime_steps;
mod user_info;

pub use battery_info::{BatteryInfo, BatteryStatus, ChargeTimestamp, BATTERY_INFO_LEN};
pub use heart_rate::{decode_heart_rate_frame, HeartRateTag};
pub use le_params::{LeParams, LE_PARAMS_LEN};
pub use realtime_steps::decode_step_frame;
pub use user_info::{address_tail, crc8, UserInfo, USER_INFO_LEN};
