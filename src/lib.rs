//! Talk to a Xiaomi Mi Band over Bluetooth Low Energy
//!
//! The band accepts one GATT transaction at a time. [`MiBand`] turns each
//! logical request (pair, read battery, vibrate, ...) into the right transport
//! read or write, waits for the matching completion, and decodes the band's
//! fixed-layout binary records. Unsolicited pushes (steps, heart rate, raw
//! sensor data) are routed to standing listeners by characteristic.
//!
//! The BLE stack itself sits behind the [`Transport`] trait. Enable the
//! `bluest` feature for an implementation on top of the platform stack.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "bluest")]
//! # async fn run() -> miband::Result<()> {
//! use std::sync::Arc;
//! use miband::{BluestTransport, MiBand, VibrationMode};
//!
//! let (transport, events) = BluestTransport::new().await?;
//! let band = Arc::new(MiBand::new(transport));
//! let pump = band.clone();
//! tokio::spawn(async move { pump.pump_events(events).await });
//!
//! band.connect("88:0F:10:12:34:56").await?;
//! band.pair().await?;
//! println!("{:?}", band.battery_info().await?);
//! band.start_vibration(VibrationMode::WithLed).await?;
//! # Ok(())
//! # }
//! ```

mod band;
#[cfg(feature = "bluest")]
mod bluest_transport;
mod config;
mod connection;
mod error;
mod exchange;
pub mod message;
pub mod mock;
mod notify;
pub mod profile;
pub mod protocol;
mod transport;

pub use band::MiBand;
#[cfg(feature = "bluest")]
pub use bluest_transport::BluestTransport;
pub use config::BandConfig;
pub use connection::ConnectionState;
pub use error::{BandError, Result, TransportFailure};
pub use message::{BatteryInfo, BatteryStatus, HeartRateTag, LeParams, UserInfo};
pub use profile::CharacteristicId;
pub use protocol::{LedColor, VibrationMode};
pub use transport::{Transport, TransportEvent};
