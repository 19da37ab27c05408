use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use log::{debug, info};
use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::config::BandConfig;
use crate::connection::{CompletionSink, Connection, ConnectionState};
use crate::error::{BandError, Result};
use crate::exchange::{self, Exchange};
use crate::message::{address_tail, BatteryInfo, LeParams, UserInfo};
use crate::notify::{heart_rate_handler, raw_handler, steps_handler};
use crate::profile::{self, CharacteristicId};
use crate::protocol::{LedColor, VibrationMode};
use crate::transport::{Transport, TransportEvent};

/// Client for one band over one transport.
///
/// Every logical operation gets its own completion channel, so a call only
/// ever sees the outcome of its own transport operation. Only one operation
/// can be in flight at a time; a second concurrent call fails with
/// [`BandError::OperationInFlight`] rather than being queued.
pub struct MiBand<T: Transport> {
    connection: Connection<T>,
    config: BandConfig,
}

impl<T: Transport> MiBand<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, BandConfig::default())
    }

    pub fn with_config(transport: T, config: BandConfig) -> Self {
        Self {
            connection: Connection::new(transport),
            config,
        }
    }

    pub fn config(&self) -> &BandConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Address of the connected (or connecting) device
    pub fn address(&self) -> Option<String> {
        self.connection.address()
    }

    /// Feed one event from the transport into the engine.
    pub fn handle_event(&self, event: TransportEvent) {
        self.connection.handle_event(event);
    }

    /// Feed every event of `events` into the engine until the stream ends.
    pub async fn pump_events<S>(&self, events: S)
    where
        S: Stream<Item = TransportEvent>,
    {
        let mut events = std::pin::pin!(events);
        while let Some(event) = events.next().await {
            self.handle_event(event);
        }
        debug!("Transport event stream ended");
    }

    /// Connect and discover services. Resolves once the band is ready for operations.
    ///
    /// When [`BandConfig::connect_timeout`] expires the attempt is abandoned
    /// and `connect` may be called again.
    pub async fn connect(&self, address: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.connection.connect(address, tx)?;
        let connected = Self::wait(rx, self.config.connect_timeout, "connection").await;
        if let Err(BandError::Timeout(_)) = connected {
            self.connection.abandon_connect();
        }
        connected?;
        info!("Connected to {address}");
        Ok(())
    }

    /// Drop the link. The disconnect listener fires once the transport reports the link down.
    pub fn disconnect(&self) -> Result<()> {
        self.connection.disconnect()
    }

    /// Called every time the link goes down.
    pub fn on_disconnected<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.connection.set_disconnect_listener(Arc::new(listener));
    }

    /// Write the pair command, then read the pair characteristic back to check it took.
    pub async fn pair(&self) -> Result<()> {
        self.execute(exchange::pair_request()).await?;
        self.execute(exchange::pair_readback()).await
    }

    /// Received signal strength in dBm
    pub async fn read_rssi(&self) -> Result<i16> {
        self.execute(exchange::rssi()).await
    }

    pub async fn battery_info(&self) -> Result<BatteryInfo> {
        self.execute(exchange::battery_info()).await
    }

    pub async fn user_info(&self) -> Result<UserInfo> {
        self.execute(exchange::user_info()).await
    }

    /// Store the wearer's profile. The record checksum is bound to the device address.
    pub async fn set_user_info(&self, user_info: &UserInfo) -> Result<()> {
        let address = self.address().ok_or(BandError::NotConnected)?;
        let record = user_info.encode(address_tail(&address)?);
        self.execute(exchange::set_user_info(&record)).await
    }

    pub async fn start_vibration(&self, mode: VibrationMode) -> Result<()> {
        self.execute(exchange::start_vibration(mode)).await
    }

    pub async fn stop_vibration(&self) -> Result<()> {
        self.execute(exchange::stop_vibration()).await
    }

    pub async fn set_led_color(&self, color: LedColor) -> Result<LedColor> {
        self.execute(exchange::led_color(color)).await
    }

    /// Ask the band to push step counts. Listen with [`MiBand::register_steps_listener`].
    pub async fn enable_realtime_steps_notify(&self) -> Result<bool> {
        self.execute(exchange::realtime_steps_notify(true)).await
    }

    pub async fn disable_realtime_steps_notify(&self) -> Result<bool> {
        self.execute(exchange::realtime_steps_notify(false)).await
    }

    /// Ask the band to push raw sensor data. Listen with [`MiBand::register_sensor_listener`].
    pub async fn enable_sensor_data_notify(&self) -> Result<bool> {
        self.execute(exchange::sensor_data_notify(true)).await
    }

    pub async fn disable_sensor_data_notify(&self) -> Result<bool> {
        self.execute(exchange::sensor_data_notify(false)).await
    }

    /// Start a heart-rate measurement. Results arrive through
    /// [`MiBand::register_heart_rate_listener`].
    pub async fn start_heart_rate_scan(&self) -> Result<()> {
        self.execute(exchange::start_heart_rate_scan()).await
    }

    pub async fn le_params(&self) -> Result<LeParams> {
        self.execute(exchange::le_params()).await
    }

    pub async fn reboot(&self) -> Result<()> {
        self.execute(exchange::reboot()).await
    }

    pub async fn factory_reset(&self) -> Result<()> {
        self.execute(exchange::factory_reset()).await
    }

    pub fn register_steps_listener<F>(&self, listener: F) -> Result<()>
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.connection
            .register_notification(profile::REALTIME_STEPS, steps_handler(listener))
    }

    /// Frames are filtered by the configured [`BandConfig::heart_rate_tag`].
    pub fn register_heart_rate_listener<F>(&self, listener: F) -> Result<()>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let handler = heart_rate_handler(self.config.heart_rate_tag, listener);
        self.connection
            .register_notification(profile::HEART_RATE_MEASUREMENT, handler)
    }

    pub fn register_sensor_listener<F>(&self, listener: F) -> Result<()>
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.connection
            .register_notification(profile::SENSOR_DATA, raw_handler(listener))
    }

    pub fn register_generic_notify_listener<F>(&self, listener: F) -> Result<()>
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.connection
            .register_notification(profile::NOTIFICATION, raw_handler(listener))
    }

    pub fn unregister_notification(&self, id: CharacteristicId) -> Result<()> {
        self.connection.unregister_notification(id)
    }

    async fn execute<R>(&self, exchange: Exchange<R>) -> Result<R>
    where
        R: Send + 'static,
    {
        let Exchange {
            name,
            operation,
            decode,
        } = exchange;
        debug!("Requesting {name}");

        let (tx, rx) = oneshot::channel();
        let sink: CompletionSink = Box::new(move |result| {
            let _ = tx.send(result.and_then(decode));
        });
        self.connection.issue(operation, sink)?;

        Self::wait(rx, self.config.operation_timeout, name).await
    }

    async fn wait<R>(
        rx: oneshot::Receiver<Result<R>>,
        limit: Option<Duration>,
        what: &'static str,
    ) -> Result<R> {
        let received = match limit {
            Some(limit) => timeout(limit, rx)
                .await
                .map_err(|_| BandError::Timeout(what))?,
            None => rx.await,
        };
        // A dropped sender means the engine went away with the call unresolved
        received.unwrap_or(Err(BandError::Disconnected))
    }
}
