//! [`Transport`] backed by the platform BLE stack through `bluest`.
//!
//! Each request is run as a task on the tokio runtime that created the
//! transport; its outcome is sent to the event stream returned by
//! [`BluestTransport::new`], which should be fed to
//! [`crate::MiBand::pump_events`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bluest::{Adapter, Characteristic, ConnectionEvent, Device};
use futures_util::{Stream, StreamExt};
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::error::{BandError, Result, TransportFailure};
use crate::profile::CharacteristicId;
use crate::transport::{Transport, TransportEvent};

// How long to scan for the requested address before giving up
const SCAN_TIMEOUT_S: u64 = 30;

// bluest does not expose ATT status codes
const UNKNOWN_STATUS: i32 = -1;

struct Link {
    device: Device,
    characteristics: HashMap<CharacteristicId, Characteristic>,
    notify_tasks: HashMap<CharacteristicId, JoinHandle<()>>,
}

impl Link {
    fn shutdown(self) {
        for (_, task) in self.notify_tasks {
            task.abort();
        }
    }
}

type SharedLink = Arc<Mutex<Option<Link>>>;

pub struct BluestTransport {
    adapter: Adapter,
    runtime: Handle,
    events: mpsc::UnboundedSender<TransportEvent>,
    link: SharedLink,
}

impl BluestTransport {
    /// Open the default adapter. Must be called from within a tokio runtime.
    pub async fn new() -> Result<(Self, impl Stream<Item = TransportEvent>)> {
        let adapter = Adapter::default()
            .await
            .ok_or_else(|| BandError::TransportUnavailable("Default adapter not found".to_string()))?;
        adapter
            .wait_available()
            .await
            .map_err(|err| BandError::TransportUnavailable(err.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let events = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        let transport = Self {
            adapter,
            runtime: Handle::current(),
            events: tx,
            link: Arc::new(Mutex::new(None)),
        };
        Ok((transport, events))
    }

    fn link(&self) -> MutexGuard<'_, Option<Link>> {
        lock(&self.link)
    }

    fn device(&self) -> Result<Device> {
        self.link()
            .as_ref()
            .map(|link| link.device.clone())
            .ok_or(BandError::NotConnected)
    }

    fn characteristic(&self, id: CharacteristicId) -> Result<Characteristic> {
        let link = self.link();
        let link = link.as_ref().ok_or(BandError::NotConnected)?;
        link.characteristics.get(&id).cloned().ok_or_else(|| {
            BandError::from(TransportFailure::new(
                UNKNOWN_STATUS,
                format!("Characteristic {id} does not exist"),
            ))
        })
    }
}

impl Transport for BluestTransport {
    fn connect(&mut self, address: &str) -> Result<()> {
        let adapter = self.adapter.clone();
        let events = self.events.clone();
        let link = self.link.clone();
        let address = address.to_string();

        self.runtime.spawn(async move {
            let device = match find_device(&adapter, &address).await {
                Ok(device) => device,
                Err(err) => {
                    warn!("Could not find {address}: {err}");
                    let _ = events.send(TransportEvent::LinkDown);
                    return;
                }
            };

            if let Err(err) = adapter.connect_device(&device).await {
                warn!("Failed to connect to {address}: {err}");
                let _ = events.send(TransportEvent::LinkDown);
                return;
            }

            *lock(&link) = Some(Link {
                device: device.clone(),
                characteristics: HashMap::new(),
                notify_tasks: HashMap::new(),
            });
            let _ = events.send(TransportEvent::LinkUp);

            watch_connection(adapter, device, link, events).await;
        });
        Ok(())
    }

    fn discover_services(&mut self) -> Result<()> {
        let device = self.device()?;
        let events = self.events.clone();
        let link = self.link.clone();

        self.runtime.spawn(async move {
            let result = match discover_characteristics(&device).await {
                Ok(characteristics) => {
                    info!("Discovered {} characteristics", characteristics.len());
                    if let Some(link) = lock(&link).as_mut() {
                        link.characteristics = characteristics;
                    }
                    Ok(())
                }
                Err(err) => Err(failure(err)),
            };
            let _ = events.send(TransportEvent::ServicesDiscovered(result));
        });
        Ok(())
    }

    fn write_characteristic(&mut self, id: CharacteristicId, value: &[u8]) -> Result<()> {
        let characteristic = self.characteristic(id)?;
        let events = self.events.clone();
        let value = value.to_vec();

        self.runtime.spawn(async move {
            let result = match characteristic.write(&value).await {
                Ok(()) => Ok(value),
                Err(err) => Err(failure(err)),
            };
            let _ = events.send(TransportEvent::CharacteristicWrite { id, result });
        });
        Ok(())
    }

    fn read_characteristic(&mut self, id: CharacteristicId) -> Result<()> {
        let characteristic = self.characteristic(id)?;
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let result = characteristic.read().await.map_err(failure);
            let _ = events.send(TransportEvent::CharacteristicRead { id, result });
        });
        Ok(())
    }

    fn read_rssi(&mut self) -> Result<()> {
        let device = self.device()?;
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let result = device.rssi().await.map_err(failure);
            let _ = events.send(TransportEvent::RssiRead(result));
        });
        Ok(())
    }

    fn set_notification_enabled(&mut self, id: CharacteristicId, enabled: bool) -> Result<()> {
        if !enabled {
            if let Some(task) = self
                .link()
                .as_mut()
                .and_then(|link| link.notify_tasks.remove(&id))
            {
                task.abort();
            }
            return Ok(());
        }

        let characteristic = self.characteristic(id)?;
        let events = self.events.clone();
        let task = self.runtime.spawn(async move {
            let mut notifications = match characteristic.notify().await {
                Ok(notifications) => notifications,
                Err(err) => {
                    warn!("Failed to enable notifications on {id}: {err}");
                    return;
                }
            };
            while let Some(item) = notifications.next().await {
                match item {
                    Ok(value) => {
                        let _ = events.send(TransportEvent::CharacteristicChanged { id, value });
                    }
                    Err(err) => warn!("Notification error on {id}: {err}"),
                }
            }
            debug!("Notification stream for {id} ended");
        });

        match self.link().as_mut() {
            Some(link) => {
                if let Some(previous) = link.notify_tasks.insert(id, task) {
                    previous.abort();
                }
            }
            None => task.abort(),
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        let device = self.device()?;
        let adapter = self.adapter.clone();
        let events = self.events.clone();
        let link = self.link.clone();

        self.runtime.spawn(async move {
            match adapter.disconnect_device(&device).await {
                Ok(()) => report_link_down(&link, &events),
                Err(err) => warn!("Failed to disconnect: {err}"),
            }
        });
        Ok(())
    }

    fn close(&mut self) {
        if let Some(link) = self.link().take() {
            link.shutdown();
        }
    }
}

fn lock(link: &SharedLink) -> MutexGuard<'_, Option<Link>> {
    link.lock().unwrap_or_else(PoisonError::into_inner)
}

fn failure(err: bluest::Error) -> TransportFailure {
    TransportFailure::new(UNKNOWN_STATUS, err.to_string())
}

/// Send a single `LinkDown` per link, whoever notices first.
fn report_link_down(link: &SharedLink, events: &mpsc::UnboundedSender<TransportEvent>) {
    if let Some(link) = lock(link).take() {
        link.shutdown();
        let _ = events.send(TransportEvent::LinkDown);
    }
}

async fn find_device(adapter: &Adapter, address: &str) -> Result<Device> {
    let mut scan = adapter
        .scan(&[])
        .await
        .map_err(|err| BandError::TransportUnavailable(err.to_string()))?;
    let found = timeout(Duration::from_secs(SCAN_TIMEOUT_S), async {
        while let Some(advertising) = scan.next().await {
            if advertising.device.id().to_string().eq_ignore_ascii_case(address) {
                return Some(advertising.device);
            }
        }
        None
    })
    .await;

    match found {
        Ok(Some(device)) => Ok(device),
        _ => Err(BandError::ConnectionFailed(format!("Device {address} not found"))),
    }
}

async fn discover_characteristics(
    device: &Device,
) -> bluest::Result<HashMap<CharacteristicId, Characteristic>> {
    let mut characteristics = HashMap::new();
    for service in device.discover_services().await? {
        for characteristic in service.discover_characteristics().await? {
            let id = CharacteristicId::new(service.uuid(), characteristic.uuid());
            debug!("  char: {id}");
            characteristics.insert(id, characteristic);
        }
    }
    Ok(characteristics)
}

async fn watch_connection(
    adapter: Adapter,
    device: Device,
    link: SharedLink,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut connection_events = match adapter.device_connection_events(&device).await {
        Ok(connection_events) => connection_events,
        Err(err) => {
            warn!("Cannot watch connection state: {err}");
            return;
        }
    };
    while let Some(event) = connection_events.next().await {
        if matches!(event, ConnectionEvent::Disconnected) {
            report_link_down(&link, &events);
            return;
        }
    }
}
