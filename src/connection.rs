//! Connection lifecycle and the single in-flight operation slot.
//!
//! The band accepts exactly one outstanding GATT transaction. The slot holds
//! the one pending operation together with the sink its completion goes to;
//! the sink is moved out of the slot before it is called, so a completion can
//! only ever be delivered once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use tokio::sync::oneshot;

use crate::error::{BandError, Result, TransportFailure};
use crate::notify::{NotificationRegistry, NotifyHandler};
use crate::profile::CharacteristicId;
use crate::transport::{Transport, TransportEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    DiscoveringServices,
    Ready,
    /// Ready, with a transport operation awaiting completion
    OperationPending,
}

/// A single transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Read(CharacteristicId),
    Write(CharacteristicId, Vec<u8>),
    ReadRssi,
}

impl Operation {
    fn target(&self) -> Target {
        match self {
            Operation::Read(id) => Target::Read(*id),
            Operation::Write(id, _) => Target::Write(*id),
            Operation::ReadRssi => Target::Rssi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Read(CharacteristicId),
    Write(CharacteristicId),
    Rssi,
}

/// What a successful transport operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Value(Vec<u8>),
    Rssi(i16),
}

pub type CompletionSink = Box<dyn FnOnce(Result<Completion>) + Send>;

struct PendingOperation {
    target: Target,
    sink: CompletionSink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Disconnected,
    Connecting,
    DiscoveringServices,
    Ready,
}

struct Session {
    link: LinkState,
    address: Option<String>,
    pending: Option<PendingOperation>,
    notifications: NotificationRegistry,
    connect_waiter: Option<oneshot::Sender<Result<()>>>,
    on_disconnected: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Session {
    fn new() -> Self {
        Self {
            link: LinkState::Disconnected,
            address: None,
            pending: None,
            notifications: NotificationRegistry::default(),
            connect_waiter: None,
            on_disconnected: None,
        }
    }

    fn state(&self) -> ConnectionState {
        match self.link {
            LinkState::Disconnected => ConnectionState::Disconnected,
            LinkState::Connecting => ConnectionState::Connecting,
            LinkState::DiscoveringServices => ConnectionState::DiscoveringServices,
            LinkState::Ready if self.pending.is_some() => ConnectionState::OperationPending,
            LinkState::Ready => ConnectionState::Ready,
        }
    }

    fn fail_connect(&mut self, err: BandError) -> Option<(oneshot::Sender<Result<()>>, BandError)> {
        self.link = LinkState::Disconnected;
        self.address = None;
        self.connect_waiter.take().map(|waiter| (waiter, err))
    }
}

/// Owns the transport and the session state for one device.
///
/// Two locks are used: the session lock is never held while calling into the
/// transport, and no user callback runs while either is held.
pub struct Connection<T: Transport> {
    transport: Mutex<T>,
    session: Mutex<Session>,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
            session: Mutex::new(Session::new()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.session().state()
    }

    /// Address of the device, once a connection has been requested.
    pub fn address(&self) -> Option<String> {
        self.session().address.clone()
    }

    pub fn set_disconnect_listener(&self, listener: Arc<dyn Fn() + Send + Sync>) {
        self.session().on_disconnected = Some(listener);
    }

    /// Start connecting. `waiter` is resolved once services are discovered or
    /// the attempt fails.
    pub fn connect(&self, address: &str, waiter: oneshot::Sender<Result<()>>) -> Result<()> {
        {
            let mut session = self.session();
            if session.link != LinkState::Disconnected {
                return Err(BandError::AlreadyConnected);
            }
            session.link = LinkState::Connecting;
            session.address = Some(address.to_string());
            session.connect_waiter = Some(waiter);
        }
        info!("Connecting to {address}");

        if let Err(err) = self.transport().connect(address) {
            warn!("Transport refused to connect to {address}: {err}");
            self.session().fail_connect(err.clone());
            return Err(err);
        }
        Ok(())
    }

    /// Give up on a connect attempt that has not reached `Ready` yet.
    ///
    /// The session returns to `Disconnected` and the transport handle is
    /// released; a late link-up for the abandoned attempt is ignored.
    pub fn abandon_connect(&self) {
        {
            let mut session = self.session();
            if !matches!(
                session.link,
                LinkState::Connecting | LinkState::DiscoveringServices
            ) {
                return;
            }
            warn!("Abandoning connection attempt while {:?}", session.link);
            session.fail_connect(BandError::Disconnected);
        }
        self.transport().close();
    }

    pub fn disconnect(&self) -> Result<()> {
        if self.session().link == LinkState::Disconnected {
            return Err(BandError::NotConnected);
        }
        info!("Disconnect requested");
        self.transport().disconnect()
    }

    /// Start a transport operation. Its outcome is delivered to `sink`, exactly once.
    ///
    /// Fails without touching the transport when the link is not ready or
    /// another operation is still pending.
    pub fn issue(&self, operation: Operation, sink: CompletionSink) -> Result<()> {
        let target = operation.target();
        {
            let mut session = self.session();
            if session.link != LinkState::Ready {
                return Err(BandError::NotConnected);
            }
            if session.pending.is_some() {
                error!("{operation:?} issued while another operation is pending");
                return Err(BandError::OperationInFlight);
            }
            session.pending = Some(PendingOperation { target, sink });
        }

        let issued = {
            let mut transport = self.transport();
            match &operation {
                Operation::Read(id) => {
                    debug!("Read {id}");
                    transport.read_characteristic(*id)
                }
                Operation::Write(id, value) => {
                    debug!("Write {id}: TX {}", hex::encode(value));
                    transport.write_characteristic(*id, value)
                }
                Operation::ReadRssi => transport.read_rssi(),
            }
        };

        if let Err(err) = issued {
            warn!("Transport could not start {operation:?}: {err}");
            let pending = self.session().pending.take();
            if let Some(pending) = pending {
                (pending.sink)(Err(err));
            }
        }
        Ok(())
    }

    /// Install a standing notification handler and enable delivery for it.
    pub fn register_notification(&self, id: CharacteristicId, handler: NotifyHandler) -> Result<()> {
        {
            let mut session = self.session();
            if session.link != LinkState::Ready {
                return Err(BandError::NotConnected);
            }
            session.notifications.insert(id, handler);
            debug!("{} notification handlers registered", session.notifications.len());
        }

        let enabled = self.transport().set_notification_enabled(id, true);
        if let Err(err) = &enabled {
            warn!("Could not enable notifications on {id}: {err}");
            self.session().notifications.remove(&id);
        }
        enabled
    }

    pub fn unregister_notification(&self, id: CharacteristicId) -> Result<()> {
        {
            let mut session = self.session();
            if session.link != LinkState::Ready {
                return Err(BandError::NotConnected);
            }
            if !session.notifications.remove(&id) {
                debug!("No notification handler registered for {id}");
            }
        }
        self.transport().set_notification_enabled(id, false)
    }

    /// Route one transport event.
    pub fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::LinkUp => self.on_link_up(),
            TransportEvent::LinkDown => self.on_link_down(),
            TransportEvent::ServicesDiscovered(result) => self.on_services_discovered(result),
            TransportEvent::CharacteristicRead { id, result } => {
                if let Ok(value) = &result {
                    debug!("Read {id}: RX {}", hex::encode(value));
                }
                self.complete(Target::Read(id), result.map(Completion::Value));
            }
            TransportEvent::CharacteristicWrite { id, result } => {
                if let Ok(value) = &result {
                    debug!("Wrote {id}: RX {}", hex::encode(value));
                }
                self.complete(Target::Write(id), result.map(Completion::Value));
            }
            TransportEvent::RssiRead(result) => {
                self.complete(Target::Rssi, result.map(Completion::Rssi));
            }
            TransportEvent::CharacteristicChanged { id, value } => self.on_changed(id, &value),
        }
    }

    fn on_link_up(&self) {
        {
            let mut session = self.session();
            if session.link != LinkState::Connecting {
                warn!("Link up while {:?}, ignoring", session.link);
                return;
            }
            session.link = LinkState::DiscoveringServices;
        }
        info!("Link up, discovering services");

        if let Err(err) = self.transport().discover_services() {
            let failed = self
                .session()
                .fail_connect(BandError::ConnectionFailed(err.to_string()));
            if let Some((waiter, err)) = failed {
                let _ = waiter.send(Err(err));
            }
        }
    }

    fn on_services_discovered(&self, result: std::result::Result<(), TransportFailure>) {
        let waiter = {
            let mut session = self.session();
            if session.link != LinkState::DiscoveringServices {
                warn!("Services discovered while {:?}, ignoring", session.link);
                return;
            }
            match result {
                Ok(()) => {
                    info!("Services discovered, connection ready");
                    session.link = LinkState::Ready;
                    session.connect_waiter.take().map(|waiter| (waiter, Ok(())))
                }
                Err(failure) => {
                    warn!("Service discovery failed: {}", failure.message);
                    let message = format!(
                        "service discovery failed with status {}: {}",
                        failure.code, failure.message
                    );
                    session
                        .fail_connect(BandError::ConnectionFailed(message))
                        .map(|(waiter, err)| (waiter, Err(err)))
                }
            }
        };

        if let Some((waiter, result)) = waiter {
            let _ = waiter.send(result);
        }
    }

    fn on_link_down(&self) {
        let (pending, waiter, listener) = {
            let mut session = self.session();
            info!("Link down while {:?}", session.state());
            session.link = LinkState::Disconnected;
            session.address = None;
            session.notifications.clear();
            (
                session.pending.take(),
                session.connect_waiter.take(),
                session.on_disconnected.clone(),
            )
        };

        self.transport().close();

        if let Some(pending) = pending {
            (pending.sink)(Err(BandError::Disconnected));
        }
        if let Some(waiter) = waiter {
            let _ = waiter.send(Err(BandError::Disconnected));
        }
        if let Some(listener) = listener {
            listener();
        }
    }

    fn complete(&self, target: Target, result: std::result::Result<Completion, TransportFailure>) {
        let pending = {
            let mut session = self.session();
            match session.pending.as_ref().map(|pending| pending.target) {
                Some(pending) if pending == target => session.pending.take(),
                Some(pending) => {
                    warn!("Completion for {target:?} while {pending:?} is pending, dropping");
                    None
                }
                None => {
                    warn!("Completion for {target:?} with nothing pending, dropping");
                    None
                }
            }
        };

        if let Some(pending) = pending {
            (pending.sink)(result.map_err(BandError::from));
        }
    }

    fn on_changed(&self, id: CharacteristicId, value: &[u8]) {
        let handler = self.session().notifications.get(&id);
        match handler {
            Some(handler) => handler(value),
            None => debug!("Notification for unregistered {id} dropped"),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transport(&self) -> MutexGuard<'_, T> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
