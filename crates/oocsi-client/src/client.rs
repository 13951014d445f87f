use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, info, trace, warn};

use oocsi_transport::{SocketStream, TcpSocket};
use oocsi_wire::{
    send_json_line, subscribe_line, unsubscribe_line, Data, Event, LineReader, LineWriter,
    WireError, KEEPALIVE_ACK, KEEPALIVE_PROBE, MESSAGE_HANDLE, MESSAGE_ID,
};

use crate::calls::CallRegistry;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::router::{route, Routing};
use crate::state::ConnectionState;
use crate::subscriptions::{EventHandler, SubscriptionTable};
use crate::variable::OocsiVariable;

type ErrorHook = Box<dyn Fn(&ClientError) + Send + Sync + 'static>;

/// Handle to one OOCSI connection.
///
/// Cheap to clone; all clones share the same connection, subscription table
/// and call registry. The connection is maintained in the background: a
/// maintenance thread reconnects while the state is `Disconnected`, and a
/// reader thread per live connection dispatches inbound frames. Operations
/// issued while disconnected are dropped silently (fire and forget), never
/// queued.
///
/// # Example
///
/// ```no_run
/// use oocsi_client::{ClientConfig, OocsiClient};
///
/// let client = OocsiClient::connect(ClientConfig::new("localhost:4444"));
/// client.subscribe("testchannel", |event| {
///     println!("{} -> {:?}", event.sender, event.data);
/// });
/// ```
#[derive(Clone)]
pub struct OocsiClient {
    inner: Arc<Inner>,
}

/// Mutable client state, all behind one mutex (single logical thread of
/// control: reader-thread callbacks and public operations interleave here).
struct Shared {
    state: ConnectionState,
    shutdown: bool,
    writer: Option<LineWriter<SocketStream>>,
    subscriptions: SubscriptionTable,
    calls: CallRegistry,
    /// Bumped per connect attempt; reader threads from superseded
    /// connections may not touch state.
    generation: u64,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            shutdown: false,
            writer: None,
            subscriptions: SubscriptionTable::default(),
            calls: CallRegistry::default(),
            generation: 0,
        }
    }
}

pub(crate) struct Inner {
    config: ClientConfig,
    name: String,
    shared: Mutex<Shared>,
    state_changed: Condvar,
    error_hook: Mutex<Option<ErrorHook>>,
}

impl OocsiClient {
    /// Create a client and start connecting in the background.
    ///
    /// Returns immediately; use [`is_connected`](Self::is_connected) to
    /// observe progress. Connect failures are logged and retried on the
    /// reconnect interval, never raised.
    pub fn connect(config: ClientConfig) -> Self {
        let name = config.client_name();
        let inner = Arc::new(Inner {
            name,
            config,
            shared: Mutex::new(Shared::default()),
            state_changed: Condvar::new(),
            error_hook: Mutex::new(None),
        });
        info!(endpoint = %inner.config.endpoint, name = %inner.name, "starting OOCSI client");
        Inner::spawn_maintenance(Arc::clone(&inner));
        Self { inner }
    }

    /// The identity this client joins the messaging space under.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.inner.shared.lock().state
    }

    /// Whether the connection is live.
    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Snapshot of currently subscribed channel names.
    pub fn subscriptions(&self) -> Vec<String> {
        self.inner.shared.lock().subscriptions.channels()
    }

    /// Install the error sink. Transport-level failures are reported here
    /// (and logged); they are never raised to callers.
    pub fn on_error(&self, hook: impl Fn(&ClientError) + Send + Sync + 'static) {
        *self.inner.error_hook.lock() = Some(Box::new(hook));
    }

    /// Send a payload to a channel or client. Fire and forget: no delivery
    /// confirmation, dropped silently while offline.
    pub fn send(&self, recipient: &str, data: Data) {
        self.inner.send_data(recipient, &data);
    }

    /// Issue a call and register a completion for its response.
    ///
    /// The payload is tagged with a fresh correlation id and the target
    /// handle name, then sent as a directed message. `on_complete` fires at
    /// most once, from the dispatch thread, when a response with the same
    /// correlation id arrives before `timeout` elapses. On timeout it is
    /// simply never invoked; callers that must detect silence need their own
    /// deadline.
    pub fn call(
        &self,
        target: &str,
        mut data: Data,
        timeout: Duration,
        on_complete: impl FnOnce(Data) + Send + 'static,
    ) {
        let result = {
            let mut shared = self.inner.await_settled();
            if !shared.state.is_open() {
                debug!(call = target, "offline; dropping call");
                return;
            }
            let id = CallRegistry::correlation_id();
            data.insert(
                MESSAGE_ID.to_string(),
                serde_json::Value::String(id.clone()),
            );
            data.insert(
                MESSAGE_HANDLE.to_string(),
                serde_json::Value::String(target.to_string()),
            );
            match send_json_line(target, &data) {
                Ok(line) => {
                    shared
                        .calls
                        .insert(id.clone(), Instant::now() + timeout, Box::new(on_complete));
                    let sent = Inner::submit(&mut shared, &line);
                    if sent.is_err() {
                        // No response can arrive for a line that never left.
                        shared.calls.discard(&id);
                    }
                    sent
                }
                Err(err) => Err(err.into()),
            }
        };
        if let Err(err) = result {
            warn!(error = %err, call = target, "call failed");
            self.inner.report(&err);
        }
    }

    /// Register a responder for a call handle.
    ///
    /// Inbound call events on `call` are passed to `handler(payload, out
    /// response)`; the response, seeded with the original correlation id, is
    /// sent back to the event's sender.
    pub fn register(&self, call: &str, handler: impl Fn(&Data, &mut Data) + Send + Sync + 'static) {
        let weak = Arc::downgrade(&self.inner);
        let responder: EventHandler = Arc::new(move |event: &Event| {
            let mut response = Data::new();
            if let Some(id) = event.data.get(MESSAGE_ID) {
                response.insert(MESSAGE_ID.to_string(), id.clone());
            }
            handler(&event.data, &mut response);
            if let Some(inner) = weak.upgrade() {
                inner.send_data(&event.sender, &response);
            }
        });
        self.subscribe_handler(call, responder);
    }

    /// Subscribe to a channel. Idempotent per channel: a later subscribe to
    /// the same channel replaces the handler.
    pub fn subscribe(&self, channel: &str, handler: impl Fn(&Event) + Send + Sync + 'static) {
        self.subscribe_handler(channel, Arc::new(handler));
    }

    fn subscribe_handler(&self, channel: &str, handler: EventHandler) {
        let result = {
            let mut shared = self.inner.await_settled();
            if !shared.state.is_open() {
                debug!(channel, "offline; dropping subscribe");
                return;
            }
            shared.subscriptions.insert(channel, handler);
            Inner::submit(&mut shared, &subscribe_line(channel))
        };
        if let Err(err) = result {
            warn!(error = %err, channel, "subscribe failed");
            self.inner.report(&err);
        }
    }

    /// Unsubscribe from a channel. The table entry is deleted, so the
    /// channel is not resubscribed after a later reconnect.
    pub fn unsubscribe(&self, channel: &str) {
        let result = {
            let mut shared = self.inner.await_settled();
            if !shared.state.is_open() {
                debug!(channel, "offline; dropping unsubscribe");
                return;
            }
            shared.subscriptions.remove(channel);
            Inner::submit(&mut shared, &unsubscribe_line(channel))
        };
        if let Err(err) = result {
            warn!(error = %err, channel, "unsubscribe failed");
            self.inner.report(&err);
        }
    }

    /// Bind a reactive variable to one field of one channel's events.
    ///
    /// Local writes publish `{key: value}` to the channel; remote events
    /// carrying `key` update the variable (and echo back out, matching the
    /// original protocol client's behavior).
    pub fn variable(&self, channel: &str, key: &str) -> OocsiVariable {
        let var = OocsiVariable::new(Arc::downgrade(&self.inner), channel, key);
        let mirror = var.clone();
        let key = key.to_string();
        self.subscribe(channel, move |event| {
            if let Some(value) = event.data.get(&key) {
                mirror.set(value.clone());
            }
        });
        var
    }

    /// Close the connection and stop reconnecting.
    pub fn close(&self) {
        let mut shared = self.inner.await_settled();
        if shared.shutdown {
            return;
        }
        shared.shutdown = true;
        shared.state = ConnectionState::Disconnected;
        if let Some(writer) = shared.writer.take() {
            // Unblocks the reader thread parked on this socket.
            let _ = writer.get_ref().shutdown();
        }
        drop(shared);
        self.inner.state_changed.notify_all();
        info!(name = %self.inner.name, "client closed");
    }
}

impl Inner {
    /// Block until the state is settled (not `Connecting`), then return the
    /// guard. No timeout: a connect attempt always settles on its own
    /// because the TCP connect itself is bounded.
    fn await_settled(&self) -> MutexGuard<'_, Shared> {
        let mut shared = self.shared.lock();
        while shared.state.is_connecting() {
            self.state_changed
                .wait_for(&mut shared, self.config.wait_poll_interval);
        }
        shared
    }

    /// Wait-free send used by handlers already running on the dispatch
    /// thread and by public operations after settling.
    pub(crate) fn send_data(self: &Arc<Self>, recipient: &str, data: &Data) {
        let result = {
            let mut shared = self.await_settled();
            if !shared.state.is_open() {
                debug!(recipient, "offline; dropping send");
                return;
            }
            match send_json_line(recipient, data) {
                Ok(line) => Self::submit(&mut shared, &line),
                Err(err) => Err(err.into()),
            }
        };
        if let Err(err) = result {
            warn!(error = %err, recipient, "send failed");
            self.report(&err);
        }
    }

    fn submit(shared: &mut Shared, line: &str) -> Result<(), ClientError> {
        match shared.writer.as_mut() {
            Some(writer) => {
                trace!(line, "outbound line");
                writer.write_line(line).map_err(Into::into)
            }
            None => {
                debug!("no live writer; dropping line");
                Ok(())
            }
        }
    }

    fn report(&self, err: &ClientError) {
        if let Some(hook) = self.error_hook.lock().as_ref() {
            hook(err);
        }
    }

    /// The reconnect timer: ticks on a fixed interval regardless of state;
    /// the tick is a no-op unless the state is `Disconnected`.
    fn spawn_maintenance(inner: Arc<Inner>) {
        thread::spawn(move || loop {
            let should_attempt = {
                let shared = inner.shared.lock();
                if shared.shutdown {
                    break;
                }
                shared.state == ConnectionState::Disconnected
            };
            if should_attempt {
                Inner::attempt_connect(&inner);
                if !inner.config.reconnect {
                    break;
                }
            }
            thread::sleep(inner.config.reconnect_interval);
        });
    }

    fn attempt_connect(inner: &Arc<Inner>) {
        {
            let mut shared = inner.shared.lock();
            if shared.shutdown || shared.state != ConnectionState::Disconnected {
                return;
            }
            shared.state = ConnectionState::Connecting;
            shared.generation += 1;
        }
        debug!(endpoint = %inner.config.endpoint, "connecting");

        let attempt = TcpSocket::connect(&inner.config.endpoint, inner.config.connect_timeout)
            .and_then(|stream| {
                let reader_stream = stream.try_clone()?;
                Ok((stream, reader_stream))
            });

        let (stream, reader_stream) = match attempt {
            Ok(parts) => parts,
            Err(err) => {
                warn!(error = %err, endpoint = %inner.config.endpoint, "connect attempt failed");
                Self::settle_disconnected(inner);
                inner.report(&err.into());
                return;
            }
        };

        let mut writer = LineWriter::new(stream);
        let mut shared = inner.shared.lock();
        if shared.shutdown {
            let _ = writer.get_ref().shutdown();
            shared.state = ConnectionState::Disconnected;
            drop(shared);
            inner.state_changed.notify_all();
            return;
        }
        let generation = shared.generation;

        // Join handshake: the identity line first, then one subscribe line
        // per surviving table entry (the server holds no subscription state
        // across connections). Waiters are released only after the replay,
        // which keeps operations issued during `Connecting` ordered behind
        // the resubscriptions.
        let handshake = writer.write_line(&inner.name).and_then(|()| {
            for channel in shared.subscriptions.channels() {
                writer.write_line(&subscribe_line(&channel))?;
            }
            Ok(())
        });

        match handshake {
            Ok(()) => {
                let replayed = shared.subscriptions.len();
                shared.writer = Some(writer);
                shared.state = ConnectionState::Open;
                drop(shared);
                inner.state_changed.notify_all();
                info!(
                    endpoint = %inner.config.endpoint,
                    name = %inner.name,
                    replayed,
                    "connection open"
                );
                Self::spawn_reader(Arc::clone(inner), reader_stream, generation);
            }
            Err(err) => {
                let _ = writer.get_ref().shutdown();
                shared.state = ConnectionState::Disconnected;
                drop(shared);
                inner.state_changed.notify_all();
                warn!(error = %err, "join handshake failed");
                inner.report(&err.into());
            }
        }
    }

    fn settle_disconnected(inner: &Arc<Inner>) {
        let mut shared = inner.shared.lock();
        shared.state = ConnectionState::Disconnected;
        drop(shared);
        inner.state_changed.notify_all();
    }

    fn spawn_reader(inner: Arc<Inner>, stream: SocketStream, generation: u64) {
        thread::spawn(move || {
            let mut reader = LineReader::new(stream);
            loop {
                match reader.read_line() {
                    Ok(line) => Inner::handle_line(&inner, &line, generation),
                    Err(err) => {
                        let (stale, shutdown) = {
                            let mut shared = inner.shared.lock();
                            let stale = shared.generation != generation;
                            if !stale {
                                shared.writer = None;
                                shared.state = ConnectionState::Disconnected;
                            }
                            (stale, shared.shutdown)
                        };
                        if !stale {
                            inner.state_changed.notify_all();
                            if shutdown {
                                debug!("reader exiting after close");
                            } else if matches!(err, WireError::ConnectionClosed) {
                                info!("connection closed by server");
                            } else {
                                warn!(error = %err, "connection lost");
                                inner.report(&err.into());
                            }
                        }
                        break;
                    }
                }
            }
        });
    }

    /// Dispatch one inbound frame. Runs on the reader thread; handlers run
    /// to completion before the next frame, with no client lock held.
    fn handle_line(inner: &Arc<Inner>, line: &str, generation: u64) {
        // Keep-alive probe is answered before any parsing; the server drops
        // connections whose probes go unacknowledged.
        if line == KEEPALIVE_PROBE {
            let result = {
                let mut shared = inner.shared.lock();
                if shared.generation != generation {
                    return;
                }
                Self::submit(&mut shared, KEEPALIVE_ACK)
            };
            if let Err(err) = result {
                warn!(error = %err, "keep-alive ack failed");
            }
            return;
        }

        trace!(line, "inbound frame");
        let routing = {
            let mut shared = inner.shared.lock();
            if shared.generation != generation {
                debug!("dropping frame from a superseded connection");
                return;
            }
            let shared = &mut *shared;
            route(
                line,
                Instant::now(),
                &mut shared.calls,
                &shared.subscriptions,
            )
        };

        match routing {
            Routing::CallResponse {
                data,
                on_complete,
                expired,
            } => {
                if expired {
                    debug!("call response arrived after expiry; dropping");
                } else {
                    on_complete(data);
                }
            }
            Routing::Deliver { handler, event } => handler(&event),
            Routing::Unhandled { event } => {
                warn!(sender = %event.sender, recipient = %event.recipient, "no handler for event");
            }
            Routing::ParseFailure { error } => {
                warn!(error = %error, "dropping unparseable frame");
            }
        }
    }
}

impl std::fmt::Debug for OocsiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OocsiClient")
            .field("name", &self.inner.name)
            .field("endpoint", &self.inner.config.endpoint)
            .field("state", &self.inner.shared.lock().state)
            .finish()
    }
}
