//! Socket ownership, discovery and reply correlation.
//!
//! Replies are matched to requests by the address they come from, not by
//! sequence number. Requests to one device are therefore serialized: a
//! per-address lock is held from sending a request until its reply has been
//! collected. Requests to different devices proceed independently.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::channel::oneshot;
use log::{debug, error, warn};

use crate::config::RouterConfig;
use crate::decoder::{ParsedMessage, decode};
use crate::encoder::{Encoder, Request, Target};
use crate::errors::Error;
use crate::message::Message;
use crate::runtime::{self, AsyncUdpSocket, Instant, JoinHandle, Mutex, UdpSocket};

type Result<T> = std::result::Result<T, Error>;

/// Replies not yet collected, at most one per address.
#[derive(Default)]
struct PendingResponses {
    slots: HashMap<SocketAddr, ParsedMessage>,
    waiters: HashMap<SocketAddr, oneshot::Sender<()>>,
}

impl PendingResponses {
    fn store(&mut self, addr: SocketAddr, reply: ParsedMessage) {
        if let Some(old) = self.slots.insert(addr, reply) {
            debug!("overwrote unconsumed {} from {addr}", old.kind);
        }
        if let Some(waiter) = self.waiters.remove(&addr) {
            let _ = waiter.send(());
        }
    }

    fn take(&mut self, addr: &SocketAddr) -> Option<ParsedMessage> {
        self.slots.remove(addr)
    }

    fn wait_for(&mut self, addr: SocketAddr) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.waiters.insert(addr, tx);
        rx
    }

    fn forget(&mut self, addr: &SocketAddr) {
        self.waiters.remove(addr);
    }
}

/// Owns the UDP socket shared by every device.
///
/// Create one per process and share it behind an [`Arc`]. The router starts
/// in the not-receiving state; discovery runs in that state, then the
/// receive loop is enabled for request/reply traffic:
///
/// ```ignore
/// use std::sync::Arc;
/// use std::time::Duration;
/// use lifx_lan_rs::{DeviceSet, MessageRouter, Property, RouterConfig};
///
/// let router = Arc::new(MessageRouter::bind(RouterConfig::default()).await?);
/// let devices = DeviceSet::discover(&router, Duration::from_secs(2)).await?;
///
/// router.set_receiving(true).await?;
/// let receiver = router.spawn_receiver();
///
/// let labels = devices.all_get(Property::Label).await;
///
/// router.set_receiving(false).await?;
/// receiver.await;
/// ```
///
/// # Waiting for replies
///
/// A request that asks for an acknowledgement or a response waits until one
/// arrives from the device's address. Without a configured
/// [`response_timeout_ms`](RouterConfig::response_timeout_ms) there is no
/// upper bound on that wait: a device that never answers blocks the caller
/// and every later request to the same device.
pub struct MessageRouter {
    socket: UdpSocket,
    local_addr: SocketAddr,
    config: RouterConfig,
    encoder: Encoder,
    receiving: AtomicBool,
    pending: StdMutex<PendingResponses>,
    round_trips: StdMutex<HashMap<SocketAddr, Arc<Mutex<()>>>>,
    discovery: Mutex<()>,
}

impl MessageRouter {
    /// Bind the router socket.
    ///
    /// Failing to bind is the one fatal error of the router.
    pub async fn bind(config: RouterConfig) -> Result<Self> {
        let socket = UdpSocket::bind(config.bind_addr).await.map_err(|err| {
            error!("failed to bind router socket to {}: {err}", config.bind_addr);
            Error::Bind {
                addr: config.bind_addr,
                err,
            }
        })?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| Error::socket("local_addr", e))?;
        debug!("router bound to {local_addr}");

        Ok(MessageRouter {
            socket,
            local_addr,
            encoder: Encoder::new(config.source),
            config,
            receiving: AtomicBool::new(false),
            pending: StdMutex::new(PendingResponses::default()),
            round_trips: StdMutex::new(HashMap::new()),
            discovery: Mutex::new(()),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Encode `message`, allocating the next sequence number.
    pub fn request(
        &self,
        message: &Message,
        target: Target,
        ack_required: bool,
        res_required: bool,
    ) -> Request {
        self.encoder
            .encode(message, target, ack_required, res_required)
    }

    pub fn is_receiving(&self) -> bool {
        self.receiving.load(Ordering::SeqCst)
    }

    /// Broadcast a `GetLabel` and collect replies until `timeout` elapses.
    ///
    /// Returns every distinct responding address with its decoded reply.
    /// Hearing nothing is not an error. Fails with
    /// [`Error::ReceiverActive`] while the receive loop is enabled, since
    /// both would read from the same socket.
    pub async fn discover(&self, timeout: Duration) -> Result<HashMap<SocketAddr, ParsedMessage>> {
        if self.is_receiving() {
            return Err(Error::ReceiverActive);
        }
        let _discovery = self.discovery.lock().await;

        self.socket
            .set_broadcast(true)
            .map_err(|e| Error::socket("set_broadcast", e))?;
        let request = self.request(&Message::GetLabel, Target::Broadcast, false, true);
        self.send(&request, self.config.broadcast_addr).await?;

        let mut found = HashMap::new();
        let mut buffer = vec![0u8; self.config.receive_buffer];
        let start = Instant::now();

        loop {
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }

            let (len, addr) =
                match runtime::timeout(remaining, self.socket.recv_from(&mut buffer)).await {
                    Ok(Ok(received)) => received,
                    Ok(Err(e)) => {
                        debug!("discovery receive failed: {e}");
                        continue;
                    }
                    Err(_) => break,
                };

            match decode(&buffer[..len]) {
                Ok(reply) if reply.kind.is_reply() => {
                    debug!("discovered {addr} ({})", reply.target);
                    found.insert(addr, reply);
                }
                // our own broadcast, looped back
                Ok(other) => debug!("ignoring {} from {addr} during discovery", other.kind),
                Err(e) => debug!("discarding datagram from {addr}: {e}"),
            }
        }

        debug!("discovery finished with {} device(s)", found.len());
        Ok(found)
    }

    /// Enable or disable the receive loop.
    ///
    /// Disabling sends an empty datagram to the router's own address so that
    /// a receive in progress returns and the loop can observe the change.
    pub async fn set_receiving(&self, receiving: bool) -> Result<()> {
        let was_receiving = self.receiving.swap(receiving, Ordering::SeqCst);
        if was_receiving && !receiving {
            self.socket
                .send_to(&[], self.wake_addr())
                .await
                .map_err(|e| Error::socket("send_to", e))?;
        }
        Ok(())
    }

    /// Receive datagrams until the loop is disabled.
    ///
    /// Each decoded datagram replaces the reply slot of its source address.
    /// Datagrams that fail to decode are dropped. Returns immediately when
    /// the loop has not been enabled with [`MessageRouter::set_receiving`].
    pub async fn start_receiving(&self) {
        let mut buffer = vec![0u8; self.config.receive_buffer];

        while self.is_receiving() {
            let (len, addr) = match self.socket.recv_from(&mut buffer).await {
                Ok(received) => received,
                Err(e) => {
                    warn!("receive failed: {e}");
                    continue;
                }
            };

            if len == 0 {
                continue;
            }

            match decode(&buffer[..len]) {
                Ok(reply) => {
                    debug!("received {} (seq {}) from {addr}", reply.kind, reply.sequence);
                    self.store_response(addr, reply);
                }
                Err(e) => debug!("discarding datagram from {addr}: {e}"),
            }
        }

        debug!("receive loop stopped");
    }

    /// Run [`MessageRouter::start_receiving`] as a background task.
    ///
    /// With the smol runtime, dropping the handle cancels the task.
    pub fn spawn_receiver(self: &Arc<Self>) -> JoinHandle<()> {
        let router = Arc::clone(self);
        runtime::spawn(async move { router.start_receiving().await })
    }

    /// Send `request` to `device` and wait for its reply.
    ///
    /// Requests that need neither an acknowledgement nor a response return
    /// `None` as soon as they are sent. Otherwise the reply is the next
    /// datagram received from `device`; a stale unconsumed reply is
    /// discarded before sending.
    pub async fn send_and_await_response(
        &self,
        request: &Request,
        device: SocketAddr,
    ) -> Result<Option<ParsedMessage>> {
        if !request.expects_reply() {
            self.send(request, device).await?;
            return Ok(None);
        }

        let round_trip = self.round_trip_lock(device);
        let _round_trip = round_trip.lock().await;

        let stale = self.pending().take(&device);
        if let Some(stale) = stale {
            debug!("discarding stale {} from {device}", stale.kind);
        }

        self.send(request, device).await?;

        let reply = match self.config.response_timeout() {
            Some(timeout) => runtime::timeout(timeout, self.wait_for_response(device))
                .await
                .map_err(|_| {
                    self.pending().forget(&device);
                    Error::ResponseTimeout {
                        addr: device,
                        timeout,
                    }
                })?,
            None => self.wait_for_response(device).await,
        };

        Ok(Some(reply))
    }

    pub(crate) fn store_response(&self, addr: SocketAddr, reply: ParsedMessage) {
        self.pending().store(addr, reply);
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending().slots.len()
    }

    async fn send(&self, request: &Request, device: SocketAddr) -> Result<()> {
        debug!(
            "sending {} (seq {}) to {device}",
            request.kind(),
            request.sequence()
        );
        self.socket
            .send_to(request.bytes(), device)
            .await
            .map_err(|e| Error::socket("send_to", e))?;
        Ok(())
    }

    async fn wait_for_response(&self, device: SocketAddr) -> ParsedMessage {
        loop {
            let notified = {
                let mut pending = self.pending();
                if let Some(reply) = pending.take(&device) {
                    return reply;
                }
                pending.wait_for(device)
            };
            // a cancelled notification only means the waiter was replaced
            let _ = notified.await;
        }
    }

    fn pending(&self) -> MutexGuard<'_, PendingResponses> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn round_trip_lock(&self, device: SocketAddr) -> Arc<Mutex<()>> {
        let mut locks = self
            .round_trips
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            locks
                .entry(device)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Where the self-wake datagram goes; an unspecified bind address is
    /// reached through loopback.
    fn wake_addr(&self) -> SocketAddr {
        let ip = match self.local_addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        SocketAddr::new(ip, self.local_addr.port())
    }
}
