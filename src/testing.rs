//! Loopback fakes for exercising the router without real devices.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::config::RouterConfig;
use crate::decoder::{ParsedMessage, decode};
use crate::encoder::{Encoder, Target};
use crate::message::Message;
use crate::router::MessageRouter;
use crate::types::Mac;

/// A scripted device listening on `127.0.0.1`.
pub(crate) struct FakeDevice {
    socket: UdpSocket,
    encoder: Encoder,
}

impl FakeDevice {
    pub const MAC: Mac = Mac([0xd0, 0x73, 0xd5, 0x00, 0x00, 0x01]);

    pub async fn bind() -> Self {
        FakeDevice {
            socket: UdpSocket::bind("127.0.0.1:0").await.unwrap(),
            encoder: Encoder::new(0x1234),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }

    /// Wait for the next request and decode it.
    pub async fn recv(&self) -> (ParsedMessage, SocketAddr) {
        let mut buffer = [0u8; 1024];
        let (len, from) = self.socket.recv_from(&mut buffer).await.unwrap();
        (decode(&buffer[..len]).unwrap(), from)
    }

    /// Whether another datagram is already queued.
    pub async fn has_pending_datagram(&self) -> bool {
        let mut buffer = [0u8; 1024];
        tokio::time::timeout(Duration::from_millis(1), self.socket.peek_from(&mut buffer))
            .await
            .is_ok()
    }

    pub async fn reply(&self, to: SocketAddr, message: Message) {
        let reply = self
            .encoder
            .encode(&message, Target::Device(Self::MAC), false, false);
        self.send_raw(to, reply.bytes()).await;
    }

    pub async fn send_raw(&self, to: SocketAddr, bytes: &[u8]) {
        self.socket.send_to(bytes, to).await.unwrap();
    }

    /// Answer `count` requests the way a bulb would.
    pub async fn serve(self, count: usize, label: &str, mut power: u16) {
        for _ in 0..count {
            let (request, from) = self.recv().await;
            if request.ack_required {
                self.reply(from, Message::Acknowledgement).await;
            }
            let reply = match request.message {
                Message::GetService => Some(Message::StateService {
                    service: crate::wire::Service::Udp,
                    port: 56700,
                }),
                Message::GetLabel => Some(Message::StateLabel {
                    label: label.to_string(),
                }),
                Message::GetPower => Some(Message::StatePower { level: power }),
                Message::SetPower { level } => {
                    power = level;
                    None
                }
                Message::GetColor => Some(Message::LightState {
                    color: Default::default(),
                    power,
                    label: label.to_string(),
                }),
                _ => None,
            };
            if let Some(reply) = reply {
                self.reply(from, reply).await;
            }
        }
    }
}

/// Router settings for loopback tests.
pub(crate) fn loopback_config() -> RouterConfig {
    RouterConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        power_settle_ms: 0,
        ..RouterConfig::default()
    }
}

pub(crate) async fn loopback_router() -> Arc<MessageRouter> {
    Arc::new(MessageRouter::bind(loopback_config()).await.unwrap())
}

/// Started router with its receive loop running.
pub(crate) async fn receiving_router() -> Arc<MessageRouter> {
    let router = loopback_router().await;
    router.set_receiving(true).await.unwrap();
    router.spawn_receiver();
    router
}

/// An address nothing listens on.
pub(crate) fn unused_addr() -> SocketAddr {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap()
}
