//! Individual device control.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::encoder::Target;
use crate::errors::Error;
use crate::message::Message;
use crate::operation::{Call, ColorArgs, Operation, Property};
use crate::response::{DeviceInfo, LightState, Reply};
use crate::router::MessageRouter;
use crate::runtime;
use crate::types::{Mac, PowerLevel};
use crate::wire::{MessageKind, Service};

type Result<T> = std::result::Result<T, Error>;

/// A handle to one device on the network.
///
/// Handles are cheap to clone and compare equal when they address the same
/// socket address. All traffic goes through the shared [`MessageRouter`],
/// whose receive loop must be running for anything that waits on a reply.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use lifx_lan_rs::{ColorArgs, Device, MessageRouter, RouterConfig};
///
/// let router = Arc::new(MessageRouter::bind(RouterConfig::default()).await?);
/// router.set_receiving(true).await?;
/// router.spawn_receiver();
///
/// let lamp = Device::new(router, "192.168.1.40:56700".parse()?);
/// lamp.turn_on().await?;
/// lamp.set_color(&ColorArgs { hue: 200.0, ..ColorArgs::default() }).await?;
/// ```
#[derive(Clone)]
pub struct Device {
    addr: SocketAddr,
    mac: Option<Mac>,
    router: Arc<MessageRouter>,
}

impl Device {
    /// A handle known only by address. Requests are tagged and reach any
    /// device listening there.
    pub fn new(router: Arc<MessageRouter>, addr: SocketAddr) -> Self {
        Device {
            addr,
            mac: None,
            router,
        }
    }

    /// A handle that targets `mac` in every request.
    pub fn with_mac(router: Arc<MessageRouter>, addr: SocketAddr, mac: Mac) -> Self {
        Device {
            addr,
            mac: Some(mac).filter(|mac| !mac.is_broadcast()),
            router,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn mac(&self) -> Option<Mac> {
        self.mac
    }

    fn target(&self) -> Target {
        self.mac.map_or(Target::Broadcast, Target::Device)
    }

    /// Read a property.
    pub async fn get(&self, property: Property) -> Result<Reply> {
        match property {
            Property::Service => {
                let (service, port) = self.service().await?;
                Ok(Reply::Service { service, port })
            }
            Property::Label => self.label().await.map(Reply::Label),
            Property::Power => self.power().await.map(Reply::Power),
            Property::Color => self.color().await.map(Reply::Color),
            Property::Info => self.info().await.map(Reply::Info),
        }
    }

    /// Apply an operation.
    pub async fn perform(&self, operation: &Operation) -> Result<Reply> {
        match operation {
            Operation::SetPower(level) => self.set_power(*level).await.map(Reply::Power),
            Operation::TurnOn => self.turn_on().await.map(Reply::Power),
            Operation::TurnOff => self.turn_off().await.map(Reply::Power),
            Operation::TogglePower => self.toggle_power().await.map(Reply::Power),
            Operation::SetColor(args) => self.set_color(args).await,
        }
    }

    /// Read a property or apply an operation selected by name.
    ///
    /// Fails with [`Error::UnknownOperation`] before anything is sent when
    /// `name` is neither.
    pub async fn call(&self, name: &str, args: &Value) -> Result<Reply> {
        self.dispatch(&Call::parse(name, args)?).await
    }

    pub(crate) async fn dispatch(&self, call: &Call) -> Result<Reply> {
        match call {
            Call::Get(property) => self.get(*property).await,
            Call::Do(operation) => self.perform(operation).await,
        }
    }

    pub async fn service(&self) -> Result<(Service, u32)> {
        match self.query(Message::GetService, MessageKind::StateService).await? {
            Message::StateService { service, port } => Ok((service, port)),
            other => Err(unexpected(MessageKind::StateService, &other)),
        }
    }

    pub async fn label(&self) -> Result<String> {
        match self.query(Message::GetLabel, MessageKind::StateLabel).await? {
            Message::StateLabel { label } => Ok(label),
            other => Err(unexpected(MessageKind::StateLabel, &other)),
        }
    }

    pub async fn power(&self) -> Result<PowerLevel> {
        match self.query(Message::GetPower, MessageKind::StatePower).await? {
            Message::StatePower { level } => Ok(PowerLevel(level)),
            other => Err(unexpected(MessageKind::StatePower, &other)),
        }
    }

    pub async fn color(&self) -> Result<LightState> {
        match self.query(Message::GetColor, MessageKind::LightState).await? {
            Message::LightState {
                color,
                power,
                label,
            } => Ok(LightState {
                color,
                power: PowerLevel(power),
                label,
            }),
            other => Err(unexpected(MessageKind::LightState, &other)),
        }
    }

    /// Label and power, read one after the other.
    pub async fn info(&self) -> Result<DeviceInfo> {
        let label = self.label().await?;
        let power = self.power().await?;
        Ok(DeviceInfo { label, power })
    }

    /// Set the power level and return the level read back afterwards.
    ///
    /// The device is given
    /// [`power_settle_ms`](crate::RouterConfig::power_settle_ms) to apply
    /// the change before it is read back.
    pub async fn set_power(&self, level: PowerLevel) -> Result<PowerLevel> {
        let reply = self
            .send(
                Message::SetPower {
                    level: level.level(),
                },
                true,
                false,
            )
            .await?;
        expect_ack(reply)?;

        runtime::sleep(self.router.config().power_settle()).await;
        self.power().await
    }

    pub async fn turn_on(&self) -> Result<PowerLevel> {
        self.set_power(PowerLevel::ON).await
    }

    pub async fn turn_off(&self) -> Result<PowerLevel> {
        self.set_power(PowerLevel::OFF).await
    }

    pub async fn toggle_power(&self) -> Result<PowerLevel> {
        if self.power().await?.is_on() {
            self.turn_off().await
        } else {
            self.turn_on().await
        }
    }

    /// Change the color.
    ///
    /// Returns [`Reply::Sent`] without waiting unless `args.ack_required`
    /// is set, in which case the acknowledgement is awaited.
    pub async fn set_color(&self, args: &ColorArgs) -> Result<Reply> {
        let message = Message::SetColor {
            color: args.hsbk(),
            duration: args.duration,
        };
        let reply = self.send(message, args.ack_required, false).await?;
        if args.ack_required {
            expect_ack(reply)?;
            Ok(Reply::Acknowledged)
        } else {
            Ok(Reply::Sent)
        }
    }

    async fn send(
        &self,
        message: Message,
        ack_required: bool,
        res_required: bool,
    ) -> Result<Option<Message>> {
        let request = self
            .router
            .request(&message, self.target(), ack_required, res_required);
        let reply = self
            .router
            .send_and_await_response(&request, self.addr)
            .await?;
        Ok(reply.map(|reply| reply.message))
    }

    async fn query(&self, message: Message, expected: MessageKind) -> Result<Message> {
        let reply = self.send(message, false, true).await?;
        reply.ok_or(Error::NoReply { expected })
    }
}

fn unexpected(expected: MessageKind, got: &Message) -> Error {
    debug!("expected {expected}, got {got:?}");
    Error::UnexpectedReply {
        expected,
        got: got.kind(),
    }
}

fn expect_ack(reply: Option<Message>) -> Result<()> {
    let expected = MessageKind::Acknowledgement;
    match reply {
        Some(Message::Acknowledgement) => Ok(()),
        Some(other) => Err(unexpected(expected, &other)),
        None => Err(Error::NoReply { expected }),
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for Device {}

impl Hash for Device {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("addr", &self.addr)
            .field("mac", &self.mac)
            .finish()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mac {
            Some(mac) => write!(f, "{} ({mac})", self.addr),
            None => write!(f, "{}", self.addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDevice, receiving_router};
    use serde_json::json;

    #[tokio::test]
    async fn test_label() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(router, fake.addr());
        tokio::spawn(fake.serve(1, "Desk", 0));

        assert_eq!(device.label().await.unwrap(), "Desk");
    }

    #[tokio::test]
    async fn test_untargeted_requests_are_tagged() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(Arc::clone(&router), fake.addr());

        let probe = tokio::spawn(async move {
            let (request, from) = fake.recv().await;
            fake.reply(from, Message::StatePower { level: 0 }).await;
            request
        });
        device.power().await.unwrap();
        let request = probe.await.unwrap();
        assert!(request.tagged);
        assert!(request.target.is_broadcast());
    }

    #[tokio::test]
    async fn test_targeted_requests() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::with_mac(router, fake.addr(), FakeDevice::MAC);

        let probe = tokio::spawn(async move {
            let (request, from) = fake.recv().await;
            fake.reply(from, Message::StatePower { level: 0 }).await;
            request
        });
        device.power().await.unwrap();
        let request = probe.await.unwrap();
        assert!(!request.tagged);
        assert_eq!(request.target, FakeDevice::MAC);
    }

    #[tokio::test]
    async fn test_info() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(router, fake.addr());
        tokio::spawn(fake.serve(2, "Porch", 65535));

        assert_eq!(
            device.get(Property::Info).await.unwrap(),
            Reply::Info(DeviceInfo {
                label: "Porch".into(),
                power: PowerLevel::ON,
            })
        );
    }

    #[tokio::test]
    async fn test_toggle_power() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(router, fake.addr());
        // GetPower, SetPower, GetPower
        tokio::spawn(fake.serve(3, "Desk", 0));

        assert_eq!(device.toggle_power().await.unwrap(), PowerLevel::ON);
    }

    #[tokio::test]
    async fn test_set_color_fire_and_forget() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(router, fake.addr());

        let args = ColorArgs {
            hue: 120.0,
            ..ColorArgs::default()
        };
        assert_eq!(device.set_color(&args).await.unwrap(), Reply::Sent);

        let (request, _) = fake.recv().await;
        assert!(!request.ack_required && !request.res_required);
        assert_eq!(
            request.message,
            Message::SetColor {
                color: args.hsbk(),
                duration: 0
            }
        );
    }

    #[tokio::test]
    async fn test_set_color_acknowledged() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(router, fake.addr());
        tokio::spawn(fake.serve(1, "Desk", 0));

        let args = ColorArgs {
            ack_required: true,
            ..ColorArgs::default()
        };
        assert_eq!(device.set_color(&args).await.unwrap(), Reply::Acknowledged);
    }

    #[tokio::test]
    async fn test_unexpected_reply() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(router, fake.addr());
        tokio::spawn(async move {
            let (_, from) = fake.recv().await;
            fake.reply(from, Message::StatePower { level: 1 }).await;
        });

        assert_eq!(
            device.label().await.unwrap_err(),
            Error::UnexpectedReply {
                expected: MessageKind::StateLabel,
                got: MessageKind::StatePower,
            }
        );
    }

    #[tokio::test]
    async fn test_call_by_name() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(router, fake.addr());
        // GetLabel, then SetPower and its read-back
        tokio::spawn(fake.serve(3, "Desk", 0));

        assert_eq!(
            device.call("label", &Value::Null).await.unwrap(),
            Reply::Label("Desk".into())
        );
        assert_eq!(
            device.call("set_power", &json!(65535)).await.unwrap(),
            Reply::Power(PowerLevel::ON)
        );
    }

    #[tokio::test]
    async fn test_call_unknown_sends_nothing() {
        let router = receiving_router().await;
        let fake = FakeDevice::bind().await;
        let device = Device::new(router, fake.addr());

        assert!(matches!(
            device.call("blink", &Value::Null).await,
            Err(Error::UnknownOperation(_))
        ));
        assert!(!fake.has_pending_datagram().await);
    }

    #[tokio::test]
    async fn test_equality_by_address() {
        let router = receiving_router().await;
        let addr = "127.0.0.1:56700".parse().unwrap();
        let a = Device::new(Arc::clone(&router), addr);
        let b = Device::with_mac(router, addr, FakeDevice::MAC);
        assert_eq!(a, b);
        assert_eq!(b.to_string(), "127.0.0.1:56700 (d0:73:d5:00:00:01)");
    }
}
