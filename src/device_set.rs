//! Groups of devices for batch operations.

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::debug;
use serde_json::Value;

use crate::device::Device;
use crate::errors::Error;
use crate::intent::{HueSource, Intent};
use crate::message::Message;
use crate::operation::{Call, ColorArgs, Operation, Property};
use crate::response::Reply;
use crate::router::MessageRouter;

type Result<T> = std::result::Result<T, Error>;

/// An ordered collection of devices, at most one per address.
///
/// Batch operations run concurrently across devices and return one result
/// per device, in set order. A device that fails does not stop the others.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use lifx_lan_rs::{DeviceSet, Operation};
///
/// let devices = DeviceSet::discover(&router, Duration::from_secs(2)).await?;
/// router.set_receiving(true).await?;
/// router.spawn_receiver();
///
/// for result in devices.all_do(&Operation::TurnOn).await {
///     println!("{result:?}");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeviceSet {
    devices: Vec<Device>,
}

impl DeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover devices and build a set ordered by label, then address.
    ///
    /// Each handle targets the MAC reported in its discovery reply.
    pub async fn discover(router: &Arc<MessageRouter>, timeout: Duration) -> Result<Self> {
        let mut found: Vec<_> = router
            .discover(timeout)
            .await?
            .into_iter()
            .map(|(addr, reply)| {
                let label = match reply.message {
                    Message::StateLabel { label } | Message::LightState { label, .. } => label,
                    _ => String::new(),
                };
                (label, addr, reply.target)
            })
            .collect();
        found.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));

        let mut set = DeviceSet::new();
        for (label, addr, mac) in found {
            debug!("adding {label:?} at {addr}");
            set.insert(Device::with_mac(Arc::clone(router), addr, mac))?;
        }
        Ok(set)
    }

    /// Append a device. Fails if its address is already present.
    pub fn insert(&mut self, device: Device) -> Result<()> {
        if self.devices.contains(&device) {
            return Err(Error::DuplicateDevice(device.addr()));
        }
        self.devices.push(device);
        Ok(())
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Read `property` from every device.
    pub async fn all_get(&self, property: Property) -> Vec<Result<Reply>> {
        join_all(self.devices.iter().map(|device| device.get(property))).await
    }

    /// Apply `operation` to every device.
    pub async fn all_do(&self, operation: &Operation) -> Vec<Result<Reply>> {
        join_all(self.devices.iter().map(|device| device.perform(operation))).await
    }

    /// Read a property or apply an operation on every device, by name.
    ///
    /// The name and arguments are checked once; nothing is sent when they
    /// are invalid.
    pub async fn all_call(&self, name: &str, args: &Value) -> Result<Vec<Result<Reply>>> {
        let call = Call::parse(name, args)?;
        Ok(join_all(self.devices.iter().map(|device| device.dispatch(&call))).await)
    }

    pub async fn apply(&self, intent: &Intent) -> Vec<Result<Reply>> {
        self.all_do(&intent.operation()).await
    }

    /// Send every device the color for the hue `source` currently holds.
    pub async fn follow(
        &self,
        source: &impl HueSource,
        template: &ColorArgs,
    ) -> Vec<Result<Reply>> {
        let intent = Intent::from_target_hue(source.current_hue(), template);
        self.apply(&intent).await
    }

    /// A numbered listing of label and power state, one device per line.
    ///
    /// Devices that do not answer are listed by address.
    pub async fn describe(&self) -> String {
        let infos = self.all_get(Property::Info).await;

        let mut listing = String::new();
        for (i, (device, info)) in self.devices.iter().zip(infos).enumerate() {
            let _ = match info {
                Ok(info) => writeln!(listing, "{}: {info}", i + 1),
                Err(e) => writeln!(listing, "{}: {device} ({e})", i + 1),
            };
        }
        listing
    }
}

impl<'a> IntoIterator for &'a DeviceSet {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
