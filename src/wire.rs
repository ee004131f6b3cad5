//! Message kinds and protocol constants.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::errors::Error;

/// Size of the frame, frame address and protocol header combined.
pub const HEADER_SIZE: usize = 36;

/// Protocol number carried in every frame.
pub const PROTOCOL: u16 = 1024;

/// UDP port devices listen on, also used for discovery broadcasts.
pub const DEFAULT_PORT: u16 = 56700;

/// Fixed width of label fields.
pub const LABEL_SIZE: usize = 32;

/// Lowest color temperature a `SetColor` may carry.
pub const KELVIN_MIN: u16 = 1500;

/// Highest color temperature a `SetColor` may carry.
pub const KELVIN_MAX: u16 = 9000;

/// Message kinds understood by this client.
///
/// The numeric codes are fixed by the protocol.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::MessageKind;
///
/// assert_eq!(MessageKind::GetLabel.code(), 23);
/// assert_eq!(MessageKind::try_from(107).unwrap(), MessageKind::LightState);
/// assert!(MessageKind::try_from(9999).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[repr(u16)]
pub enum MessageKind {
    GetService = 2,
    StateService = 3,
    GetPower = 20,
    SetPower = 21,
    StatePower = 22,
    GetLabel = 23,
    StateLabel = 25,
    Acknowledgement = 45,
    GetColor = 101,
    SetColor = 102,
    LightState = 107,
}

impl MessageKind {
    /// Numeric code written to the protocol header.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Whether devices send this kind (as opposed to clients).
    pub fn is_reply(self) -> bool {
        matches!(
            self,
            MessageKind::StateService
                | MessageKind::StatePower
                | MessageKind::StateLabel
                | MessageKind::Acknowledgement
                | MessageKind::LightState
        )
    }
}

impl TryFrom<u16> for MessageKind {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        use strum::IntoEnumIterator;

        MessageKind::iter()
            .find(|kind| kind.code() == code)
            .ok_or(Error::UnsupportedMessageKind(code))
    }
}

/// Transport advertised in a `StateService` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Service {
    Udp,
    /// Any value other than UDP, kept verbatim.
    Reserved(u8),
}

impl From<u8> for Service {
    fn from(value: u8) -> Self {
        match value {
            1 => Service::Udp,
            other => Service::Reserved(other),
        }
    }
}

impl From<Service> for u8 {
    fn from(service: Service) -> Self {
        match service {
            Service::Udp => 1,
            Service::Reserved(other) => other,
        }
    }
}
