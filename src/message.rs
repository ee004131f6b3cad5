//! Typed message payloads.

use serde::{Deserialize, Serialize};

use crate::types::Hsbk;
use crate::wire::{MessageKind, Service};

/// A protocol message together with its payload fields.
///
/// Every [`MessageKind`] has exactly one variant here, so encoding a
/// `Message` cannot fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Sent to discover devices. Empty payload.
    GetService,

    /// Advertises the transport and port a device listens on.
    StateService { service: Service, port: u32 },

    /// Asks for the power level. Empty payload.
    GetPower,

    SetPower { level: u16 },

    StatePower { level: u16 },

    /// Asks for the device label. Empty payload.
    GetLabel,

    /// Device label, at most 32 bytes of UTF-8 on the wire.
    StateLabel { label: String },

    /// Presence alone signals success. Empty payload.
    Acknowledgement,

    /// Asks for the light state. Empty payload.
    GetColor,

    /// Change the color over `duration` milliseconds.
    SetColor { color: Hsbk, duration: u32 },

    LightState {
        color: Hsbk,
        power: u16,
        label: String,
    },
}

impl Message {
    /// The kind written to the protocol header for this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::GetService => MessageKind::GetService,
            Message::StateService { .. } => MessageKind::StateService,
            Message::GetPower => MessageKind::GetPower,
            Message::SetPower { .. } => MessageKind::SetPower,
            Message::StatePower { .. } => MessageKind::StatePower,
            Message::GetLabel => MessageKind::GetLabel,
            Message::StateLabel { .. } => MessageKind::StateLabel,
            Message::Acknowledgement => MessageKind::Acknowledgement,
            Message::GetColor => MessageKind::GetColor,
            Message::SetColor { .. } => MessageKind::SetColor,
            Message::LightState { .. } => MessageKind::LightState,
        }
    }
}
