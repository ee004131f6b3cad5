//! Results of device queries and operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Hsbk, PowerLevel};
use crate::wire::Service;

/// What a device returned for a property or operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    /// Sent without asking for an acknowledgement.
    Sent,
    /// The device acknowledged the request.
    Acknowledged,
    Power(PowerLevel),
    Label(String),
    Color(LightState),
    Service { service: Service, port: u32 },
    Info(DeviceInfo),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Sent => write!(f, "sent"),
            Reply::Acknowledged => write!(f, "acknowledged"),
            Reply::Power(level) => write!(f, "power {}", level.level()),
            Reply::Label(label) => write!(f, "{label}"),
            Reply::Color(state) => write!(f, "{state}"),
            Reply::Service { service, port } => write!(f, "{service:?} on port {port}"),
            Reply::Info(info) => write!(f, "{info}"),
        }
    }
}

/// Color, power and label reported together by a light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub color: Hsbk,
    pub power: PowerLevel,
    pub label: String,
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: hue {:.1}, saturation {:.2}, brightness {:.2}, {}K, power {}",
            self.label,
            self.color.hue_degrees(),
            self.color.saturation_fraction(),
            self.color.brightness_fraction(),
            self.color.kelvin,
            self.power.level()
        )
    }
}

/// Label and power level of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub label: String,
    pub power: PowerLevel,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.power.is_on() { "on" } else { "off" };
        write!(f, "{} ({state})", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let info = DeviceInfo {
            label: "Desk".into(),
            power: PowerLevel::OFF,
        };
        assert_eq!(Reply::Info(info).to_string(), "Desk (off)");
        assert_eq!(Reply::Power(PowerLevel::ON).to_string(), "power 65535");
    }

    #[test]
    fn test_light_state_display() {
        let state = LightState {
            color: Hsbk::new(180.0, 1.0, 0.5, 4000),
            power: PowerLevel::ON,
            label: "Lamp".into(),
        };
        assert_eq!(
            state.to_string(),
            "Lamp: hue 180.0, saturation 1.00, brightness 0.50, 4000K, power 65535"
        );
    }
}
