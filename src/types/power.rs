//! Power levels.

use serde::{Deserialize, Serialize};

/// Power level of a device.
///
/// Devices report 0 when off and 65535 when on; any non-zero level counts
/// as on.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PowerLevel(pub u16);

impl PowerLevel {
    /// Turn the device on
    pub const ON: PowerLevel = PowerLevel(u16::MAX);
    /// Turn the device off
    pub const OFF: PowerLevel = PowerLevel(0);

    pub fn level(&self) -> u16 {
        self.0
    }

    pub fn is_on(&self) -> bool {
        self.0 > 0
    }
}

impl From<u16> for PowerLevel {
    fn from(level: u16) -> Self {
        PowerLevel(level)
    }
}
