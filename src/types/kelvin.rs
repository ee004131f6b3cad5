//! Color temperature control.

use serde::{Deserialize, Serialize};

use crate::wire::{KELVIN_MAX, KELVIN_MIN};

/// Color temperature in Kelvin, kept within 1500K to 9000K.
///
/// Lower values produce warmer (more yellow/orange) light, while higher
/// values produce cooler (more blue) light. Typical values:
/// - 2700K: Warm white (incandescent-like)
/// - 3500K: Neutral white
/// - 6500K: Daylight
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

impl Default for Kelvin {
    fn default() -> Self {
        Kelvin::NEUTRAL
    }
}

impl Kelvin {
    /// Neutral white, used when no temperature is given.
    pub const NEUTRAL: Kelvin = Kelvin { kelvin: 3500 };

    /// Warm white, used when there is no color to show.
    pub const WARM: Kelvin = Kelvin { kelvin: 2700 };

    /// Create a new Kelvin, clamping into the supported range.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_lan_rs::Kelvin;
    ///
    /// assert_eq!(Kelvin::new(500).kelvin(), 1500);
    /// assert_eq!(Kelvin::new(4000).kelvin(), 4000);
    /// assert_eq!(Kelvin::new(20000).kelvin(), 9000);
    /// ```
    pub fn new(kelvin: u16) -> Self {
        Kelvin {
            kelvin: kelvin.clamp(KELVIN_MIN, KELVIN_MAX),
        }
    }

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }
}
