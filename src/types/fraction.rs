//! Fractions scaled onto the 16-bit wire range.

use serde::{Deserialize, Serialize};

/// A value in `[0, 1]`, used for saturation and brightness.
///
/// Out-of-range input is clamped rather than rejected, so building a color
/// never fails.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Fraction {
    pub(crate) value: f64,
}

impl Default for Fraction {
    fn default() -> Self {
        Fraction::FULL
    }
}

impl Fraction {
    pub const ZERO: Fraction = Fraction { value: 0.0 };
    pub const FULL: Fraction = Fraction { value: 1.0 };

    /// Create a new Fraction, clamping into `[0, 1]`. NaN becomes zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_lan_rs::Fraction;
    ///
    /// assert_eq!(Fraction::new(-0.5).value(), 0.0);
    /// assert_eq!(Fraction::new(0.25).value(), 0.25);
    /// assert_eq!(Fraction::new(1.5).value(), 1.0);
    /// ```
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Fraction::ZERO;
        }
        Fraction {
            value: value.clamp(0.0, 1.0),
        }
    }

    /// Get the fraction value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Scale onto `0..=65535`.
    pub fn to_wire(self) -> u16 {
        (self.value * f64::from(u16::MAX)).round() as u16
    }

    /// Inverse of [`Fraction::to_wire`].
    pub fn from_wire(raw: u16) -> Self {
        Fraction {
            value: f64::from(raw) / f64::from(u16::MAX),
        }
    }
}
