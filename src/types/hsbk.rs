//! Hue, saturation, brightness and kelvin as carried on the wire.

use serde::{Deserialize, Serialize};

use super::{Fraction, Kelvin};

/// A color in the protocol's HSBK representation.
///
/// Each component is stored exactly as it travels on the wire:
/// - Hue: the color angle scaled from `[0, 360)` degrees onto `0..=65535`
/// - Saturation and brightness: fractions scaled onto `0..=65535`
/// - Kelvin: the color temperature, verbatim
///
/// Use [`Hsbk::new`] to build one from degrees and fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsbk {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl Hsbk {
    /// Build a wire color from human units.
    ///
    /// Hue is reduced modulo 360 first, saturation and brightness are
    /// clamped to `[0, 1]` and kelvin to `[1500, 9000]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_lan_rs::Hsbk;
    ///
    /// let color = Hsbk::new(-30.0, -0.5, 1.5, 500);
    /// assert_eq!(color.hue, 60074);
    /// assert_eq!(color.saturation, 0);
    /// assert_eq!(color.brightness, 65535);
    /// assert_eq!(color.kelvin, 1500);
    /// ```
    pub fn new(hue: f64, saturation: f64, brightness: f64, kelvin: u16) -> Self {
        Hsbk {
            hue: hue_to_wire(hue),
            saturation: Fraction::new(saturation).to_wire(),
            brightness: Fraction::new(brightness).to_wire(),
            kelvin: Kelvin::new(kelvin).kelvin(),
        }
    }

    /// Hue in degrees, `[0, 360)`.
    pub fn hue_degrees(&self) -> f64 {
        (f64::from(self.hue) / f64::from(u16::MAX) * 360.0).rem_euclid(360.0)
    }

    pub fn saturation_fraction(&self) -> f64 {
        Fraction::from_wire(self.saturation).value()
    }

    pub fn brightness_fraction(&self) -> f64 {
        Fraction::from_wire(self.brightness).value()
    }
}

/// Reduce `hue` into `[0, 360)` and scale it onto `0..=65535`.
pub fn hue_to_wire(hue: f64) -> u16 {
    let hue = normalize_hue(hue);
    (hue / 360.0 * f64::from(u16::MAX)).round() as u16
}

/// Reduce an arbitrary angle into `[0, 360)`. Non-finite input maps to 0.
pub fn normalize_hue(hue: f64) -> f64 {
    if !hue.is_finite() {
        return 0.0;
    }
    let hue = hue.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if hue >= 360.0 { 0.0 } else { hue }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hue() {
        assert_eq!(normalize_hue(-30.0), 330.0);
        assert_eq!(normalize_hue(720.0), 0.0);
        assert_eq!(normalize_hue(359.5), 359.5);
        assert_eq!(normalize_hue(f64::NAN), 0.0);
        assert!(normalize_hue(-1e-20) < 360.0);
    }

    #[test]
    fn test_negative_hue_matches_positive_equivalent() {
        assert_eq!(hue_to_wire(-30.0), hue_to_wire(330.0));
        assert_eq!(hue_to_wire(-30.0), (330.0_f64 / 360.0 * 65535.0).round() as u16);
    }

    #[test]
    fn test_clamps() {
        let color = Hsbk::new(0.0, -0.5, 1.5, 20000);
        assert_eq!(color.saturation, 0);
        assert_eq!(color.brightness, 65535);
        assert_eq!(color.kelvin, 9000);
    }

    #[test]
    fn test_full_scale_hue_wraps_to_zero() {
        let color = Hsbk {
            hue: u16::MAX,
            ..Hsbk::default()
        };
        assert_eq!(color.hue_degrees(), 0.0);
        assert!(Hsbk { hue: u16::MAX - 1, ..color }.hue_degrees() < 360.0);
    }

    #[test]
    fn test_back_to_human_units() {
        let color = Hsbk::new(180.0, 0.5, 1.0, 3500);
        assert!((color.hue_degrees() - 180.0).abs() < 0.01);
        assert!((color.saturation_fraction() - 0.5).abs() < 0.001);
        assert_eq!(color.brightness_fraction(), 1.0);
    }
}
