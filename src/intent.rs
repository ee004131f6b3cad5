//! Commands produced by an external controller.
//!
//! A controller (for example one that turns a live input stream into a
//! target hue) publishes the hue it wants through a [`HueSource`]. Reading
//! the source never blocks and never touches the network; the resulting
//! [`Intent`] is what gets sent.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::operation::{ColorArgs, Operation};
use crate::types::{Kelvin, PowerLevel, normalize_hue};

/// Where the current target hue is read from.
///
/// `None` means there is nothing to show.
pub trait HueSource {
    fn current_hue(&self) -> Option<f64>;
}

impl<F> HueSource for F
where
    F: Fn() -> Option<f64>,
{
    fn current_hue(&self) -> Option<f64> {
        self()
    }
}

/// A shared target hue, written by one task and read by others.
///
/// Clones share the same cell.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::{HueSource, TargetHue};
///
/// let target = TargetHue::new();
/// assert_eq!(target.current_hue(), None);
///
/// let writer = target.clone();
/// writer.set(400.0);
/// assert_eq!(target.current_hue(), Some(40.0));
///
/// writer.set(-1.0);
/// assert_eq!(target.current_hue(), None);
/// ```
#[derive(Debug, Clone)]
pub struct TargetHue(Arc<AtomicU64>);

impl Default for TargetHue {
    fn default() -> Self {
        TargetHue(Arc::new(AtomicU64::new(f64::NAN.to_bits())))
    }
}

impl TargetHue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a hue in degrees. A negative or non-finite value clears it.
    pub fn set(&self, hue: f64) {
        self.0.store(hue.to_bits(), Ordering::Release);
    }

    pub fn clear(&self) {
        self.set(f64::NAN);
    }
}

impl HueSource for TargetHue {
    fn current_hue(&self) -> Option<f64> {
        let hue = f64::from_bits(self.0.load(Ordering::Acquire));
        if !hue.is_finite() || hue < 0.0 {
            None
        } else {
            Some(normalize_hue(hue))
        }
    }
}

/// A command for every device in a set.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetColor(ColorArgs),
    SetPower(PowerLevel),
}

impl Intent {
    /// The color to show for `hue`, keeping the other fields of `template`.
    ///
    /// Without a hue the lights go to warm white.
    pub fn from_target_hue(hue: Option<f64>, template: &ColorArgs) -> Self {
        let args = match hue {
            Some(hue) => ColorArgs {
                hue,
                ..template.clone()
            },
            None => ColorArgs {
                saturation: 0.0,
                kelvin: Kelvin::WARM.kelvin(),
                ..template.clone()
            },
        };
        Intent::SetColor(args)
    }

    pub fn operation(&self) -> Operation {
        match self {
            Intent::SetColor(args) => Operation::SetColor(args.clone()),
            Intent::SetPower(level) => Operation::SetPower(*level),
        }
    }
}
