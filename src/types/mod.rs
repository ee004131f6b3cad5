//! Value types for device control parameters.

mod fraction;
mod hsbk;
mod kelvin;
mod mac;
mod power;

pub use fraction::Fraction;
pub use hsbk::{Hsbk, hue_to_wire, normalize_hue};
pub use kelvin::Kelvin;
pub use mac::Mac;
pub use power::PowerLevel;
