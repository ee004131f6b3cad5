//! The closed set of device properties and operations.
//!
//! Each property and operation has a snake_case name so that callers holding
//! only a string (a command line, a config file) can address them through
//! [`Call::parse`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::Error;
use crate::types::{Hsbk, Kelvin, PowerLevel};

type Result<T> = std::result::Result<T, Error>;

/// A readable device property.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use lifx_lan_rs::Property;
///
/// assert_eq!(Property::from_str("label").unwrap(), Property::Label);
/// assert_eq!(Property::Power.to_string(), "power");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Property {
    /// Transport and port, from `GetService`.
    Service,
    Label,
    Power,
    /// Full light state, from `GetColor`.
    Color,
    /// Label and power together.
    Info,
}

/// Names of the operations in [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum OperationName {
    SetPower,
    TurnOn,
    TurnOff,
    TogglePower,
    SetColor,
}

/// A state-changing device operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    SetPower(PowerLevel),
    TurnOn,
    TurnOff,
    /// On when currently off, off otherwise.
    TogglePower,
    SetColor(ColorArgs),
}

impl Operation {
    pub fn name(&self) -> OperationName {
        match self {
            Operation::SetPower(_) => OperationName::SetPower,
            Operation::TurnOn => OperationName::TurnOn,
            Operation::TurnOff => OperationName::TurnOff,
            Operation::TogglePower => OperationName::TogglePower,
            Operation::SetColor(_) => OperationName::SetColor,
        }
    }

    /// Build an operation from its name and JSON arguments.
    ///
    /// `set_power` takes a level as a bare number or `{"level": n}`, and
    /// defaults to full power. `set_color` takes a [`ColorArgs`] object.
    /// The other operations ignore their arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_lan_rs::{Operation, PowerLevel};
    /// use serde_json::json;
    ///
    /// let op = Operation::from_call("set_power", &json!({"level": 0})).unwrap();
    /// assert_eq!(op, Operation::SetPower(PowerLevel::OFF));
    /// assert!(Operation::from_call("explode", &json!(null)).is_err());
    /// ```
    pub fn from_call(name: &str, args: &Value) -> Result<Self> {
        let name = OperationName::from_str(name)
            .map_err(|_| Error::UnknownOperation(name.to_string()))?;

        let operation = match name {
            OperationName::SetPower => {
                let level = match parse_args::<PowerArgs>(name, args)? {
                    Some(PowerArgs::Level(level)) | Some(PowerArgs::Named { level }) => level,
                    None => u16::MAX,
                };
                Operation::SetPower(PowerLevel(level))
            }
            OperationName::TurnOn => Operation::TurnOn,
            OperationName::TurnOff => Operation::TurnOff,
            OperationName::TogglePower => Operation::TogglePower,
            OperationName::SetColor => {
                Operation::SetColor(parse_args(name, args)?.unwrap_or_default())
            }
        };
        Ok(operation)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PowerArgs {
    Level(u16),
    Named { level: u16 },
}

/// `null` means no arguments were given.
fn parse_args<T: serde::de::DeserializeOwned>(
    name: OperationName,
    args: &Value,
) -> Result<Option<T>> {
    if args.is_null() {
        return Ok(None);
    }
    serde_json::from_value(args.clone())
        .map(Some)
        .map_err(|e| Error::invalid_arguments(&name.to_string(), e))
}

/// Arguments of a color change.
///
/// Hue is in degrees, saturation and brightness are fractions, duration is
/// the transition time in milliseconds. Values out of range are normalized
/// when the color is built.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::ColorArgs;
///
/// let args: ColorArgs = serde_json::from_str(r#"{"hue": 120}"#).unwrap();
/// assert_eq!(args.hue, 120.0);
/// assert_eq!(args.saturation, 1.0);
/// assert_eq!(args.kelvin, 3500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorArgs {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub kelvin: u16,
    pub duration: u32,
    pub ack_required: bool,
}

impl Default for ColorArgs {
    fn default() -> Self {
        ColorArgs {
            hue: 0.0,
            saturation: 1.0,
            brightness: 1.0,
            kelvin: Kelvin::NEUTRAL.kelvin(),
            duration: 0,
            ack_required: false,
        }
    }
}

impl ColorArgs {
    pub fn hsbk(&self) -> Hsbk {
        Hsbk::new(self.hue, self.saturation, self.brightness, self.kelvin)
    }
}

/// A property read or an operation, selected by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(Property),
    Do(Operation),
}

impl Call {
    /// Resolve `name` against the properties first, then the operations.
    pub fn parse(name: &str, args: &Value) -> Result<Self> {
        if let Ok(property) = Property::from_str(name) {
            return Ok(Call::Get(property));
        }
        Operation::from_call(name, args).map(Call::Do)
    }
}
