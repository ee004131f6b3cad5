//! Device hardware addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A 6-byte device address, as carried in the frame address target field.
///
/// All zeroes addresses every device.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use lifx_lan_rs::Mac;
///
/// let mac = Mac::from_str("d0:73:d5:02:97:de").unwrap();
/// assert_eq!(mac.to_string(), "d0:73:d5:02:97:de");
/// assert!(Mac::BROADCAST.is_broadcast());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mac(pub [u8; 6]);

impl Mac {
    pub const BROADCAST: Mac = Mac([0; 6]);

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for Mac {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(format!("expected 6 colon-separated octets, got {}", parts.len()));
        }

        let mut bytes = [0u8; 6];
        for (byte, part) in bytes.iter_mut().zip(parts) {
            *byte = u8::from_str_radix(part, 16).map_err(|e| format!("invalid octet {part:?}: {e}"))?;
        }
        Ok(Mac(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors() {
        assert!(Mac::from_str("d0:73:d5").is_err());
        assert!(Mac::from_str("d0:73:d5:02:97:zz").is_err());
    }
}
