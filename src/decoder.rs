//! Parsing inbound datagrams.

use std::io::{Cursor, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::message::Message;
use crate::types::{Hsbk, Mac};
use crate::wire::{HEADER_SIZE, LABEL_SIZE, MessageKind};

type Result<T> = std::result::Result<T, Error>;

/// Every header field of a datagram plus its typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub size: u16,
    pub origin: u8,
    pub tagged: bool,
    pub addressable: bool,
    pub protocol: u16,
    pub source: u32,
    pub target: Mac,
    pub ack_required: bool,
    pub res_required: bool,
    pub sequence: u8,
    pub kind: MessageKind,
    pub message: Message,
}

/// Parse a datagram.
///
/// Reserved fields are ignored. The payload ends at the `size` field when it
/// lies within the datagram, otherwise at the end of the datagram.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::{Error, decode};
///
/// assert!(matches!(decode(&[0u8; 10]), Err(Error::IncompleteHeader { len: 10 })));
/// ```
pub fn decode(bytes: &[u8]) -> Result<ParsedMessage> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::IncompleteHeader { len: bytes.len() });
    }

    let size = LittleEndian::read_u16(&bytes[0..2]);
    let flags = LittleEndian::read_u16(&bytes[2..4]);
    let mut target = [0u8; 6];
    target.copy_from_slice(&bytes[8..14]);
    let kind = MessageKind::try_from(LittleEndian::read_u16(&bytes[32..34]))?;

    let end = usize::from(size).clamp(HEADER_SIZE, bytes.len());
    let message = decode_payload(kind, &bytes[HEADER_SIZE..end])?;

    Ok(ParsedMessage {
        size,
        origin: (flags >> 14) as u8,
        tagged: (flags >> 13) & 1 != 0,
        addressable: (flags >> 12) & 1 != 0,
        protocol: flags & 0x0fff,
        source: LittleEndian::read_u32(&bytes[4..8]),
        target: Mac(target),
        ack_required: (bytes[22] >> 1) & 1 != 0,
        res_required: bytes[22] & 1 != 0,
        sequence: bytes[23],
        kind,
        message,
    })
}

/// Reads fixed-width fields, reporting a short payload for the given kind.
struct PayloadReader<'a> {
    kind: MessageKind,
    len: usize,
    cursor: Cursor<&'a [u8]>,
}

impl<'a> PayloadReader<'a> {
    fn new(kind: MessageKind, payload: &'a [u8]) -> Self {
        PayloadReader {
            kind,
            len: payload.len(),
            cursor: Cursor::new(payload),
        }
    }

    fn short(&self) -> Error {
        Error::IncompletePayload {
            kind: self.kind,
            len: self.len,
        }
    }

    fn u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(|_| self.short())
    }

    fn u16(&mut self) -> Result<u16> {
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.short())
    }

    fn u32(&mut self) -> Result<u32> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| self.short())
    }

    fn hsbk(&mut self) -> Result<Hsbk> {
        Ok(Hsbk {
            hue: self.u16()?,
            saturation: self.u16()?,
            brightness: self.u16()?,
            kelvin: self.u16()?,
        })
    }

    fn label(&mut self) -> Result<String> {
        let mut raw = [0u8; LABEL_SIZE];
        self.cursor.read_exact(&mut raw).map_err(|_| self.short())?;
        decode_label(&raw)
    }
}

fn decode_payload(kind: MessageKind, payload: &[u8]) -> Result<Message> {
    let mut reader = PayloadReader::new(kind, payload);

    let message = match kind {
        MessageKind::GetService => Message::GetService,
        MessageKind::StateService => Message::StateService {
            service: reader.u8()?.into(),
            port: reader.u32()?,
        },
        MessageKind::GetPower => Message::GetPower,
        MessageKind::SetPower => Message::SetPower {
            level: reader.u16()?,
        },
        MessageKind::StatePower => Message::StatePower {
            level: reader.u16()?,
        },
        MessageKind::GetLabel => Message::GetLabel,
        MessageKind::StateLabel => Message::StateLabel {
            label: reader.label()?,
        },
        MessageKind::Acknowledgement => Message::Acknowledgement,
        MessageKind::GetColor => Message::GetColor,
        MessageKind::SetColor => {
            let _reserved = reader.u8()?;
            Message::SetColor {
                color: reader.hsbk()?,
                duration: reader.u32()?,
            }
        }
        MessageKind::LightState => {
            let color = reader.hsbk()?;
            let _reserved = reader.u16()?;
            Message::LightState {
                color,
                power: reader.u16()?,
                label: reader.label()?,
            }
        }
    };

    Ok(message)
}

/// UTF-8 with trailing NUL padding removed.
fn decode_label(raw: &[u8]) -> Result<String> {
    let end = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8(raw[..end].to_vec()).map_err(Error::Utf8Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{BuildOptions, Target, encode_message};
    use crate::wire::Service;

    #[test]
    fn test_incomplete_header() {
        assert_eq!(
            decode(&[0u8; 10]).unwrap_err(),
            Error::IncompleteHeader { len: 10 }
        );
    }

    #[test]
    fn test_unsupported_kind() {
        let mut bytes = [0u8; 40];
        bytes[0] = 40;
        LittleEndian::write_u16(&mut bytes[32..34], 9999);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            Error::UnsupportedMessageKind(9999)
        );
    }

    #[test]
    fn test_incomplete_payload() {
        let mut bytes = encode_message(
            &BuildOptions::default(),
            &Message::StatePower { level: 65535 },
        );
        bytes.truncate(HEADER_SIZE + 1);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            Error::IncompletePayload {
                kind: MessageKind::StatePower,
                len: 1
            }
        );
    }

    #[test]
    fn test_round_trip_every_kind() {
        let color = Hsbk {
            hue: 1,
            saturation: 2,
            brightness: 3,
            kelvin: 4000,
        };
        let messages = [
            Message::GetService,
            Message::StateService {
                service: Service::Udp,
                port: 56700,
            },
            Message::GetPower,
            Message::SetPower { level: 65535 },
            Message::StatePower { level: 0 },
            Message::GetLabel,
            Message::StateLabel {
                label: "Living Room".into(),
            },
            Message::Acknowledgement,
            Message::GetColor,
            Message::SetColor {
                color,
                duration: 1000,
            },
            Message::LightState {
                color,
                power: 65535,
                label: "Kitchen".into(),
            },
        ];

        let options = BuildOptions {
            target: Target::Device(Mac([1, 2, 3, 4, 5, 6])),
            source: 42,
            sequence: 200,
            ack_required: true,
            res_required: true,
        };
        for message in messages {
            let parsed = decode(&encode_message(&options, &message)).unwrap();
            assert_eq!(parsed.kind, message.kind());
            assert_eq!(parsed.message, message);
            assert_eq!(parsed.source, 42);
            assert_eq!(parsed.sequence, 200);
            assert_eq!(parsed.target, Mac([1, 2, 3, 4, 5, 6]));
            assert!(parsed.ack_required && parsed.res_required);
            assert!(!parsed.tagged && parsed.addressable);
            assert_eq!(parsed.protocol, 1024);
        }
    }

    #[test]
    fn test_decode_device_light_state() {
        // captured from a real bulb
        let v = vec![
            0x58, 0x00, 0x00, 0x54, 0xca, 0x41, 0x37, 0x05, 0xd0, 0x73, 0xd5, 0x02, 0x97, 0xde,
            0x00, 0x00, 0x4c, 0x49, 0x46, 0x58, 0x56, 0x32, 0x00, 0xc0, 0x44, 0x30, 0xeb, 0x47,
            0xc4, 0x48, 0x18, 0x14, 0x6b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff,
            0xb8, 0x0b, 0x00, 0x00, 0xff, 0xff, 0x4b, 0x69, 0x74, 0x63, 0x68, 0x65, 0x6e, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let parsed = decode(&v).unwrap();
        assert_eq!(parsed.size, 88);
        assert_eq!(parsed.origin, 1);
        assert!(!parsed.tagged);
        assert!(parsed.addressable);
        assert_eq!(parsed.protocol, 1024);
        assert_eq!(parsed.source, 0x0537_41ca);
        assert_eq!(parsed.target.to_string(), "d0:73:d5:02:97:de");
        assert_eq!(parsed.sequence, 0xc0);
        assert_eq!(
            parsed.message,
            Message::LightState {
                color: Hsbk {
                    hue: 0,
                    saturation: 0,
                    brightness: 65535,
                    kelvin: 3000,
                },
                power: 65535,
                label: "Kitchen".into(),
            }
        );
    }

    #[test]
    fn test_label_padding() {
        assert_eq!(decode_label(b"Desk\0\0\0").unwrap(), "Desk");
        assert_eq!(decode_label(&[0u8; 32]).unwrap(), "");
        assert!(decode_label(&[0xff, 0xfe, 0]).is_err());
    }
}
