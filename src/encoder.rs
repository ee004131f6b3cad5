//! Building outbound datagrams.
//!
//! A datagram is a 36-byte header followed by a kind-specific payload. All
//! integers are little-endian:
//!
//! ```text
//! offset  width  field
//!  0      2      size (header + payload)
//!  2      2      origin:2 | tagged:1 | addressable:1 | protocol:12
//!  4      4      source
//!  8      8      target (6 address bytes, 2 zero bytes)
//! 16      6      reserved
//! 22      1      reserved:6 | ack_required:1 | res_required:1
//! 23      1      sequence
//! 24      8      reserved
//! 32      2      message kind
//! 34      2      reserved
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

use byteorder::{ByteOrder, LittleEndian};

use crate::message::Message;
use crate::types::{Hsbk, Kelvin, Mac};
use crate::wire::{HEADER_SIZE, LABEL_SIZE, MessageKind, PROTOCOL};

const LIGHT_STATE_SIZE: usize = 52;
const SET_COLOR_SIZE: usize = 13;

/// Where a request is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every device. Sets the `tagged` bit and an all-zero target.
    Broadcast,
    /// A single known device.
    Device(Mac),
}

impl Target {
    fn mac(&self) -> Mac {
        match self {
            Target::Broadcast => Mac::BROADCAST,
            Target::Device(mac) => *mac,
        }
    }

    fn tagged(&self) -> bool {
        matches!(self, Target::Broadcast)
    }
}

/// Header fields chosen by the sender.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub target: Target,
    pub source: u32,
    pub sequence: u8,
    pub ack_required: bool,
    pub res_required: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            target: Target::Broadcast,
            source: 0,
            sequence: 0,
            ack_required: false,
            res_required: false,
        }
    }
}

/// Wrapping sequence number source, shared by every request of a router.
#[derive(Debug, Default)]
pub struct SequenceCounter(AtomicU8);

impl SequenceCounter {
    /// The first call to [`SequenceCounter::next`] yields 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value and advances, wrapping after 255.
    pub fn next(&self) -> u8 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// An encoded request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct Request {
    bytes: Vec<u8>,
    kind: MessageKind,
    sequence: u8,
    ack_required: bool,
    res_required: bool,
}

impl Request {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn ack_required(&self) -> bool {
        self.ack_required
    }

    pub fn res_required(&self) -> bool {
        self.res_required
    }

    /// Whether the device is asked to answer at all.
    pub fn expects_reply(&self) -> bool {
        self.ack_required || self.res_required
    }
}

/// Turns messages into requests, allocating a sequence number for each.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::{Encoder, Message, Target};
///
/// let encoder = Encoder::new(2);
/// let request = encoder.encode(&Message::GetLabel, Target::Broadcast, false, true);
/// assert_eq!(request.bytes().len(), 36);
/// assert_eq!(request.sequence(), 0);
/// ```
#[derive(Debug)]
pub struct Encoder {
    source: u32,
    sequence: SequenceCounter,
}

impl Encoder {
    pub fn new(source: u32) -> Self {
        Encoder {
            source,
            sequence: SequenceCounter::new(),
        }
    }

    pub fn source(&self) -> u32 {
        self.source
    }

    pub fn encode(
        &self,
        message: &Message,
        target: Target,
        ack_required: bool,
        res_required: bool,
    ) -> Request {
        let options = BuildOptions {
            target,
            source: self.source,
            sequence: self.sequence.next(),
            ack_required,
            res_required,
        };
        Request {
            bytes: encode_message(&options, message),
            kind: message.kind(),
            sequence: options.sequence,
            ack_required,
            res_required,
        }
    }
}

/// Encode a complete datagram with explicit header fields.
pub fn encode_message(options: &BuildOptions, message: &Message) -> Vec<u8> {
    let payload = encode_payload(message);
    let mut buf = vec![0u8; HEADER_SIZE + payload.len()];

    let size = buf.len() as u16;
    LittleEndian::write_u16(&mut buf[0..2], size);
    LittleEndian::write_u16(&mut buf[2..4], frame_flags(options.target.tagged()));
    LittleEndian::write_u32(&mut buf[4..8], options.source);
    buf[8..14].copy_from_slice(&options.target.mac().0);
    buf[22] = (u8::from(options.ack_required) << 1) | u8::from(options.res_required);
    buf[23] = options.sequence;
    LittleEndian::write_u16(&mut buf[32..34], message.kind().code());
    buf[HEADER_SIZE..].copy_from_slice(&payload);

    buf
}

/// Origin is always 0 and addressable always 1.
fn frame_flags(tagged: bool) -> u16 {
    (u16::from(tagged) << 13) | (1 << 12) | (PROTOCOL & 0x0fff)
}

fn encode_payload(message: &Message) -> Vec<u8> {
    match message {
        Message::GetService
        | Message::GetPower
        | Message::GetLabel
        | Message::Acknowledgement
        | Message::GetColor => Vec::new(),
        Message::SetPower { level } | Message::StatePower { level } => {
            let mut buf = vec![0u8; 2];
            LittleEndian::write_u16(&mut buf, *level);
            buf
        }
        Message::StateService { service, port } => {
            let mut buf = vec![0u8; 5];
            buf[0] = u8::from(*service);
            LittleEndian::write_u32(&mut buf[1..5], *port);
            buf
        }
        Message::StateLabel { label } => encode_label(label).to_vec(),
        Message::SetColor { color, duration } => {
            let color = Hsbk {
                kelvin: Kelvin::new(color.kelvin).kelvin(),
                ..*color
            };
            let mut buf = vec![0u8; SET_COLOR_SIZE];
            write_hsbk(&mut buf[1..9], &color);
            LittleEndian::write_u32(&mut buf[9..13], *duration);
            buf
        }
        Message::LightState {
            color,
            power,
            label,
        } => {
            let mut buf = vec![0u8; LIGHT_STATE_SIZE];
            write_hsbk(&mut buf[0..8], color);
            LittleEndian::write_u16(&mut buf[10..12], *power);
            buf[12..12 + LABEL_SIZE].copy_from_slice(&encode_label(label));
            buf
        }
    }
}

fn write_hsbk(buf: &mut [u8], color: &Hsbk) {
    LittleEndian::write_u16(&mut buf[0..2], color.hue);
    LittleEndian::write_u16(&mut buf[2..4], color.saturation);
    LittleEndian::write_u16(&mut buf[4..6], color.brightness);
    LittleEndian::write_u16(&mut buf[6..8], color.kelvin);
}

/// NUL-padded, truncated to 32 bytes on a character boundary.
fn encode_label(label: &str) -> [u8; LABEL_SIZE] {
    let mut end = label.len().min(LABEL_SIZE);
    while !label.is_char_boundary(end) {
        end -= 1;
    }
    let mut buf = [0u8; LABEL_SIZE];
    buf[..end].copy_from_slice(&label.as_bytes()[..end]);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broadcast(message: &Message) -> Vec<u8> {
        encode_message(&BuildOptions::default(), message)
    }

    #[test]
    fn test_sequence_wraps() {
        let encoder = Encoder::new(2);
        for expected in 0..=255u8 {
            let request = encoder.encode(&Message::GetPower, Target::Broadcast, false, true);
            assert_eq!(request.sequence(), expected);
            assert_eq!(request.bytes()[23], expected);
        }
        let request = encoder.encode(&Message::GetPower, Target::Broadcast, false, true);
        assert_eq!(request.sequence(), 0);
    }

    #[test]
    fn test_tagged_frame_flags() {
        let bytes = broadcast(&Message::GetLabel);
        // origin=0, tagged=1, addressable=1, protocol=1024
        assert_eq!(bytes[2..4], [0x00, 0x34]);
    }

    #[test]
    fn test_targeted_frame() {
        let mac = Mac([0xd0, 0x73, 0xd5, 0x02, 0x97, 0xde]);
        let options = BuildOptions {
            target: Target::Device(mac),
            source: 0x0537_41ca,
            sequence: 7,
            ack_required: true,
            res_required: false,
        };
        let bytes = encode_message(&options, &Message::GetColor);

        assert_eq!(bytes[2..4], [0x00, 0x14]);
        assert_eq!(bytes[4..8], [0xca, 0x41, 0x37, 0x05]);
        assert_eq!(bytes[8..14], mac.0);
        assert_eq!(bytes[14..22], [0; 8]);
        assert_eq!(bytes[22], 0b10);
        assert_eq!(bytes[23], 7);
        assert_eq!(bytes[32..34], [101, 0]);
    }

    #[test]
    fn test_size_field() {
        for message in [
            Message::GetService,
            Message::SetPower { level: 1 },
            Message::StateLabel {
                label: "Desk".into(),
            },
            Message::SetColor {
                color: Hsbk::default(),
                duration: 0,
            },
        ] {
            let bytes = broadcast(&message);
            assert_eq!(usize::from(u16::from_le_bytes([bytes[0], bytes[1]])), bytes.len());
        }
    }

    #[test]
    fn test_set_color_clamping() {
        let message = Message::SetColor {
            color: Hsbk::new(-30.0, -0.5, 1.5, 500),
            duration: 250,
        };
        let bytes = broadcast(&message);
        let payload = &bytes[HEADER_SIZE..];

        assert_eq!(payload[0], 0);
        assert_eq!(LittleEndian::read_u16(&payload[1..3]), hue_to_wire_330());
        assert_eq!(LittleEndian::read_u16(&payload[3..5]), 0);
        assert_eq!(LittleEndian::read_u16(&payload[5..7]), 65535);
        assert_eq!(LittleEndian::read_u16(&payload[7..9]), 1500);
        assert_eq!(LittleEndian::read_u32(&payload[9..13]), 250);

        let hot = Message::SetColor {
            color: Hsbk::new(0.0, 1.0, 1.0, 20000),
            duration: 0,
        };
        assert_eq!(LittleEndian::read_u16(&broadcast(&hot)[43..45]), 9000);
    }

    fn hue_to_wire_330() -> u16 {
        (330.0_f64 / 360.0 * 65535.0).round() as u16
    }

    #[test]
    fn test_unclamped_kelvin_is_clamped_on_the_wire() {
        let message = Message::SetColor {
            color: Hsbk {
                kelvin: 100,
                ..Hsbk::default()
            },
            duration: 0,
        };
        assert_eq!(LittleEndian::read_u16(&broadcast(&message)[43..45]), 1500);
    }

    #[test]
    fn test_build_a_packet() {
        // https://lan.developer.lifx.com/docs/building-a-lifx-packet
        let message = Message::SetColor {
            color: Hsbk {
                hue: 21845,
                saturation: 0xffff,
                brightness: 0xffff,
                kelvin: 3500,
            },
            duration: 1024,
        };

        let bytes = broadcast(&message);
        assert_eq!(
            bytes,
            vec![
                0x31, 0x00, 0x00, 0x34, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x66, 0x00, 0x00, 0x00, 0x00, 0x55, 0x55, 0xFF, 0xFF, 0xFF,
                0xFF, 0xAC, 0x0D, 0x00, 0x04, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn test_label_truncation() {
        let long = format!("a{}", "é".repeat(20));
        let encoded = encode_label(&long);
        // the 16th two-byte character would straddle byte 32
        let kept = format!("a{}", "é".repeat(15));
        assert_eq!(&encoded[..31], kept.as_bytes());
        assert_eq!(encoded[31], 0);

        let short = encode_label("Lamp");
        assert_eq!(&short[..4], b"Lamp");
        assert!(short[4..].iter().all(|b| *b == 0));
    }
}
