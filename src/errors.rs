use std::net::SocketAddr;
use std::string::FromUtf8Error;
use std::time::Duration;

use crate::wire::{HEADER_SIZE, MessageKind};

/// All error types that can occur when talking to LIFX devices.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A datagram was too short to hold a protocol header.
    #[error("insufficient data to unpack a header: got {len} bytes, need {HEADER_SIZE}")]
    IncompleteHeader { len: usize },

    /// The header names a message kind outside the supported set.
    #[error("unsupported message kind: {0}")]
    UnsupportedMessageKind(u16),

    /// The payload is shorter than the layout of its message kind.
    #[error("payload of {len} bytes is too short for {kind}")]
    IncompletePayload { kind: MessageKind, len: usize },

    /// A text field of a reply contained invalid UTF-8.
    #[error("utf8 decoding error: {0:?}")]
    Utf8Decode(FromUtf8Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// The router could not bind its socket.
    #[error("failed to bind router socket to {addr}: {err}")]
    Bind { addr: SocketAddr, err: std::io::Error },

    /// An operation or property name outside the supported set.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The arguments given for a named operation could not be parsed.
    #[error("invalid arguments for {operation}: {err}")]
    InvalidArguments {
        operation: String,
        err: serde_json::Error,
    },

    /// A device answered with a message of the wrong kind.
    #[error("expected {expected} reply, got {got}")]
    UnexpectedReply {
        expected: MessageKind,
        got: MessageKind,
    },

    /// A request completed without the reply it asked for.
    #[error("expected {expected} reply, got none")]
    NoReply { expected: MessageKind },

    /// No reply arrived within the configured response timeout.
    #[error("no reply from {addr} within {timeout:?}")]
    ResponseTimeout { addr: SocketAddr, timeout: Duration },

    /// Discovery was attempted while the receive loop owns the socket.
    #[error("discovery cannot run while the receive loop is enabled")]
    ReceiverActive,

    /// A device with this address is already part of the set.
    #[error("device {0} is already in the set")]
    DuplicateDevice(SocketAddr),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new invalid arguments error
    pub fn invalid_arguments(operation: &str, err: serde_json::Error) -> Self {
        Error::InvalidArguments {
            operation: operation.to_string(),
            err,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
