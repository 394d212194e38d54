//! Error types for the XDTK telemetry link.

use std::net::SocketAddr;

use thiserror::Error;

use crate::codec::MessageKind;

/// A datagram that could not be decoded into a frame.
///
/// Malformed frames are dropped and logged by the receiver; they never stop
/// the transport.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MalformedFrame {
    /// Datagram carried no text.
    #[error("empty frame")]
    Empty,

    /// Datagram was not valid UTF-8.
    #[error("frame is not valid UTF-8")]
    NotUtf8,

    /// First field is not a known message kind.
    #[error("unknown message kind: {0:?}")]
    UnknownKind(String),

    /// A field required by the kind's schema is absent.
    #[error("{kind} frame is missing field {index}")]
    MissingField {
        /// Kind being parsed.
        kind: MessageKind,
        /// Zero-based index of the field after the kind tag.
        index: usize,
    },

    /// A field could not be parsed as the schema's type.
    #[error("{kind} frame has invalid field {index}: {value:?}")]
    InvalidField {
        /// Kind being parsed.
        kind: MessageKind,
        /// Zero-based index of the field after the kind tag.
        index: usize,
        /// Raw field text.
        value: String,
    },

    /// Leading timestamp of a stamped frame is not an integer.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Errors raised while opening or running the duplex transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Local receive port could not be bound.
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        /// Address we tried to bind.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Remote host name did not resolve to an address.
    #[error("could not resolve {host}: {reason}")]
    UnresolvedAddress {
        /// Host as given by the caller.
        host: String,
        /// Resolver message.
        reason: String,
    },

    /// Receiving from the socket failed; the receiver loop has stopped.
    #[error("transport read failure: {0}")]
    ReadFailure(#[source] std::io::Error),
}

/// Errors while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for `SessionConfig`.
    #[cfg(feature = "config")]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config values are out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level XDTK errors.
#[derive(Debug, Error)]
pub enum XdtkError {
    /// Frame decoding error.
    #[error("malformed frame: {0}")]
    Frame(#[from] MalformedFrame),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
