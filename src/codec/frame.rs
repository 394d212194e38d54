//! Text line framing.
//!
//! Wire format, one UTF-8 line per datagram, comma separated:
//!
//! ```text
//! outbound (device -> host):  <unixEpochMs>,<KIND>,<field1>,<field2>,...
//! inbound  (host -> device):  <KIND>,<field1>,...
//! ```
//!
//! There is no escaping; field values never contain the delimiter.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::MalformedFrame;
use crate::core::constants::FIELD_DELIMITER;

use super::MessageKind;

/// Milliseconds since the Unix epoch, as stamped on outbound frames.
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A frame queued for transmission to the host.
///
/// Immutable once built; the sender loop consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundFrame {
    timestamp_ms: i64,
    kind: MessageKind,
    fields: Vec<String>,
}

impl OutboundFrame {
    /// Build a frame stamped with the current wall-clock time.
    pub fn new(kind: MessageKind, fields: Vec<String>) -> Self {
        Self::with_timestamp(unix_millis(), kind, fields)
    }

    /// Build a frame with an explicit timestamp.
    pub fn with_timestamp(timestamp_ms: i64, kind: MessageKind, fields: Vec<String>) -> Self {
        Self {
            timestamp_ms,
            kind,
            fields,
        }
    }

    /// Send-time stamp in Unix milliseconds.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Kind tag.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Field values after the kind tag.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Serialize as `<timestamp>,<KIND>,<fields...>`.
    pub fn to_line(&self) -> String {
        let body = encode(self.kind, &self.fields);
        let mut line = String::with_capacity(body.len() + 16);
        line.push_str(&self.timestamp_ms.to_string());
        line.push(FIELD_DELIMITER);
        line.push_str(&body);
        line
    }
}

/// A decoded frame, timestamp stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    kind: MessageKind,
    fields: Vec<String>,
}

impl InboundFrame {
    /// Build a frame from parts.
    pub fn new(kind: MessageKind, fields: Vec<String>) -> Self {
        Self { kind, fields }
    }

    /// Kind tag.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Field values after the kind tag.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

/// Encode a kind and its fields as `<KIND>,<field1>,...` (no timestamp).
pub fn encode<S: AsRef<str>>(kind: MessageKind, fields: &[S]) -> String {
    let mut line = String::from(kind.wire_name());
    for field in fields {
        line.push(FIELD_DELIMITER);
        line.push_str(field.as_ref());
    }
    line
}

/// Decode one line into a frame.
///
/// Accepts both control lines (`KIND,...`) and stamped telemetry lines
/// (`ts,KIND,...`); a leading timestamp is discarded. Trailing line
/// terminators are ignored. Field count is not checked here.
pub fn decode(line: &str) -> Result<InboundFrame, MalformedFrame> {
    let line = trim_line(line);
    if line.is_empty() {
        return Err(MalformedFrame::Empty);
    }

    let mut parts = line.split(FIELD_DELIMITER);
    let mut head = parts.next().unwrap_or_default();
    if looks_like_timestamp(head) {
        head = parts.next().ok_or(MalformedFrame::Empty)?;
    }

    let kind: MessageKind = head.parse()?;
    Ok(InboundFrame::new(kind, parts.map(str::to_string).collect()))
}

/// Decode a stamped telemetry line, returning its timestamp.
pub fn decode_stamped(line: &str) -> Result<(i64, InboundFrame), MalformedFrame> {
    let line = trim_line(line);
    let (stamp, rest) = line
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| MalformedFrame::InvalidTimestamp(line.to_string()))?;
    let timestamp = stamp
        .parse::<i64>()
        .map_err(|_| MalformedFrame::InvalidTimestamp(stamp.to_string()))?;
    Ok((timestamp, decode(rest)?))
}

/// Decode a raw datagram.
pub fn decode_datagram(datagram: &[u8]) -> Result<InboundFrame, MalformedFrame> {
    let line = std::str::from_utf8(datagram).map_err(|_| MalformedFrame::NotUtf8)?;
    decode(line)
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n', '\0'])
}

fn looks_like_timestamp(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
