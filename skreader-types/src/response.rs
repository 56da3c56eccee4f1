//! Decoded reader responses

use std::fmt;

use bytes::Bytes;

use crate::settings::SettingDescriptor;

/// Name reported for function ids missing from the catalog
pub const UNKNOWN: &str = "UNKNOWN";

/// Status byte classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Ack,
    Nak,
}

impl StatusKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ack => "ACK",
            Self::Nak => "NAK",
        }
    }
}

/// Leading status byte of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub raw: u8,
    pub kind: StatusKind,
}

impl Status {
    /// Positive acknowledgement; every other value is a NAK
    pub const ACK: u8 = 0x06;

    pub fn from_raw(raw: u8) -> Self {
        let kind = if raw == Self::ACK {
            StatusKind::Ack
        } else {
            StatusKind::Nak
        };
        Self { raw, kind }
    }

    pub fn is_ack(&self) -> bool {
        self.kind == StatusKind::Ack
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), self.raw)
    }
}

/// Trailing checksum as received, and whether it matches the decoded body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc {
    pub raw: u8,
    pub is_good: bool,
}

/// Setting a segment refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Function {
    pub id: u8,
    pub setting: Option<&'static SettingDescriptor>,
}

impl Function {
    /// Catalog name, or `UNKNOWN`
    pub fn name(&self) -> &'static str {
        self.setting.map_or(UNKNOWN, |setting| setting.name)
    }

    pub fn is_known(&self) -> bool {
        self.setting.is_some()
    }
}

/// How a segment payload was interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadValue {
    /// Function id not in the catalog; only the raw bytes are meaningful
    Uninterpreted,

    /// Free-form setting
    Ascii(String),

    /// Enumerated setting; `None` when no option matches the first byte
    Named(Option<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Declared length on the wire
    pub length: u8,
    pub raw: Bytes,
    pub value: PayloadValue,
}

impl Payload {
    pub fn ascii(&self) -> Option<&str> {
        match &self.value {
            PayloadValue::Ascii(ascii) => Some(ascii),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match self.value {
            PayloadValue::Named(name) => name,
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// One `(function id, payload)` pair of a multi-setting reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub function: Function,
    pub payload: Payload,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.function.name(), self.function.id)?;
        match &self.payload.value {
            _ if self.payload.is_empty() => write!(f, ": no payload"),
            PayloadValue::Ascii(ascii) => write!(f, ": {:?}", ascii),
            PayloadValue::Named(Some(name)) => write!(f, ": {}", name),
            _ => write!(f, ": {:02X?}", self.payload.raw.as_ref()),
        }
    }
}

/// Reply body, shaped by the setting that was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Single flat string (firmware version)
    Ascii { raw: Bytes, ascii: String },

    /// Sequence of segments
    Segmented { raw: Bytes, segments: Vec<Segment> },
}

impl Body {
    pub fn raw(&self) -> &Bytes {
        match self {
            Self::Ascii { raw, .. } | Self::Segmented { raw, .. } => raw,
        }
    }

    pub fn ascii(&self) -> Option<&str> {
        match self {
            Self::Ascii { ascii, .. } => Some(ascii),
            Self::Segmented { .. } => None,
        }
    }

    pub fn segments(&self) -> Option<&[Segment]> {
        match self {
            Self::Segmented { segments, .. } => Some(segments),
            Self::Ascii { .. } => None,
        }
    }
}

/// A decoded reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Packet bytes as accepted by the reader
    pub raw: Bytes,
    pub status: Status,

    /// Absent for status-only replies
    pub body: Option<Body>,

    /// Absent for status-only replies
    pub crc: Option<Crc>,

    /// Whether the packet needed the checksum repair
    pub repaired: bool,
}

impl Response {
    pub fn is_ack(&self) -> bool {
        self.status.is_ack()
    }

    pub fn ascii(&self) -> Option<&str> {
        self.body.as_ref().and_then(Body::ascii)
    }

    pub fn segments(&self) -> &[Segment] {
        self.body
            .as_ref()
            .and_then(Body::segments)
            .unwrap_or_default()
    }

    /// First segment for the given function id
    pub fn segment(&self, id: u8) -> Option<&Segment> {
        self.segments().iter().find(|segment| segment.function.id == id)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            None => write!(f, "Response[{}]", self.status),
            Some(Body::Ascii { ascii, .. }) => write!(f, "Response[{}]({:?})", self.status, ascii),
            Some(Body::Segmented { segments, .. }) => {
                write!(f, "Response[{}]({} segments)", self.status, segments.len())
            }
        }
    }
}
