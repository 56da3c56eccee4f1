//! Outgoing command packets

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use skreader_types::SettingDescriptor;

use crate::{
    checksum,
    command::Command,
    constants::{ETX, MAX_PAYLOAD_SIZE, STX},
    error::{Error, Result},
    frame::{self, Frame},
};

/// Command packet sent to the reader
///
/// # Packet Structure
///
/// ```text
/// ┌──────┬─────────┬────────────┬─────────────────────────┬──────┬──────────┐
/// │ STX  │ Command │ Setting ID │ Length + Payload (opt.) │ ETX  │ Checksum │
/// │ 0x02 │ 1 byte  │   1 byte   │   1 byte + N bytes      │ 0x03 │  1 byte  │
/// └──────┴─────────┴────────────┴─────────────────────────┴──────┴──────────┘
/// ```
///
/// The checksum is the XOR of every byte from `STX` through `ETX`.
///
/// # Examples
///
/// ```
/// use skreader_core::Request;
/// use skreader_types::settings;
///
/// let request = Request::read(&settings::FIRMWARE_VERSION);
/// assert_eq!(&request.encode().unwrap()[..], &[0x02, 0x52, 0x22, 0x03, 0x71]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,

    /// Function id of the target setting
    pub setting_id: u8,

    /// Value to write, if any
    pub payload: Option<Bytes>,
}

impl Request {
    /// Create a request without payload
    pub fn new(command: Command, setting_id: u8) -> Self {
        Self {
            command,
            setting_id,
            payload: None,
        }
    }

    /// Read request for a setting
    pub fn read(setting: &SettingDescriptor) -> Self {
        Self::new(Command::Read, setting.id)
    }

    /// Create a request with payload
    pub fn with_payload(command: Command, setting_id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            command,
            setting_id,
            payload: Some(payload.into()),
        }
    }

    /// Encode to wire bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the payload exceeds 255 bytes.
    pub fn encode(&self) -> Result<BytesMut> {
        encode_command(self.command.into(), self.setting_id, self.payload.as_deref())
    }

    /// Encode and split into frames
    pub fn frames(&self) -> Result<Vec<Frame>> {
        Ok(frame::encode_frames(&self.encode()?))
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        let payload = self.payload.as_ref().map_or(0, |payload| 1 + payload.len());
        5 + payload
    }
}

/// Build a command packet from raw parts
///
/// `payload` of `Some(&[])` still emits a zero length byte.
pub fn encode_command(command: u8, setting_id: u8, payload: Option<&[u8]>) -> Result<BytesMut> {
    let payload_len = payload.map_or(0, |payload| 1 + payload.len());
    let mut buf = BytesMut::with_capacity(5 + payload_len);

    buf.put_u8(STX);
    buf.put_u8(command);
    buf.put_u8(setting_id);

    if let Some(payload) = payload {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        buf.put_u8(payload.len() as u8);
        buf.put_slice(payload);
    }

    buf.put_u8(ETX);
    let checksum = checksum::calculate(&buf);
    buf.put_u8(checksum);

    Ok(buf)
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("command", &self.command)
            .field("setting_id", &format!("0x{:02X}", self.setting_id))
            .field("payload", &self.payload.as_ref().map(hex::encode))
            .finish()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Request[{}](setting=0x{:02X}, len={})",
            self.command,
            self.setting_id,
            self.payload.as_ref().map_or(0, |payload| payload.len())
        )
    }
}
