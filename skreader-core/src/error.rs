//! Error types for skreader-core

use bytes::Bytes;

/// Result type alias for skreader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Packet is too short to be valid
    #[error("Packet too short: expected at least {expected} bytes, got {actual} bytes")]
    PacketTooShort {
        expected: usize,
        actual: usize,
    },
    
    /// Checksum still wrong after the single repair attempt
    #[error(
        "Packet failed checksum verification: expected 0x{expected:02X}, received 0x{received:02X} (packet: {})",
        hex::encode(.packet)
    )]
    ProtocolIntegrity {
        packet: Bytes,
        expected: u8,
        received: u8,
    },
    
    /// Unknown command opcode
    #[error("Unknown command opcode: 0x{0:02X}")]
    UnknownCommand(u8),
    
    /// Payload does not fit the one-byte length field
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },
    
    /// Packet requested before the terminating empty frame arrived
    #[error("Packet incomplete: {received} bytes received, no terminating frame yet")]
    IncompletePacket {
        received: usize,
    },
    
    /// Assembler used out of order
    #[error("Invalid assembler state: {0}")]
    InvalidAssemblerState(String),
}

impl Error {
    /// Raw packet bytes attached to the error, if any
    pub fn packet(&self) -> Option<&Bytes> {
        match self {
            Self::ProtocolIntegrity { packet, .. } => Some(packet),
            _ => None,
        }
    }
}
