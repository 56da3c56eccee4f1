//! Packet checksum
//!
//! A single byte: the XOR of every byte it covers. Outgoing packets cover
//! `STX` through `ETX` inclusive; replies cover everything between the status
//! byte and the trailing checksum, which is the same span.

use tracing::trace;

/// Calculate the XOR checksum of `data`
///
/// An empty slice yields `0x00`, the XOR identity. The protocol never
/// checksums an empty span.
///
/// # Examples
///
/// ```
/// use skreader_core::checksum;
///
/// // STX, read, FIRMWARE_VERSION, ETX
/// assert_eq!(checksum::calculate(&[0x02, 0x52, 0x22, 0x03]), 0x71);
/// ```
pub fn calculate(data: &[u8]) -> u8 {
    let checksum = data.iter().fold(0u8, |acc, byte| acc ^ byte);
    
    trace!(
        len = data.len(),
        checksum = format!("0x{:02X}", checksum),
        "Calculated checksum"
    );
    
    checksum
}

/// Verify checksum
pub fn verify(data: &[u8], expected: u8) -> bool {
    calculate(data) == expected
}
