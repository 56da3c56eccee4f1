//! Reply decoding
//!
//! The body of a verified reply is either one ASCII string (firmware version)
//! or a run of segments:
//!
//! ```text
//! ┌─────────────┬────────┬─────────────┐
//! │ Function ID │ Length │   Payload   │ ...repeated to the end of the body
//! │   1 byte    │ 1 byte │ Length bytes│
//! └─────────────┴────────┴─────────────┘
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{trace, warn};

use skreader_types::{
    settings, Body, Catalog, Crc, Function, Payload, PayloadValue, Response, Segment,
    SettingDescriptor,
};

use crate::{
    checksum,
    constants::{ETX, STX},
    packet::Packet,
};

/// Decode a verified packet into a [`Response`]
///
/// `requested` selects the body shape; `catalog` resolves segment ids.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use skreader_core::{response, Packet};
/// use skreader_types::{settings, Catalog};
///
/// let raw = [0x06, 0x02, b'1', b'.', b'0', 0x03, 0x2E];
/// let packet = Packet::verify(BytesMut::from(&raw[..])).unwrap();
///
/// let response = response::decode(&packet, &settings::FIRMWARE_VERSION, Catalog::standard());
/// assert!(response.is_ack());
/// assert_eq!(response.ascii(), Some("1.0"));
/// ```
pub fn decode(packet: &Packet, requested: &SettingDescriptor, catalog: &Catalog) -> Response {
    let status = packet.status();

    let (body, crc) = match (packet.body(), packet.checksum()) {
        (Some(raw), Some(received)) => {
            let crc = Crc {
                raw: received,
                is_good: received == body_checksum(&raw),
            };
            (Some(decode_body(raw, requested, catalog)), Some(crc))
        }
        _ => (None, None),
    };

    trace!(%status, has_body = body.is_some(), "Decoded response");

    Response {
        raw: packet.raw().clone(),
        status,
        body,
        crc,
        repaired: packet.is_repaired(),
    }
}

/// Interpret body bytes for the requested setting
pub fn decode_body(raw: Bytes, requested: &SettingDescriptor, catalog: &Catalog) -> Body {
    if requested.id == settings::FIRMWARE_VERSION.id {
        let ascii = ascii_string(&raw);
        return Body::Ascii { raw, ascii };
    }

    let segments = decode_segments(&raw, catalog);
    Body::Segmented { raw, segments }
}

/// Walk a segmented body
///
/// Segments whose declared length runs past the end of the body keep the
/// bytes that are present; the walk then stops.
pub fn decode_segments(body: &Bytes, catalog: &Catalog) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pointer = 0;

    while pointer < body.len() {
        let id = body[pointer];
        let length = body.get(pointer + 1).copied().unwrap_or(0);

        let declared_end = pointer + 2 + length as usize;
        if declared_end > body.len() {
            warn!(
                id = format!("0x{:02X}", id),
                length,
                available = body.len().saturating_sub(pointer + 2),
                "Truncated segment"
            );
        }

        let start = (pointer + 2).min(body.len());
        let end = declared_end.min(body.len());
        let raw = body.slice(start..end);

        let setting = catalog.get(id);
        let value = match setting {
            None => PayloadValue::Uninterpreted,
            Some(setting) if setting.options.is_none() => PayloadValue::Ascii(ascii_string(&raw)),
            Some(setting) => {
                PayloadValue::Named(raw.first().and_then(|&value| setting.option_name(value)))
            }
        };

        segments.push(Segment {
            function: Function { id, setting },
            payload: Payload { length, raw, value },
        });

        pointer = declared_end;
    }

    segments
}

/// Byte-per-character decode; every byte maps to the code point of equal value
pub fn ascii_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

/// Checksum a body would carry once framed by `STX` and `ETX`
fn body_checksum(body: &[u8]) -> u8 {
    let mut framed = BytesMut::with_capacity(body.len() + 2);
    framed.put_u8(STX);
    framed.put_slice(body);
    framed.put_u8(ETX);
    checksum::calculate(&framed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ACK;
    use pretty_assertions::assert_eq;
    use skreader_types::StatusKind;

    fn verified(status: u8, body: &[u8]) -> Packet {
        let mut raw = vec![status, STX];
        raw.extend_from_slice(body);
        raw.push(ETX);
        raw.push(checksum::calculate(&raw[1..]));
        Packet::verify(BytesMut::from(&raw[..])).unwrap()
    }

    #[test]
    fn test_firmware_version() {
        let packet = verified(ACK, &[0x31, 0x2E, 0x30]);
        let response = decode(&packet, &settings::FIRMWARE_VERSION, Catalog::standard());

        assert_eq!(response.status.kind, StatusKind::Ack);
        assert_eq!(response.ascii(), Some("1.0"));
        assert_eq!(response.body.as_ref().unwrap().raw().as_ref(), &[0x31, 0x2E, 0x30]);
        assert!(response.segments().is_empty());
        assert_eq!(response.crc.map(|crc| crc.is_good), Some(true));
    }

    #[test]
    fn test_segments() {
        let body = [0x4E, 2, b'1', b'2', 0x22, 0, 0x99, 1, b'A'];
        let packet = verified(ACK, &body);
        let response = decode(&packet, &settings::ALL_SETTINGS, Catalog::standard());

        let segments = response.segments();
        assert_eq!(segments.len(), 3);

        assert_eq!(segments[0].function.name(), "SERIAL_NUMBER");
        assert_eq!(segments[0].payload.length, 2);
        assert_eq!(segments[0].payload.ascii(), Some("12"));

        assert_eq!(segments[1].function.name(), "FIRMWARE_VERSION");
        assert_eq!(segments[1].payload.length, 0);
        assert!(segments[1].payload.is_empty());

        assert_eq!(segments[2].function.id, 0x99);
        assert_eq!(segments[2].function.name(), "UNKNOWN");
        assert_eq!(segments[2].payload.value, PayloadValue::Uninterpreted);
        assert_eq!(segments[2].payload.raw.as_ref(), b"A");
    }

    #[test]
    fn test_option_segments() {
        let body = [0x1A, 1, b'1', 0x1D, 1, b'3', 0xAF, 1, 0x00, 0x4C, 1, b'9'];
        let segments = decode_segments(&Bytes::copy_from_slice(&body), Catalog::standard());

        let names: Vec<_> = segments.iter().map(|s| s.payload.name()).collect();
        assert_eq!(
            names,
            vec![
                Some("ENABLED"),
                Some("STRIPE_MOVING_AGAINST_ENCODING"),
                Some("ABSOLUTELY_NOT"),
                None,
            ]
        );
        assert_eq!(segments[3].payload.value, PayloadValue::Named(None));
    }

    #[test]
    fn test_truncated_segment() {
        let body = Bytes::from_static(&[0x4E, 5, b'1', b'2']);
        let segments = decode_segments(&body, Catalog::standard());

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].payload.length, 5);
        assert_eq!(segments[0].payload.ascii(), Some("12"));
    }

    #[test]
    fn test_segment_without_length() {
        let body = Bytes::from_static(&[0x4E, 1, b'1', 0x22]);
        let segments = decode_segments(&body, Catalog::standard());

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].function.id, 0x22);
        assert!(segments[1].payload.is_empty());
    }

    #[test]
    fn test_status_only() {
        let packet = Packet::verify(BytesMut::from(&[0x15][..])).unwrap();
        let response = decode(&packet, &settings::SERIAL_NUMBER, Catalog::standard());

        assert_eq!(response.status.kind, StatusKind::Nak);
        assert!(response.body.is_none());
        assert!(response.crc.is_none());
    }

    #[test]
    fn test_nak_with_body() {
        let packet = verified(0x15, &[]);
        let response = decode(&packet, &settings::SERIAL_NUMBER, Catalog::standard());

        assert!(!response.is_ack());
        assert_eq!(response.segments().len(), 0);
        assert!(response.body.is_some());
    }

    #[test]
    fn test_repaired_packet_reports_crc() {
        // checksum over STX..ETX is 0x00 and gets trimmed as padding
        let raw = [ACK, STX, 0x4E, 0x03, b'1', b'2', b'O', ETX];
        let packet = Packet::verify(BytesMut::from(&raw[..])).unwrap();
        let response = decode(&packet, &settings::SERIAL_NUMBER, Catalog::standard());

        assert!(response.repaired);
        assert_eq!(response.segments()[0].payload.ascii(), Some("12O"));
        assert_eq!(response.crc, Some(Crc { raw: 0x00, is_good: true }));
    }

    #[test]
    fn test_ascii_string_is_byte_per_char() {
        assert_eq!(ascii_string(b"1.0"), "1.0");
        assert_eq!(ascii_string(&[0x41, 0xE9]), "A\u{e9}");
    }

    #[test]
    fn test_custom_catalog_resolution() {
        static ENTRIES: &[SettingDescriptor] = &[settings::MSR_READING];
        let catalog = Catalog::new(ENTRIES);

        let body = Bytes::from_static(&[0x1A, 1, b'0', 0x4E, 1, b'1']);
        let segments = decode_segments(&body, &catalog);

        assert_eq!(segments[0].payload.name(), Some("DISABLED"));
        assert!(!segments[1].function.is_known());
    }
}
