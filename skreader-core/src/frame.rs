//! Fixed-size USB frames
//!
//! Packets travel in 8-byte reports. The last frame of a packet is padded
//! with zeros; on read-back the reader signals the end of a packet with a
//! zero-length transfer.

use bytes::{BufMut, BytesMut};

use crate::constants::FRAME_SIZE;

/// One USB report
pub type Frame = [u8; FRAME_SIZE];

/// Split a packet into zero-padded frames
///
/// # Examples
///
/// ```
/// use skreader_core::frame;
///
/// let frames = frame::encode_frames(&[0x02, 0x52, 0x22, 0x03, 0x71]);
/// assert_eq!(frames, vec![[0x02, 0x52, 0x22, 0x03, 0x71, 0, 0, 0]]);
/// assert!(frame::encode_frames(&[]).is_empty());
/// ```
pub fn encode_frames(packet: &[u8]) -> Vec<Frame> {
    packet
        .chunks(FRAME_SIZE)
        .map(|chunk| {
            let mut frame = [0u8; FRAME_SIZE];
            frame[..chunk.len()].copy_from_slice(chunk);
            frame
        })
        .collect()
}

/// Concatenate frames and strip the zero padding
pub fn decode_frames(frames: &[Frame]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(frames.len() * FRAME_SIZE);
    for frame in frames {
        buf.put_slice(frame);
    }
    trim_padding(&mut buf);
    buf
}

/// Remove trailing zero bytes, returning how many were dropped
pub fn trim_padding(buf: &mut BytesMut) -> usize {
    let len = buf.iter().rposition(|&byte| byte != 0).map_or(0, |i| i + 1);
    let trimmed = buf.len() - len;
    buf.truncate(len);
    trimmed
}

/// Whether a transport read marks the end of a packet
///
/// Only a zero-length transfer terminates; an 8-byte frame of zeros is data.
pub fn is_terminator(read: &[u8]) -> bool {
    read.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_encode_exact_multiple() {
        let packet: Vec<u8> = (1..=16).collect();
        let frames = encode_frames(&packet);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(frames[1], [9, 10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_encode_pads_last_frame() {
        let packet: Vec<u8> = (1..=10).collect();
        let frames = encode_frames(&packet);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], [9, 10, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_empty() {
        assert!(encode_frames(&[]).is_empty());
    }

    #[test]
    fn test_trim_padding() {
        let mut buf = BytesMut::from(&[0x06, 0x02, 0x00, 0x03, 0x00, 0x00][..]);

        assert_eq!(trim_padding(&mut buf), 2);
        assert_eq!(&buf[..], &[0x06, 0x02, 0x00, 0x03]);
    }

    #[test]
    fn test_trim_all_zero() {
        let mut buf = BytesMut::from(&[0u8; 8][..]);

        assert_eq!(trim_padding(&mut buf), 8);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_is_terminator() {
        assert!(is_terminator(&[]));
        assert!(!is_terminator(&[0u8; FRAME_SIZE]));
        assert!(!is_terminator(&[0x06]));
    }

    proptest! {
        #[test]
        fn test_frames_round_trip(
            mut packet in proptest::collection::vec(any::<u8>(), 0..64),
            last in 1u8..=255,
        ) {
            packet.push(last);

            let frames = encode_frames(&packet);
            prop_assert_eq!(frames.len(), packet.len().div_ceil(FRAME_SIZE));
            prop_assert_eq!(&decode_frames(&frames)[..], &packet[..]);
        }
    }
}
