//! # Amon Frame Decoder
//!
//! Validates candidate byte sequences and extracts [`ParsedFrame`]s.

use super::constants::*;
use super::crc::crc16;
use crate::error::DecodeError;

/// Decode a complete Amon frame
///
/// Checks run in a fixed order and stop at the first failure. The input is
/// only read, never retained.
///
/// # Arguments
///
/// * `frame` - Candidate frame bytes (sig, len, header, payload, crc)
///
/// # Returns
///
/// * `Result<ParsedFrame, DecodeError>` - Decoded frame, or the rejection reason
///
/// # Errors
///
/// - [`DecodeError::FrameTooShort`] if fewer than 10 bytes
/// - [`DecodeError::BadSignature`] if the first byte is not `SIG_SOF`
/// - [`DecodeError::LengthMismatch`] if `len + 2` differs from the candidate size
/// - [`DecodeError::ChecksumMismatch`] if the CRC check fails
/// - [`DecodeError::PayloadLengthMismatch`] if the payload length field disagrees with `len - 8`
pub fn parse_frame(frame: &[u8]) -> Result<ParsedFrame, DecodeError> {
    if frame.len() < MIN_FRAME_SIZE {
        return Err(DecodeError::FrameTooShort(frame.len()));
    }

    if frame[0] != SIG_SOF {
        return Err(DecodeError::BadSignature(frame[0]));
    }

    let length = frame[1] as usize;
    if PREFIX_SIZE + length != frame.len() {
        return Err(DecodeError::LengthMismatch {
            declared: PREFIX_SIZE + length,
            actual: frame.len(),
        });
    }

    let crc_start = frame.len() - CRC_SIZE;
    let received = u16::from_le_bytes([frame[crc_start], frame[crc_start + 1]]);
    let expected = crc16(&frame[1..crc_start]);
    if received != expected {
        return Err(DecodeError::ChecksumMismatch { expected, received });
    }

    let header = &frame[PREFIX_SIZE..PREFIX_SIZE + HEADER_SIZE];
    let payload_len = header[5] as usize;
    // length >= 8 holds here since the frame is at least MIN_FRAME_SIZE
    let implied = length - HEADER_SIZE - CRC_SIZE;
    if payload_len != implied {
        return Err(DecodeError::PayloadLengthMismatch {
            field: payload_len,
            implied,
        });
    }

    let payload_start = PREFIX_SIZE + HEADER_SIZE;
    Ok(ParsedFrame {
        version: header[0],
        flags: header[1],
        src: header[2],
        dst: header[3],
        opcode: header[4],
        payload: frame[payload_start..payload_start + payload_len].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encoder::build_frame;

    /// Re-seal a hand-edited frame with a fresh CRC
    fn reseal(frame: &mut [u8]) {
        let end = frame.len() - CRC_SIZE;
        let crc = crc16(&frame[1..end]).to_le_bytes();
        frame[end] = crc[0];
        frame[end + 1] = crc[1];
    }

    #[test]
    fn test_round_trip() {
        let cases: [(u8, u8, u8, u8, u8, Vec<u8>); 5] = [
            (PROTOCOL_VER, FLAG_DATA, ID_PC, ID_DRONE, OPT_PING, vec![]),
            (0x00, 0x00, 0x00, 0x00, 0x00, vec![0x00]),
            (0xFF, FLAG_STREAM, ID_DRONE, ID_BROADCAST, OPT_TELEMETRY, vec![0xAA; 64]),
            (0x7F, FLAG_ERROR, ID_LINK_SW, ID_PC, 0xFF, (0..=246u8).collect()),
            (0x01, FLAG_FRAGMENT, ID_PC, ID_LINK_BOOT, OPT_BL_WRITE, vec![0xFF; MAX_PAYLOAD_SIZE]),
        ];

        for (version, flags, src, dst, opcode, payload) in cases {
            let frame = build_frame(version, flags, src, dst, opcode, &payload).unwrap();
            let parsed = parse_frame(&frame).unwrap();
            assert_eq!(
                parsed,
                ParsedFrame { version, flags, src, dst, opcode, payload }
            );
        }
    }

    #[test]
    fn test_decode_frame_too_short() {
        assert_eq!(parse_frame(&[]), Err(DecodeError::FrameTooShort(0)));
        assert_eq!(
            parse_frame(&[SIG_SOF, 0x08, 0, 0, 0, 0, 0, 0, 0]),
            Err(DecodeError::FrameTooShort(9))
        );
    }

    #[test]
    fn test_decode_bad_signature() {
        let mut frame = build_frame(1, FLAG_DATA, ID_DRONE, ID_PC, OPT_PING, &[]).unwrap();
        frame[0] = 0xC8;
        assert_eq!(parse_frame(&frame), Err(DecodeError::BadSignature(0xC8)));
    }

    #[test]
    fn test_decode_length_mismatch() {
        let mut frame = build_frame(1, FLAG_DATA, ID_DRONE, ID_PC, OPT_PING, &[1, 2]).unwrap();
        frame.push(0x00);
        assert_eq!(
            parse_frame(&frame),
            Err(DecodeError::LengthMismatch { declared: 12, actual: 13 })
        );
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let mut frame = build_frame(1, FLAG_DATA, ID_DRONE, ID_PC, OPT_PING, &[]).unwrap();
        frame[9] ^= 0xFF;
        assert!(matches!(parse_frame(&frame), Err(DecodeError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_decode_payload_length_mismatch() {
        let mut frame = build_frame(1, FLAG_DATA, ID_DRONE, ID_PC, OPT_PING, &[1, 2, 3]).unwrap();
        frame[7] = 2;
        reseal(&mut frame);
        assert_eq!(
            parse_frame(&frame),
            Err(DecodeError::PayloadLengthMismatch { field: 2, implied: 3 })
        );
    }

    #[test]
    fn test_single_bit_flip_is_checksum_mismatch() {
        let frame = build_frame(1, FLAG_DATA, ID_PC, ID_DRONE, OPT_DRONE_SET_PARAMS, b"gain=3").unwrap();
        let crc_start = frame.len() - CRC_SIZE;

        // Every bit of header and payload
        for index in PREFIX_SIZE..crc_start {
            for bit in 0..8 {
                let mut corrupted = frame.clone();
                corrupted[index] ^= 1 << bit;
                assert!(
                    matches!(parse_frame(&corrupted), Err(DecodeError::ChecksumMismatch { .. })),
                    "flip of byte {} bit {} was not caught by the CRC",
                    index,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_check_order_signature_before_length() {
        // Wrong signature and wrong length: signature is reported
        let frame = [0x00u8; 12];
        assert_eq!(parse_frame(&frame), Err(DecodeError::BadSignature(0x00)));
    }

    #[test]
    fn test_decode_does_not_mutate_input() {
        let frame = build_frame(1, FLAG_ACK, ID_DRONE, ID_PC, OPT_PAIR_STATUS, &[9]).unwrap();
        let copy = frame.clone();
        let _ = parse_frame(&frame);
        assert_eq!(frame, copy);
    }
}
