//! # Amon Frame Encoder
//!
//! Serializes logical messages into the Amon wire layout.

use super::constants::*;
use super::crc::crc16;
use crate::error::{LinkError, Result};

/// Encode a complete Amon frame
///
/// # Arguments
///
/// * `version` - Sender protocol version
/// * `flags` - Message kind (`FLAG_DATA`, `FLAG_ACK`, ...)
/// * `src` - Sender address
/// * `dst` - Recipient address
/// * `opcode` - Operation identifier
/// * `payload` - Opcode-specific body (max 247 bytes)
///
/// # Returns
///
/// * `Result<Vec<u8>>` - Frame bytes: sig + len + header + payload + crc_lo + crc_hi
///
/// # Errors
///
/// Returns [`LinkError::PayloadTooLarge`] if the payload exceeds 247 bytes
///
/// # Examples
///
/// ```
/// use amon_link::protocol::constants::*;
/// use amon_link::protocol::encoder::build_frame;
///
/// let frame = build_frame(PROTOCOL_VER, FLAG_DATA, ID_PC, ID_DRONE, OPT_PING, &[]).unwrap();
/// assert_eq!(frame.len(), 10);
/// assert_eq!(&frame[..8], &[0xAA, 0x08, 0x01, 0x05, 0x01, 0x20, 0x01, 0x00]);
/// ```
pub fn build_frame(
    version: u8,
    flags: u8,
    src: u8,
    dst: u8,
    opcode: u8,
    payload: &[u8],
) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(LinkError::PayloadTooLarge(payload.len()));
    }

    let length = u8::try_from(HEADER_SIZE + payload.len() + CRC_SIZE)
        .map_err(|_| LinkError::PayloadTooLarge(payload.len()))?;

    let mut frame = Vec::with_capacity(PREFIX_SIZE + length as usize);
    frame.push(SIG_SOF);
    frame.push(length);
    frame.extend_from_slice(&[version, flags, src, dst, opcode, payload.len() as u8]);
    frame.extend_from_slice(payload);

    // CRC covers length byte through end of payload
    let crc = crc16(&frame[1..]);
    frame.extend_from_slice(&crc.to_le_bytes());

    Ok(frame)
}

/// Encode a host-to-drone data request
///
/// # Errors
///
/// Returns [`LinkError::PayloadTooLarge`] if the payload exceeds 247 bytes
pub fn build_request_frame(version: u8, opcode: u8, payload: &[u8]) -> Result<Vec<u8>> {
    build_frame(version, FLAG_DATA, ID_PC, ID_DRONE, opcode, payload)
}

/// Encode a ping request at the default protocol version
pub fn build_ping_frame() -> Vec<u8> {
    // An empty payload always fits
    let length = (HEADER_SIZE + CRC_SIZE) as u8;
    let mut frame = vec![SIG_SOF, length, PROTOCOL_VER, FLAG_DATA, ID_PC, ID_DRONE, OPT_PING, 0];
    let crc = crc16(&frame[1..]);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame
}
