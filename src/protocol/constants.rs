//! # Amon Protocol Constants and Types
//!
//! Wire layout, participant addresses, flag kinds and opcodes.
//!
//! Frame structure:
//!
//! ```text
//! sig(1) | len(1) | ver(1) | flags(1) | src(1) | dst(1) | op(1) | plen(1) | payload(N) | crc_lo | crc_hi
//! ```
//!
//! `len` counts everything after itself: the 6-byte header, the payload and
//! the 2-byte CRC.

/// Start-of-frame signature byte
pub const SIG_SOF: u8 = 0xAA;

/// Protocol version spoken by this host
pub const PROTOCOL_VER: u8 = 0x01;

/// Header size (version, flags, src, dst, opcode, payload length)
pub const HEADER_SIZE: usize = 6;

/// CRC trailer size
pub const CRC_SIZE: usize = 2;

/// Signature + length prefix
pub const PREFIX_SIZE: usize = 2;

/// Largest payload whose frame still fits the one-byte `len` field
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize - HEADER_SIZE - CRC_SIZE;

/// Smallest frame on the wire (empty payload)
pub const MIN_FRAME_SIZE: usize = PREFIX_SIZE + HEADER_SIZE + CRC_SIZE;

/// Largest frame on the wire
pub const MAX_FRAME_SIZE: usize = MIN_FRAME_SIZE + MAX_PAYLOAD_SIZE;

/// Offset of the header inside a UART frame (after signature and length)
pub const HEADER_SHIFT_UART: usize = 2;

/// Offset of the header inside an RF packet (reserved, no RF layout is built)
pub const HEADER_SHIFT_RF: usize = 0;

// Participant addresses
pub const ID_PC: u8 = 0x01;
pub const ID_LINK_BOOT: u8 = 0x10;
pub const ID_LINK_SW: u8 = 0x11;
pub const ID_DRONE: u8 = 0x20;
pub const ID_BROADCAST: u8 = 0xFF;

// Flag kinds. ACK is tested as a bit, so DATA (0x05) carries it too.
pub const FLAG_ACK: u8 = 0x01;
pub const FLAG_ERROR: u8 = 0x02;
pub const FLAG_STREAM: u8 = 0x03;
pub const FLAG_FRAGMENT: u8 = 0x04;
pub const FLAG_DATA: u8 = 0x05;

// Opcodes
pub const OPT_PING: u8 = 0x01;
pub const OPT_PAIR_STATUS: u8 = 0x10;
pub const OPT_PAIR_START: u8 = 0x11;
pub const OPT_LINK_GET_PARAMS: u8 = 0x20;
pub const OPT_LINK_SET_PARAMS: u8 = 0x21;
pub const OPT_DRONE_GET_PARAMS: u8 = 0x30;
pub const OPT_DRONE_SET_PARAMS: u8 = 0x31;
pub const OPT_DRONE_SET_STATE: u8 = 0x32;
pub const OPT_DRONE_COMMAND: u8 = 0x33;
pub const OPT_TELEMETRY: u8 = 0x40;

// Boot-loader command block (reserved)
pub const OPT_BL_INFO: u8 = 0xB0;
pub const OPT_BL_ERASE: u8 = 0xB1;
pub const OPT_BL_WRITE: u8 = 0xB2;
pub const OPT_BL_VERIFY: u8 = 0xB3;
pub const OPT_BL_JUMP: u8 = 0xB4;
pub const OPT_BL_END: u8 = 0xB5;
pub const OPT_BL_ACK: u8 = 0xB6;
pub const OPT_BL_ERR: u8 = 0xB7;

// Telemetry TLV tags (reserved)
pub const TLV_BATTERY: u8 = 0x01;
pub const TLV_RSSI: u8 = 0x02;
pub const TLV_FW_VERSION: u8 = 0x03;
pub const TLV_RF_CHANNEL: u8 = 0x04;
pub const TLV_ADDR_LEN: u8 = 0x05;
pub const TLV_DATA_RATE: u8 = 0x06;
pub const TLV_POWER_LEVEL: u8 = 0x07;
pub const TLV_DRONE_MODE: u8 = 0x08;
pub const TLV_CALIB_TARGET: u8 = 0x09;
pub const TLV_ATTITUDE: u8 = 0x0A;
pub const TLV_IMU: u8 = 0x0B;
pub const TLV_GPS: u8 = 0x0C;
pub const TLV_ERROR: u8 = 0x0D;

/// Human-readable opcode name, used in logs
pub fn opcode_name(opcode: u8) -> &'static str {
    match opcode {
        OPT_PING => "ping",
        OPT_PAIR_STATUS => "pair-status",
        OPT_PAIR_START => "pair-start",
        OPT_LINK_GET_PARAMS => "link-get-params",
        OPT_LINK_SET_PARAMS => "link-set-params",
        OPT_DRONE_GET_PARAMS => "drone-get-params",
        OPT_DRONE_SET_PARAMS => "drone-set-params",
        OPT_DRONE_SET_STATE => "drone-set-state",
        OPT_DRONE_COMMAND => "drone-command",
        OPT_TELEMETRY => "telemetry",
        OPT_BL_INFO..=OPT_BL_ERR => "boot-loader",
        _ => "unknown",
    }
}

/// A frame that passed every decoder check
///
/// Only produced by [`parse_frame`](super::decoder::parse_frame); there is
/// no partially populated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    /// Sender's protocol version
    pub version: u8,

    /// Message kind flags
    pub flags: u8,

    /// Sender address
    pub src: u8,

    /// Recipient address
    pub dst: u8,

    /// Operation identifier
    pub opcode: u8,

    /// Opcode-specific body
    pub payload: Vec<u8>,
}

impl ParsedFrame {
    /// Whether the ACK flag bit is set
    pub fn is_ack(&self) -> bool {
        self.flags & FLAG_ACK != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_constants() {
        assert_eq!(MIN_FRAME_SIZE, 10);
        assert_eq!(MAX_PAYLOAD_SIZE, 247);
        assert_eq!(MAX_FRAME_SIZE, 257);
        assert_eq!(HEADER_SHIFT_UART, PREFIX_SIZE);
    }

    #[test]
    fn test_address_constants() {
        assert_eq!(ID_PC, 0x01);
        assert_eq!(ID_LINK_BOOT, 0x10);
        assert_eq!(ID_LINK_SW, 0x11);
        assert_eq!(ID_DRONE, 0x20);
        assert_eq!(ID_BROADCAST, 0xFF);
    }

    #[test]
    fn test_opcode_constants() {
        assert_eq!(OPT_PING, 0x01);
        assert_eq!(OPT_PAIR_START, 0x11);
        assert_eq!(OPT_PAIR_STATUS, 0x10);
        assert_eq!(OPT_TELEMETRY, 0x40);
        assert_eq!(opcode_name(OPT_BL_JUMP), "boot-loader");
        assert_eq!(opcode_name(0x99), "unknown");
    }

    #[test]
    fn test_ack_bit() {
        let mut frame = ParsedFrame {
            version: PROTOCOL_VER,
            flags: FLAG_DATA,
            src: ID_DRONE,
            dst: ID_PC,
            opcode: OPT_PING,
            payload: Vec::new(),
        };
        // DATA (0x05) has the ACK bit set
        assert!(frame.is_ack());

        frame.flags = FLAG_FRAGMENT;
        assert!(!frame.is_ack());
    }
}
