//! # CRC-16 Implementation
//!
//! CRC-16 checksum for Amon frames (the MODBUS variant).
//!
//! **Polynomial**: 0xA001 (0x8005 reflected, LSB first)
//! **Initial Value**: 0xFFFF

/// Reflected CRC-16 polynomial
const CRC16_POLY: u16 = 0xA001;

/// Initial register value
const CRC16_INIT: u16 = 0xFFFF;

/// Precomputed CRC16 lookup table for fast calculation
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the frame CRC-16 using the lookup table
///
/// # Arguments
///
/// * `data` - Bytes to checksum (length byte through end of payload)
///
/// # Returns
///
/// * `u16` - Calculated checksum, transmitted little-endian
///
/// # Examples
///
/// ```
/// use amon_link::protocol::crc::crc16;
///
/// assert_eq!(crc16(b"123456789"), 0x4B37);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;

    for &byte in data {
        crc = (crc >> 8) ^ CRC16_TABLE[((crc ^ byte as u16) & 0xFF) as usize];
    }

    crc
}

/// Bit-by-bit CRC-16, used to verify the lookup table
#[cfg(test)]
fn crc16_slow(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;

    for &byte in data {
        crc ^= byte as u16;

        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
