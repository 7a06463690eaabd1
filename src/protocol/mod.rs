//! # Amon Protocol Module
//!
//! Implementation of the Amon host/drone link protocol.
//!
//! This module handles:
//! - Frame encoding (signature, length, 6-byte header, payload, CRC)
//! - Frame validation and decoding
//! - CRC-16 (MODBUS) checksum calculation
//! - Address, flag and opcode vocabulary

pub mod constants;
pub mod encoder;
pub mod decoder;
pub mod crc;
