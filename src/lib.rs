//! # Amon Link Library
//!
//! Host-side link protocol engine for an Amon drone and its radio link.
//!
//! This library turns a noisy serial byte stream into checksum-verified
//! frames, frames outgoing requests, and runs the ping and pairing
//! exchanges on top of them.

pub mod config;
pub mod error;
pub mod journal;
pub mod protocol;
pub mod serial;
pub mod session;
