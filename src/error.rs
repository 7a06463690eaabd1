//! # Error Types
//!
//! Error taxonomy for the Amon link using `thiserror`.
//!
//! Frame decoding has its own [`DecodeError`] so a rejected frame always
//! carries the precise reason. Everything that crosses the session boundary
//! is a [`LinkError`].

use thiserror::Error;

/// Reason a candidate byte sequence was rejected by the frame decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes than the smallest possible frame
    #[error("frame too short: {0} bytes")]
    FrameTooShort(usize),

    /// First byte is not the start-of-frame marker
    #[error("bad signature byte: 0x{0:02X}")]
    BadSignature(u8),

    /// Length byte disagrees with the candidate size
    #[error("length mismatch: header declares {declared} bytes, candidate has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// Recomputed CRC disagrees with the transmitted one
    #[error("checksum mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch { expected: u16, received: u16 },

    /// Payload length field disagrees with the frame length
    #[error("payload length mismatch: field says {field}, frame implies {implied}")]
    PayloadLengthMismatch { field: usize, implied: usize },
}

/// Main error type for the Amon link
#[derive(Debug, Error)]
pub enum LinkError {
    /// Serial capability is not present on this host
    #[error("serial transport unavailable on this host")]
    TransportUnavailable,

    /// An exchange was attempted with no open transport
    #[error("Not connected")]
    NotConnected,

    /// Opening the named port failed
    #[error("failed to connect: {0}")]
    ConnectFailed(String),

    /// Payload cannot be addressed by the one-byte length field
    #[error("payload size {0} exceeds maximum 247")]
    PayloadTooLarge(usize),

    /// No complete frame arrived before the deadline
    #[error("Timeout waiting for response")]
    Timeout,

    /// A frame arrived but failed validation
    #[error("Invalid response frame: {0}")]
    InvalidResponse(#[from] DecodeError),

    /// Response opcode differs from the request opcode
    #[error("Unexpected opcode 0x{actual:02X} (expected 0x{expected:02X})")]
    UnexpectedOpcode { expected: u8, actual: u8 },

    /// Response src/dst are not the swapped request addresses
    #[error("Unexpected source/destination 0x{src:02X} -> 0x{dst:02X}")]
    AddressMismatch { src: u8, dst: u8 },

    /// Response lacks the ACK flag bit
    #[error("ACK flag not set")]
    AckMissing,

    /// The transport rejected or failed a write
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Reading from an open port faulted; the link has been torn down
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fieldless discriminant of [`LinkError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TransportUnavailable,
    NotConnected,
    ConnectFailed,
    PayloadTooLarge,
    Timeout,
    FrameTooShort,
    BadSignature,
    LengthMismatch,
    ChecksumMismatch,
    PayloadLengthMismatch,
    UnexpectedOpcode,
    AddressMismatch,
    AckMissing,
    WriteFailed,
    ConnectionLost,
    Config,
    Io,
}

impl DecodeError {
    /// Error kind for this rejection
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::FrameTooShort(_) => ErrorKind::FrameTooShort,
            DecodeError::BadSignature(_) => ErrorKind::BadSignature,
            DecodeError::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            DecodeError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            DecodeError::PayloadLengthMismatch { .. } => ErrorKind::PayloadLengthMismatch,
        }
    }
}

impl LinkError {
    /// Error kind, for branching without matching on message text
    ///
    /// An [`LinkError::InvalidResponse`] reports the kind of the underlying
    /// [`DecodeError`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkError::TransportUnavailable => ErrorKind::TransportUnavailable,
            LinkError::NotConnected => ErrorKind::NotConnected,
            LinkError::ConnectFailed(_) => ErrorKind::ConnectFailed,
            LinkError::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            LinkError::Timeout => ErrorKind::Timeout,
            LinkError::InvalidResponse(e) => e.kind(),
            LinkError::UnexpectedOpcode { .. } => ErrorKind::UnexpectedOpcode,
            LinkError::AddressMismatch { .. } => ErrorKind::AddressMismatch,
            LinkError::AckMissing => ErrorKind::AckMissing,
            LinkError::WriteFailed(_) => ErrorKind::WriteFailed,
            LinkError::ConnectionLost(_) => ErrorKind::ConnectionLost,
            LinkError::Config(_) => ErrorKind::Config,
            LinkError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for the Amon link
pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_response_reports_decode_kind() {
        let err = LinkError::from(DecodeError::ChecksumMismatch {
            expected: 0x1234,
            received: 0x4321,
        });
        assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
        assert!(err.to_string().starts_with("Invalid response frame"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LinkError::NotConnected.to_string(), "Not connected");
        assert_eq!(LinkError::AckMissing.to_string(), "ACK flag not set");
        assert_eq!(
            LinkError::UnexpectedOpcode { expected: 0x11, actual: 0x10 }.to_string(),
            "Unexpected opcode 0x10 (expected 0x11)"
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(LinkError::Timeout.kind(), ErrorKind::Timeout);
        assert_eq!(LinkError::PayloadTooLarge(300).kind(), ErrorKind::PayloadTooLarge);
        assert_eq!(
            LinkError::ConnectionLost("gone".into()).kind(),
            ErrorKind::ConnectionLost
        );
        assert_eq!(DecodeError::BadSignature(0x00).kind(), ErrorKind::BadSignature);
    }
}
