//! Transport framer: turns a noisy byte stream into candidate frames.
//!
//! Bytes are accumulated in a `BytesMut` buffer. Anything in front of the
//! start-of-frame signature is dropped, the length byte tells how many
//! bytes make up the candidate, and the candidate is sliced out once it is
//! complete. Candidates are *not* validated here; that is the decoder's job.

use bytes::{Buf, BytesMut};
use std::io;
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, trace};

use super::port_trait::SerialPortIO;
use crate::protocol::constants::{MAX_FRAME_SIZE, PREFIX_SIZE, SIG_SOF};

/// Accumulates bytes and extracts candidate frames
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: BytesMut,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// Append received bytes
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Number of bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Try to slice one candidate frame out of the buffer
    ///
    /// Returns:
    /// - `Some(candidate)` with exactly `2 + length` bytes, removed from the buffer
    /// - `None` if more data is needed
    pub fn try_extract(&mut self) -> Option<Vec<u8>> {
        while self.buffer.len() >= PREFIX_SIZE {
            if self.buffer[0] != SIG_SOF {
                trace!("Dropping noise byte 0x{:02X}", self.buffer[0]);
                self.buffer.advance(1);
                continue;
            }

            let total = PREFIX_SIZE + self.buffer[1] as usize;
            if self.buffer.len() < total {
                return None;
            }

            return Some(self.buffer.split_to(total).to_vec());
        }

        None
    }
}

/// Read one candidate frame from `port` within `deadline`
///
/// Each underlying read waits at most `poll` (or whatever is left of the
/// deadline, if less). Every call starts with an empty buffer; bytes
/// belonging to a partially received frame are discarded when the deadline
/// elapses.
///
/// # Returns
///
/// * `Ok(Some(candidate))` - A complete candidate frame (not yet validated)
/// * `Ok(None)` - The deadline elapsed first
///
/// # Errors
///
/// Returns the port's I/O error for any read fault other than a timeout,
/// would-block or interrupt, and `UnexpectedEof` for a zero-length read
pub async fn read_frame<P>(port: &mut P, deadline: Duration, poll: Duration) -> io::Result<Option<Vec<u8>>>
where
    P: SerialPortIO + ?Sized,
{
    let deadline_at = Instant::now() + deadline;
    let mut assembler = FrameAssembler::new();
    let mut byte = [0u8; 1];

    loop {
        let now = Instant::now();
        if now >= deadline_at {
            debug!(
                "No frame within {} ms ({} bytes discarded)",
                deadline.as_millis(),
                assembler.buffered()
            );
            return Ok(None);
        }
        let wait = poll.min(deadline_at - now);

        match timeout(wait, port.read(&mut byte)).await {
            // Nothing yet
            Err(_) => continue,
            // The device went away
            Ok(Ok(0)) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "serial port closed",
                ))
            }
            Ok(Ok(n)) => {
                assembler.push(&byte[..n]);
                if let Some(candidate) = assembler.try_extract() {
                    return Ok(Some(candidate));
                }
            }
            Ok(Err(e)) if is_transient(e.kind()) => tokio::time::sleep(wait).await,
            Ok(Err(e)) => return Err(e),
        }
    }
}

fn is_transient(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
