//! Ping: liveness check against the drone.

use tracing::info;

use super::LinkSession;
use crate::error::Result;
use crate::protocol::constants::OPT_PING;
use crate::serial::SerialConnector;

/// Successful ping outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingReply {
    /// Whether the pong carried the ACK flag bit
    pub ack: bool,
}

impl<C: SerialConnector> LinkSession<C> {
    /// Send a ping and wait for the pong
    ///
    /// A well-formed pong without the ACK bit is still a successful ping;
    /// the flag is reported in [`PingReply::ack`].
    ///
    /// # Errors
    ///
    /// - [`LinkError::NotConnected`](crate::error::LinkError::NotConnected) with no open port
    /// - [`LinkError::Timeout`](crate::error::LinkError::Timeout) if no pong arrives in time
    /// - [`LinkError::InvalidResponse`](crate::error::LinkError::InvalidResponse) for a malformed pong
    /// - any correlation or transport error from the exchange
    pub async fn ping(&mut self) -> Result<PingReply> {
        self.flush_input()?;

        let (pong, frame) = self.exchange(OPT_PING, &[], "pong").await?;
        self.accept("pong", &frame);

        let reply = PingReply { ack: pong.is_ack() };
        info!("Pong received (ack: {})", reply.ack);
        Ok(reply)
    }
}
