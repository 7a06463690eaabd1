//! Pairing handshake: pair-start followed by pair-status.

use tracing::{debug, info, warn};

use super::LinkSession;
use crate::error::{LinkError, Result};
use crate::protocol::constants::{opcode_name, OPT_PAIR_START, OPT_PAIR_STATUS};
use crate::serial::SerialConnector;

/// Handshake steps, in order
const PAIRING_STEPS: [u8; 2] = [OPT_PAIR_START, OPT_PAIR_STATUS];

impl<C: SerialConnector> LinkSession<C> {
    /// Run the pairing handshake
    ///
    /// Every step must be acknowledged. The first failing step ends the
    /// attempt; later steps are not sent and nothing is retried.
    ///
    /// # Errors
    ///
    /// - [`LinkError::NotConnected`] with no open port
    /// - [`LinkError::AckMissing`] if a step's response lacks the ACK flag
    /// - any timeout, decoding, correlation or transport error of a step
    pub async fn pair(&mut self) -> Result<()> {
        self.flush_input()?;

        for opcode in PAIRING_STEPS {
            if let Err(e) = self.acknowledged_exchange(opcode).await {
                warn!("Pairing failed at {}: {}", opcode_name(opcode), e);
                return Err(e);
            }
            debug!("Pairing step {} acknowledged", opcode_name(opcode));
        }

        info!("Pairing complete");
        Ok(())
    }

    /// Single exchange whose response must carry the ACK flag
    async fn acknowledged_exchange(&mut self, opcode: u8) -> Result<()> {
        let (response, frame) = self.exchange(opcode, &[], "pairing-ack").await?;
        if !response.is_ack() {
            return Err(LinkError::AckMissing);
        }
        self.accept("pairing-ack", &frame);
        Ok(())
    }
}
