//! # Link Session Module
//!
//! Request/response exchanges with the drone over one serial link.
//!
//! This module handles:
//! - Owning the open port for the lifetime of one connection
//! - Single request/response exchanges with correlation checks
//! - Ping (ack reported as data) and the pairing handshake
//! - Tearing the link down when a read fault shows it is gone
//!
//! Exchanges take `&mut self`, so at most one request is ever outstanding.

mod pairing;
mod ping;

pub use ping::PingReply;

use std::fmt;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::journal::{Direction, FrameJournal};
use crate::protocol::constants::{opcode_name, ParsedFrame, ID_DRONE, ID_PC, PROTOCOL_VER};
use crate::protocol::decoder::parse_frame;
use crate::protocol::encoder::build_request_frame;
use crate::serial::framer::read_frame;
use crate::serial::port_trait::SerialPortIO;
use crate::serial::{SerialConnector, TokioSerialConnector};

/// Timing and protocol settings for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Version byte placed in outgoing frames
    pub protocol_version: u8,

    /// Overall deadline for a response frame
    pub response_timeout: Duration,

    /// Wait for a single byte before re-checking the deadline
    pub read_poll: Duration,

    /// Bound on writing and flushing one request
    pub write_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VER,
            response_timeout: Duration::from_secs(1),
            read_poll: Duration::from_millis(300),
            write_timeout: Duration::from_millis(500),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            protocol_version: config.link.protocol_version,
            response_timeout: config.link.response_timeout(),
            read_poll: config.serial.read_timeout(),
            write_timeout: config.serial.write_timeout(),
        }
    }
}

/// One open connection
pub struct LinkState {
    port: String,
    baud_rate: u32,
    io: Box<dyn SerialPortIO>,
}

impl fmt::Debug for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkState")
            .field("port", &self.port)
            .field("baud_rate", &self.baud_rate)
            .finish_non_exhaustive()
    }
}

/// Connection status as reported to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Connected { port: String, baud_rate: u32 },
    Disconnected,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Connected { port, .. } => write!(f, "Connected to {}", port),
            LinkStatus::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Session with one drone over one serial link
///
/// # Examples
///
/// ```no_run
/// use amon_link::session::{LinkSession, SessionConfig};
/// use amon_link::serial::TokioSerialConnector;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut session = LinkSession::new(TokioSerialConnector::new(), SessionConfig::default());
///     session.connect("/dev/ttyUSB0", 115_200)?;
///
///     let reply = session.ping().await?;
///     println!("pong (ack: {})", reply.ack);
///
///     session.pair().await?;
///     session.disconnect();
///     Ok(())
/// }
/// ```
pub struct LinkSession<C: SerialConnector = TokioSerialConnector> {
    connector: C,
    settings: SessionConfig,
    state: Option<LinkState>,
    journal: Option<FrameJournal>,
}

impl<C: SerialConnector> fmt::Debug for LinkSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkSession")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C: SerialConnector> LinkSession<C> {
    pub fn new(connector: C, settings: SessionConfig) -> Self {
        Self {
            connector,
            settings,
            state: None,
            journal: None,
        }
    }

    /// Record every exchanged frame into `journal`
    pub fn with_journal(mut self, journal: FrameJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn settings(&self) -> &SessionConfig {
        &self.settings
    }

    /// Names of the ports that can be opened
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::TransportUnavailable`] if there is no serial
    /// capability on this host
    pub fn list_ports(&self) -> Result<Vec<String>> {
        if !self.connector.is_available() {
            return Err(LinkError::TransportUnavailable);
        }
        self.connector.list_ports()
    }

    /// Open `port` at `baud_rate`, closing any existing connection first
    ///
    /// # Errors
    ///
    /// - [`LinkError::TransportUnavailable`] if there is no serial capability
    /// - [`LinkError::ConnectFailed`] if the port cannot be opened
    pub fn connect(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        if !self.connector.is_available() {
            return Err(LinkError::TransportUnavailable);
        }

        self.disconnect();

        let io = self.connector.open(port, baud_rate)?;
        self.state = Some(LinkState {
            port: port.to_string(),
            baud_rate,
            io,
        });
        info!("Connected to {} at {} baud", port, baud_rate);
        Ok(())
    }

    /// Close the connection, if any
    ///
    /// Calling this while disconnected is a no-op.
    pub fn disconnect(&mut self) {
        if let Some(state) = self.state.take() {
            info!("Disconnected from {}", state.port);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_some()
    }

    pub fn status(&self) -> LinkStatus {
        match &self.state {
            Some(state) => LinkStatus::Connected {
                port: state.port.clone(),
                baud_rate: state.baud_rate,
            },
            None => LinkStatus::Disconnected,
        }
    }

    /// Discard stale input before starting an exchange
    fn flush_input(&mut self) -> Result<()> {
        let state = self.state.as_mut().ok_or(LinkError::NotConnected)?;
        if let Err(e) = state.io.clear_input() {
            return Err(self.connection_lost(e));
        }
        Ok(())
    }

    /// Drop the link after a fault that shows it is gone
    fn connection_lost(&mut self, error: std::io::Error) -> LinkError {
        if let Some(state) = self.state.take() {
            warn!("Lost connection to {}: {}", state.port, error);
        }
        LinkError::ConnectionLost(error.to_string())
    }

    fn journal(&mut self, direction: Direction, label: &str, frame: &[u8]) {
        if let Some(journal) = self.journal.as_mut() {
            if let Err(e) = journal.record(direction, label, frame) {
                warn!("Failed to journal {} frame: {}", label, e);
            }
        }
    }

    /// Send one host-to-drone request and wait for its correlated response
    ///
    /// The response must carry the same opcode and come from the drone to
    /// the host. The ACK flag is left for the caller to judge.
    ///
    /// # Errors
    ///
    /// - [`LinkError::NotConnected`] before anything is written
    /// - [`LinkError::WriteFailed`] if the request could not be written in time
    /// - [`LinkError::Timeout`] if no candidate frame arrived
    /// - [`LinkError::InvalidResponse`] if the candidate failed decoding
    /// - [`LinkError::UnexpectedOpcode`] / [`LinkError::AddressMismatch`] on correlation failure
    /// - [`LinkError::ConnectionLost`] if reading faulted
    async fn exchange(&mut self, opcode: u8, payload: &[u8], label: &str) -> Result<(ParsedFrame, Vec<u8>)> {
        if self.state.is_none() {
            return Err(LinkError::NotConnected);
        }

        let settings = self.settings;
        let request = build_request_frame(settings.protocol_version, opcode, payload)?;
        debug!("TX {} ({}): {}", opcode_name(opcode), request.len(), hex::encode(&request));

        {
            let state = self.state.as_mut().ok_or(LinkError::NotConnected)?;
            write_request(state.io.as_mut(), &request, settings.write_timeout).await?;
        }
        self.journal(Direction::Tx, opcode_name(opcode), &request);

        let received = {
            let state = self.state.as_mut().ok_or(LinkError::NotConnected)?;
            read_frame(state.io.as_mut(), settings.response_timeout, settings.read_poll).await
        };

        let candidate = match received {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return Err(LinkError::Timeout),
            Err(e) => return Err(self.connection_lost(e)),
        };

        let response = match parse_frame(&candidate) {
            Ok(response) => response,
            Err(e) => {
                warn!("Rejected {} response: {} ({})", label, e, hex::encode(&candidate));
                return Err(e.into());
            }
        };

        if response.opcode != opcode {
            return Err(LinkError::UnexpectedOpcode {
                expected: opcode,
                actual: response.opcode,
            });
        }

        if response.src != ID_DRONE || response.dst != ID_PC {
            return Err(LinkError::AddressMismatch {
                src: response.src,
                dst: response.dst,
            });
        }

        Ok((response, candidate))
    }

    /// Log and journal an accepted response
    fn accept(&mut self, label: &str, frame: &[u8]) {
        debug!("{}: {}", label, hex::encode(frame));
        self.journal(Direction::Rx, label, frame);
    }
}

async fn write_request(io: &mut dyn SerialPortIO, request: &[u8], limit: Duration) -> Result<()> {
    let write = async {
        io.write_all(request).await?;
        io.flush().await
    };

    match timeout(limit, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(LinkError::WriteFailed(e.to_string())),
        Err(_) => Err(LinkError::WriteFailed(format!(
            "write timed out after {} ms",
            limit.as_millis()
        ))),
    }
}
