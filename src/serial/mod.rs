//! # Serial Communication Module
//!
//! Handles the serial link to the Amon radio/drone.
//!
//! This module handles:
//! - Checking that a serial capability exists on this host
//! - Enumerating available ports
//! - Opening a port at a given baud rate (8N1, no flow control)
//! - Assembling candidate frames from the inbound byte stream

pub mod framer;
pub mod port_trait;

use crate::error::{LinkError, Result};
use port_trait::{SerialPortIO, TokioSerialPort};
use tracing::{debug, info};

/// Opens serial ports on behalf of a link session
#[cfg_attr(test, mockall::automock)]
pub trait SerialConnector: Send {
    /// Whether the serial capability is present on this host
    fn is_available(&self) -> bool;

    /// Names of the ports that can be opened
    fn list_ports(&self) -> Result<Vec<String>>;

    /// Open `port` at `baud_rate`
    fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn SerialPortIO>>;
}

/// [`SerialConnector`] backed by `tokio-serial`
///
/// Opening a port requires a running tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSerialConnector;

impl TokioSerialConnector {
    pub fn new() -> Self {
        Self
    }
}

impl SerialConnector for TokioSerialConnector {
    /// `tokio-serial` is compiled in, so the capability is always present.
    /// Enumeration failures surface from [`list_ports`](Self::list_ports).
    fn is_available(&self) -> bool {
        true
    }

    fn list_ports(&self) -> Result<Vec<String>> {
        let ports = tokio_serial::available_ports()
            .map_err(|e| LinkError::Io(std::io::Error::from(e)))?;

        debug!("Found {} serial ports", ports.len());
        Ok(ports.into_iter().map(|port| port.port_name).collect())
    }

    fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn SerialPortIO>> {
        use tokio_serial::SerialPortBuilderExt;

        let stream = tokio_serial::new(port, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| LinkError::ConnectFailed(format!("Failed to open {}: {}", port, e)))?;

        info!("Opened serial port {} at {} baud", port, baud_rate);
        Ok(Box::new(TokioSerialPort::new(stream)))
    }
}
