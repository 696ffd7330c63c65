use crate::{AntennaController, command::WireCommand};
use serialport::SerialPort;
use std::{
    io::{self, Write},
    time::Duration,
};
use thiserror::Error;

/// Read timeout of the rotator lines. Only used to wake idle readers.
pub const READ_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum SerialAntennaControllerError {
    #[error("failed to open serial port {port}: {source}")]
    OpenError {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("failed to clone serial port {port} for reading: {source}")]
    CloneError {
        port: String,
        #[source]
        source: serialport::Error,
    },
}

/// A controller for an antenna rotator, allowing communication via a serial port.
pub struct SerialAntennaController {
    port_name: String,
    pub port: Box<dyn SerialPort>,
}

impl SerialAntennaController {
    /// Opens `port_name` at `baud_rate` with the rotator's fixed read timeout.
    pub fn new(port_name: &str, baud_rate: u32) -> Result<Self, SerialAntennaControllerError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| SerialAntennaControllerError::OpenError {
                port: port_name.to_string(),
                source,
            })?;

        Ok(Self {
            port_name: port_name.to_string(),
            port,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Second handle on the same line, for the feedback reader.
    pub fn reader(&self) -> Result<Box<dyn SerialPort>, SerialAntennaControllerError> {
        self.port
            .try_clone()
            .map_err(|source| SerialAntennaControllerError::CloneError {
                port: self.port_name.clone(),
                source,
            })
    }
}

impl AntennaController for SerialAntennaController {
    fn send(&mut self, command: &WireCommand) -> io::Result<()> {
        self.port.write_all(command.to_string().as_bytes())?;
        self.port.flush()
    }
}
