//! [`SerialLine`] backed by the `serialport` crate.

use crate::config::LineSettings;
use crate::constants::*;
use crate::error::Result;
use crate::link::SerialLine;
use serialport::{SerialPort, SerialPortInfo};
use std::io::{Read, Write};
use std::time::Duration;

// Reads only drain what is already buffered, so this is a safety net
const READ_TIMEOUT_MS: u64 = 50;

/// Controller link over an OS serial port
pub struct SerialPortLine {
    port: Box<dyn SerialPort>,
}

impl SerialPortLine {
    /// Open a port with the controller's default framing (1200 8N2)
    pub fn open(port_name: &str) -> Result<Self> {
        let port = serialport::new(port_name, BAUD_RATE)
            .data_bits(DATA_BITS)
            .stop_bits(STOP_BITS)
            .parity(PARITY)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()?;
        Ok(Self { port })
    }

    /// Wrap an already opened port
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }
}

impl SerialLine for SerialPortLine {
    fn configure(&mut self, settings: &LineSettings) -> Result<()> {
        self.port.set_baud_rate(settings.baud_rate)?;
        self.port.set_data_bits(settings.data_bits)?;
        self.port.set_stop_bits(settings.stop_bits)?;
        self.port.set_parity(settings.parity)?;
        self.port.set_flow_control(serialport::FlowControl::None)?;
        Ok(())
    }

    fn enable_receive(&mut self) -> Result<()> {
        // The OS receives continuously; start from an empty buffer
        self.port.clear(serialport::ClearBuffer::Input)?;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.port.flush()?;
        Ok(())
    }

    fn read(&mut self) -> Result<Vec<u8>> {
        let available = self.bytes_available()?;
        let mut buffer = vec![0u8; available];
        if available > 0 {
            self.port.read_exact(&mut buffer)?;
        }
        Ok(buffer)
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }
}
