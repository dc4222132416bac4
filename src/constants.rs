//! Protocol constants for pellet-stove controller communication.
//!
//! This module defines the opcodes, memory bank selectors, timing parameters
//! and serial port configuration used on the controller's UART link.

/// Opcode for a read request (combined with the bank byte)
pub const READ_OPCODE: u8 = 0x00;

/// Opcode for a write request (combined with the bank byte)
pub const WRITE_OPCODE: u8 = 0x80;

/// Bank selector for volatile RAM
pub const RAM_BANK: u8 = 0x00;

/// Bank selector for EEPROM
pub const EPR_BANK: u8 = 0x20;

/// Baud rate (1200 bps)
pub const BAUD_RATE: u32 = 1200;

/// Data bits configuration
pub const DATA_BITS: serialport::DataBits = serialport::DataBits::Eight;

/// Stop bits configuration (2 stop bits required)
pub const STOP_BITS: serialport::StopBits = serialport::StopBits::Two;

/// Parity configuration
pub const PARITY: serialport::Parity = serialport::Parity::None;

/// Response timeout in milliseconds
pub const TIMEOUT_MS: u64 = 1000;

/// Transmissions allowed per command before it is dropped
pub const MAX_ATTEMPTS: u8 = 2;

/// Default command queue capacity
pub const QUEUE_CAPACITY: usize = 16;

/// Smallest response the engine will decode
pub const MIN_RESPONSE_BYTES: usize = 2;

/// Length of an encoded read request
pub const READ_REQUEST_LEN: usize = 2;

/// Length of an encoded write request
pub const WRITE_REQUEST_LEN: usize = 4;
