//! Engine and serial line configuration.

use crate::constants::*;
use crate::error::{PelletError, Result};
use crate::types::Bank;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opcode and bank bytes combined into the first request byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpcodeTable {
    pub read: u8,
    pub write: u8,
    pub ram: u8,
    pub epr: u8,
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self {
            read: READ_OPCODE,
            write: WRITE_OPCODE,
            ram: RAM_BANK,
            epr: EPR_BANK,
        }
    }
}

impl OpcodeTable {
    /// Selector byte for a memory bank
    pub fn bank_byte(&self, bank: Bank) -> u8 {
        match bank {
            Bank::Ram => self.ram,
            Bank::Epr => self.epr,
        }
    }
}

/// How a write acknowledgement `[b0, b1]` is validated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAck {
    /// `b1` must echo the written raw value
    #[default]
    EchoValue,
    /// `b0` must echo the address and `b1` the written raw value
    AddressAndValue,
}

/// Protocol engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Response timeout in milliseconds
    pub timeout_ms: u64,
    /// Transmissions per command before it is dropped
    pub max_attempts: u8,
    /// Usable command queue slots
    pub queue_capacity: usize,
    pub opcodes: OpcodeTable,
    pub write_ack: WriteAck,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: TIMEOUT_MS,
            max_attempts: MAX_ATTEMPTS,
            queue_capacity: QUEUE_CAPACITY,
            opcodes: OpcodeTable::default(),
            write_ack: WriteAck::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(PelletError::InvalidConfig("timeout_ms must be positive".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(PelletError::InvalidConfig("max_attempts must be at least 1".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(PelletError::InvalidConfig("queue_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// UART framing for the controller link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub data_bits: serialport::DataBits,
    pub stop_bits: serialport::StopBits,
    pub parity: serialport::Parity,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            data_bits: DATA_BITS,
            stop_bits: STOP_BITS,
            parity: PARITY,
        }
    }
}
