use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Memory region a parameter lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bank {
    /// Volatile working memory (live readings)
    Ram,
    /// EEPROM (persistent settings)
    Epr,
}

/// Kind of exchange a command performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Read,
    Write,
}

/// Device address and scaling of a named parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub bank: Bank,
    pub address: u8,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default)]
    pub offset: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl ParameterDescriptor {
    pub fn new(name: &str, bank: Bank, address: u8, multiplier: f64, offset: f64) -> Self {
        Self {
            name: name.to_string(),
            bank,
            address,
            multiplier,
            offset,
        }
    }
}

/// A queued request for the controller.
///
/// A raw value is carried by write commands only; the constructors keep that
/// pairing intact.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    operation: Operation,
    parameter: ParameterDescriptor,
    raw_value: Option<u8>,
}

impl Command {
    /// Read the current value of `parameter`
    pub fn read(parameter: ParameterDescriptor) -> Self {
        Self {
            operation: Operation::Read,
            parameter,
            raw_value: None,
        }
    }

    /// Store `raw_value` into `parameter`
    pub fn write(parameter: ParameterDescriptor, raw_value: u8) -> Self {
        Self {
            operation: Operation::Write,
            parameter,
            raw_value: Some(raw_value),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn parameter(&self) -> &ParameterDescriptor {
        &self.parameter
    }

    pub fn raw_value(&self) -> Option<u8> {
        self.raw_value
    }
}

/// Failure recorded against the command in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeError {
    /// No response arrived before the timer fired
    Timeout,
    /// A response arrived but failed validation
    ChecksumMismatch,
}

/// Last committed value of a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Scaled, user-facing value
    pub value: f64,
    /// Byte received on the wire
    pub raw: u8,
    pub updated_at: DateTime<Utc>,
}

/// Identifies one armed timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Events delivered to the engine by its event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The serial line reports received bytes
    ReceiveReady,
    /// A previously armed timer expired
    TimerExpired(TimerHandle),
}

/// Exchange counters accumulated over the engine's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub transmissions: u64,
    pub retries: u64,
    pub timeouts: u64,
    pub checksum_errors: u64,
    pub completed: u64,
    pub dropped: u64,
    pub unsolicited: u64,
    pub transmit_errors: u64,
}

/// Point-in-time view of the engine state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub busy: bool,
    pub attempt: u8,
    pub last_error: Option<ExchangeError>,
    pub queued: usize,
}
