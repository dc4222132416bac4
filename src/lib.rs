//! # Pellet Protocol Library
//!
//! A Rust library for reading and writing named parameters on a pellet-stove
//! controller over its half-duplex UART link (1200 baud, 8N2).
//!
//! ## Features
//!
//! - Bounded command queue with strict one-command-in-flight discipline
//! - Read requests validated by checksum, write requests carrying one
//! - Timeout-driven retries with a bounded attempt count
//! - Symbolic parameter names with linear offset/multiplier scaling
//! - Non-blocking, callback-driven engine: the caller's event loop delivers
//!   receive-ready and timer-expired events
//!
//! ## Example
//!
//! ```no_run
//! use pellet_protocol::{registry, DeadlineTimer, EngineConfig, ParameterRegistry, Pellet, SerialPortLine};
//! use std::time::{Duration, Instant};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let line = SerialPortLine::open("/dev/ttyUSB0")?;
//!     let registry = ParameterRegistry::new(registry::p937())?;
//!     let mut pellet = Pellet::new(line, DeadlineTimer::new(), registry, EngineConfig::default())?;
//!
//!     pellet.update("stage")?;
//!     while pellet.is_busy() {
//!         pellet.service(Instant::now())?;
//!         std::thread::sleep(Duration::from_millis(10));
//!     }
//!     println!("Stage: {:?}", pellet.state().get("stage"));
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod link;
pub mod protocol;
pub mod registry;
pub mod ring_buffer;
pub mod serial;
pub mod types;

pub use config::{EngineConfig, LineSettings, OpcodeTable, WriteAck};
pub use error::{PelletError, Result};
pub use link::{DeadlineTimer, SerialLine, Timer};
pub use protocol::Pellet;
pub use registry::ParameterRegistry;
pub use ring_buffer::RingBuffer;
pub use serial::SerialPortLine;
pub use types::*;
