//! Stage Polling Example
//!
//! This example drives the protocol engine from a simple poll loop:
//! - Listing and selecting serial ports
//! - Building the P937 parameter registry
//! - Requesting the stove stage every few seconds
//! - Printing the last known state and exchange counters
//!
//! Usage:
//!   cargo run --example poll_stage                  # Interactive mode
//!   cargo run --example poll_stage -- COM3          # Specify port
//!   cargo run --example poll_stage -- /dev/ttyUSB0
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=trace cargo run --example poll_stage
//!   RUST_LOG=info cargo run --example poll_stage

use inquire::Select;
use log::{info, warn};
use pellet_protocol::{
    registry, DeadlineTimer, EngineConfig, ParameterRegistry, Pellet, Result, SerialPortLine,
};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const SERVICE_INTERVAL: Duration = Duration::from_millis(20);

/// Interactive serial port selection using inquire
fn select_port() -> Result<String> {
    let ports = SerialPortLine::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }

    let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

    let selection = Select::new("Select a serial port:", port_names)
        .prompt()
        .map_err(|e| std::io::Error::other(format!("Selection cancelled: {}", e)))?;

    Ok(selection)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port_name = std::env::args()
        .nth(1)
        .map(Ok)
        .unwrap_or_else(select_port)?;

    info!("Connecting to stove controller on {}...", port_name);
    let line = SerialPortLine::open(&port_name)?;
    let registry = ParameterRegistry::new(registry::p937())?;
    let mut pellet = Pellet::new(line, DeadlineTimer::new(), registry, EngineConfig::default())?;

    let mut next_poll = Instant::now();
    loop {
        let now = Instant::now();
        if now >= next_poll {
            if let Some(stage) = pellet.state().get("stage") {
                info!("Stage is: {}", stage);
            }
            if let Err(e) = pellet.update("stage") {
                warn!("Could not queue stage update: {}", e);
            }
            info!("Stats: {:?}", pellet.stats());
            next_poll = now + POLL_INTERVAL;
        }

        if let Err(e) = pellet.service(now) {
            warn!("Service failed: {}", e);
        }
        thread::sleep(SERVICE_INTERVAL);
    }
}
