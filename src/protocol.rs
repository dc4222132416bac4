use crate::codec;
use crate::config::{EngineConfig, LineSettings};
use crate::constants::MIN_RESPONSE_BYTES;
use crate::error::{PelletError, Result};
use crate::link::{DeadlineTimer, SerialLine, Timer};
use crate::registry::{self, ParameterRegistry};
use crate::ring_buffer::RingBuffer;
use crate::types::*;
use chrono::Utc;
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Protocol engine for one controller link.
///
/// Commands are queued and sent one at a time. Each transmission arms a
/// single timeout; the exchange resolves when either
/// [`on_receive_ready`](Self::on_receive_ready) sees a response or
/// [`on_timeout`](Self::on_timeout) fires for the armed handle. A failed
/// exchange is retried until `max_attempts` transmissions have been made,
/// then the command is dropped and the queue moves on.
pub struct Pellet<L: SerialLine, T: Timer> {
    line: L,
    timer: T,
    config: EngineConfig,
    registry: ParameterRegistry,
    commands: RingBuffer<Command>,
    readings: HashMap<String, Reading>,
    // A command is on the wire and awaiting its response
    busy: bool,
    attempt: u8,
    last_error: Option<ExchangeError>,
    pending_timer: Option<TimerHandle>,
    stats: EngineStats,
}

impl<L: SerialLine, T: Timer> Pellet<L, T> {
    /// Create an engine on a line using the controller's default framing
    pub fn new(line: L, timer: T, registry: ParameterRegistry, config: EngineConfig) -> Result<Self> {
        Self::with_line_settings(line, timer, registry, config, &LineSettings::default())
    }

    /// Create an engine with explicit line framing
    pub fn with_line_settings(
        mut line: L,
        timer: T,
        registry: ParameterRegistry,
        config: EngineConfig,
        settings: &LineSettings,
    ) -> Result<Self> {
        config.validate()?;
        line.configure(settings)?;
        line.enable_receive()?;

        Ok(Pellet {
            line,
            timer,
            commands: RingBuffer::new(config.queue_capacity),
            config,
            registry,
            readings: HashMap::new(),
            busy: false,
            attempt: 0,
            last_error: None,
            pending_timer: None,
            stats: EngineStats::default(),
        })
    }

    /// Request a fresh value of a parameter from the controller
    pub fn update(&mut self, name: &str) -> Result<()> {
        let parameter = self.resolve(name)?.clone();
        self.enqueue(Command::read(parameter))
    }

    /// Request the controller to store a new value of a parameter
    pub fn change(&mut self, name: &str, value: f64) -> Result<()> {
        let parameter = self.resolve(name)?;
        let raw = registry::to_raw(parameter, value)?;
        let command = Command::write(parameter.clone(), raw);
        self.enqueue(command)
    }

    /// Last committed scaled value of every parameter read so far
    pub fn state(&self) -> HashMap<String, f64> {
        self.readings
            .iter()
            .map(|(name, reading)| (name.clone(), reading.value))
            .collect()
    }

    /// Last committed reading of one parameter
    pub fn reading(&self, name: &str) -> Option<&Reading> {
        self.readings.get(name)
    }

    /// Every committed reading, keyed by parameter name
    pub fn readings(&self) -> &HashMap<String, Reading> {
        &self.readings
    }

    /// Snapshot of the state machine
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            busy: self.busy,
            attempt: self.attempt,
            last_error: self.last_error,
            queued: self.commands.len(),
        }
    }

    /// Exchange counters since construction
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// A command is awaiting its response
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Engine configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parameter table used to resolve names
    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    /// Underlying serial line
    pub fn line(&self) -> &L {
        &self.line
    }

    /// Mutable access to the serial line
    pub fn line_mut(&mut self) -> &mut L {
        &mut self.line
    }

    /// Timer service arming the timeouts
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Mutable access to the timer service
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Dispatch an event from the owning event loop
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::ReceiveReady => self.on_receive_ready(),
            Event::TimerExpired(handle) => {
                self.on_timeout(handle);
                Ok(())
            }
        }
    }

    /// Receive-ready entry point.
    ///
    /// Fewer than two buffered bytes leaves everything untouched; the
    /// notification is expected to fire again as more bytes arrive.
    pub fn on_receive_ready(&mut self) -> Result<()> {
        let available = self.line.bytes_available()?;
        if available < MIN_RESPONSE_BYTES {
            trace!("Waiting for response: {} byte(s) buffered", available);
            return Ok(());
        }

        let bytes = self.line.read()?;
        trace!("Received: {}", hex(&bytes));

        let command = match self.commands.peek() {
            Some(command) if self.busy => command.clone(),
            _ => {
                self.stats.unsolicited += 1;
                warn!("Discarding {} unsolicited byte(s): {}", bytes.len(), hex(&bytes));
                return Ok(());
            }
        };

        let response = match bytes.as_slice() {
            [b0, b1, rest @ ..] => {
                if !rest.is_empty() {
                    debug!("Ignoring {} trailing byte(s) after response", rest.len());
                }
                [*b0, *b1]
            }
            _ => {
                // Drained less than reported; the timeout resolves the exchange
                warn!("Short response: {}", hex(&bytes));
                return Ok(());
            }
        };

        self.cancel_timer();
        match codec::decode(&command, response, &self.config.opcodes, self.config.write_ack) {
            Ok(raw) => {
                self.commit(&command, raw);
                self.last_error = None;
            }
            Err(err) => {
                warn!(
                    "Rejected response to {:?} of {}: {}",
                    command.operation(),
                    command.parameter().name,
                    err
                );
                self.stats.checksum_errors += 1;
                self.last_error = Some(ExchangeError::ChecksumMismatch);
            }
        }

        self.handle_next();
        Ok(())
    }

    /// Timer expiry entry point. Handles other than the one armed for the
    /// command in flight are stale and ignored.
    pub fn on_timeout(&mut self, handle: TimerHandle) {
        if self.pending_timer != Some(handle) {
            warn!("Ignoring stale timer {:?}", handle);
            return;
        }
        self.pending_timer = None;

        if let Some(command) = self.commands.peek() {
            debug!(
                "Timeout waiting for {} ({:?})",
                command.parameter().name,
                command.operation()
            );
        }
        self.stats.timeouts += 1;
        self.last_error = Some(ExchangeError::Timeout);
        self.handle_next();
    }

    fn resolve(&self, name: &str) -> Result<&ParameterDescriptor> {
        self.registry
            .resolve(name)
            .ok_or_else(|| PelletError::UnknownParameter(name.to_string()))
    }

    fn enqueue(&mut self, command: Command) -> Result<()> {
        debug!(
            "Queueing {:?} of {}",
            command.operation(),
            command.parameter().name
        );
        if self.commands.offer(command).is_err() {
            return Err(PelletError::QueueFull {
                capacity: self.commands.capacity(),
            });
        }
        if !self.busy {
            self.transmit();
        }
        Ok(())
    }

    fn commit(&mut self, command: &Command, raw: u8) {
        let parameter = command.parameter();
        match command.operation() {
            Operation::Read => {
                let value = registry::to_scaled(parameter, raw);
                debug!("{} = {} (raw {:#04x})", parameter.name, value, raw);
                self.readings.insert(
                    parameter.name.clone(),
                    Reading {
                        value,
                        raw,
                        updated_at: Utc::now(),
                    },
                );
            }
            Operation::Write => {
                debug!("{} write confirmed (raw {:#04x})", parameter.name, raw);
            }
        }
        self.stats.completed += 1;
    }

    // Retry the head command or move past it
    fn handle_next(&mut self) {
        self.attempt += 1;

        if self.last_error.is_some() && self.attempt < self.config.max_attempts {
            debug!(
                "Retrying after {:?} (attempt {} of {})",
                self.last_error,
                self.attempt + 1,
                self.config.max_attempts
            );
            self.stats.retries += 1;
            self.last_error = None;
            self.transmit();
            return;
        }

        if let Some(command) = self.commands.poll() {
            if let Some(error) = self.last_error {
                warn!(
                    "Dropping {:?} of {} after {} attempt(s): {:?}",
                    command.operation(),
                    command.parameter().name,
                    self.attempt,
                    error
                );
                self.stats.dropped += 1;
            }
        }
        self.attempt = 0;
        self.last_error = None;
        self.busy = false;

        if self.commands.is_empty() {
            debug!("Queue drained, idle");
        } else {
            self.transmit();
        }
    }

    fn transmit(&mut self) {
        let request = match self.commands.peek() {
            Some(command) => codec::encode(command, &self.config.opcodes),
            None => return,
        };

        self.busy = true;
        self.cancel_timer();

        // A failed send still arms the timeout so retry/drop runs as usual
        if let Err(err) = self.send(&request) {
            warn!("Transmit failed: {}", err);
            self.stats.transmit_errors += 1;
        }
        self.stats.transmissions += 1;
        self.pending_timer = Some(self.timer.arm(self.config.timeout()));
    }

    fn send(&mut self, request: &[u8]) -> Result<()> {
        let stale = self.line.read()?;
        if !stale.is_empty() {
            debug!("Discarding {} stale byte(s): {}", stale.len(), hex(&stale));
        }

        trace!("Sending:  {}", hex(request));
        self.line.write(request)?;
        self.line.flush()
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.pending_timer.take() {
            self.timer.cancel(handle);
        }
    }
}

impl<L: SerialLine> Pellet<L, DeadlineTimer> {
    /// Poll the line and the deadline once, dispatching whichever is ready.
    ///
    /// At most one timer expiry is handled per call.
    /// A receive error is returned only after the deadline has been checked,
    /// so a failing line still times out the command in flight.
    pub fn service(&mut self, now: Instant) -> Result<()> {
        let received = self.on_receive_ready();
        if let Some(handle) = self.timer.take_expired(now) {
            self.on_timeout(handle);
        }
        received
    }
}

impl<L: SerialLine, T: Timer> Drop for Pellet<L, T> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
