//! Collaborator seams: the serial line and the timeout timer.
//!
//! The engine never blocks on either. The event loop owning the engine is
//! expected to call [`Pellet::on_receive_ready`](crate::Pellet::on_receive_ready)
//! when bytes arrive and [`Pellet::on_timeout`](crate::Pellet::on_timeout) when
//! an armed timer expires.

use crate::config::LineSettings;
use crate::error::Result;
use crate::types::TimerHandle;
use std::time::{Duration, Instant};

/// Half-duplex UART the controller is attached to
pub trait SerialLine {
    /// Apply baud rate and framing
    fn configure(&mut self, settings: &LineSettings) -> Result<()>;

    fn enable_receive(&mut self) -> Result<()>;

    /// Queue bytes for transmission
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Push queued bytes out to the wire
    fn flush(&mut self) -> Result<()>;

    /// Drain and return everything in the receive buffer
    fn read(&mut self) -> Result<Vec<u8>>;

    fn bytes_available(&mut self) -> Result<usize>;
}

/// Single-shot timer service
pub trait Timer {
    /// Arm a timer that expires once after `duration`
    fn arm(&mut self, duration: Duration) -> TimerHandle;

    /// Disarm a timer; unknown or expired handles are ignored
    fn cancel(&mut self, handle: TimerHandle);
}

/// Timer for poll-driven loops: tracks deadlines, the loop asks what expired.
#[derive(Debug, Default)]
pub struct DeadlineTimer {
    next_id: u64,
    armed: Vec<(TimerHandle, Instant)>,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm relative to an explicit instant
    pub fn arm_at(&mut self, now: Instant, duration: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.armed.push((handle, now + duration));
        handle
    }

    /// Disarm and return the earliest timer whose deadline has passed
    pub fn take_expired(&mut self, now: Instant) -> Option<TimerHandle> {
        let index = self
            .armed
            .iter()
            .enumerate()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .min_by_key(|(_, (_, deadline))| *deadline)
            .map(|(index, _)| index)?;
        Some(self.armed.remove(index).0)
    }

    /// Nearest deadline, if any timer is armed
    pub fn next_deadline(&self) -> Option<Instant> {
        self.armed.iter().map(|(_, deadline)| *deadline).min()
    }

    pub fn armed(&self) -> usize {
        self.armed.len()
    }
}

impl Timer for DeadlineTimer {
    fn arm(&mut self, duration: Duration) -> TimerHandle {
        self.arm_at(Instant::now(), duration)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.armed.retain(|(armed, _)| *armed != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expires_only_after_deadline() {
        let start = Instant::now();
        let mut timer = DeadlineTimer::new();
        let handle = timer.arm_at(start, Duration::from_millis(1000));

        assert_eq!(timer.take_expired(start + Duration::from_millis(999)), None);
        assert_eq!(
            timer.take_expired(start + Duration::from_millis(1000)),
            Some(handle)
        );
        // Single shot
        assert_eq!(timer.take_expired(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_cancel_disarms() {
        let start = Instant::now();
        let mut timer = DeadlineTimer::new();
        let handle = timer.arm_at(start, Duration::from_millis(10));
        timer.cancel(handle);

        assert_eq!(timer.armed(), 0);
        assert_eq!(timer.take_expired(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_handles_are_unique_and_ordered() {
        let start = Instant::now();
        let mut timer = DeadlineTimer::new();
        let late = timer.arm_at(start, Duration::from_millis(20));
        let early = timer.arm_at(start, Duration::from_millis(10));
        assert_ne!(late, early);

        let now = start + Duration::from_millis(30);
        assert_eq!(timer.next_deadline(), Some(start + Duration::from_millis(10)));
        assert_eq!(timer.take_expired(now), Some(early));
        assert_eq!(timer.take_expired(now), Some(late));
    }
}
