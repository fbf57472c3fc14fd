//! Line-change monitoring.
//!
//! Polls a single line and reports raw state transitions together with the
//! time elapsed since the watch started, for aligning external trigger
//! signals (button boxes, TTL pulses) with experiment logs. No debouncing:
//! every changed state byte is an event.

use crate::constants::LINE_COUNT;
use crate::error::{DlpError, Result};
use crate::protocol::DlpIo8;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A raw state transition observed on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEvent {
    /// Line number, 1-8
    pub line: u8,
    /// Raw state byte as returned by the device
    pub raw: u8,
    /// Milliseconds since the watcher started
    pub elapsed_ms: u64,
}

/// Polls one line and yields an event whenever its raw state byte changes.
///
/// The first successful read reports the initial state as an event; callers
/// that only care about edges can skip it. Elapsed time is measured from the
/// watcher's own start instant.
#[derive(Debug)]
pub struct LineWatcher {
    line: u8,
    last: Option<u8>,
    started: Instant,
}

impl LineWatcher {
    /// Watch `line` (1-8), starting the elapsed-time clock now.
    pub fn new(line: u8) -> Result<Self> {
        if !(1..=LINE_COUNT).contains(&line) {
            return Err(DlpError::InvalidLine(line));
        }
        Ok(LineWatcher {
            line,
            last: None,
            started: Instant::now(),
        })
    }

    /// The line this watcher polls.
    pub fn line(&self) -> u8 {
        self.line
    }

    /// Time since the watcher started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Poll the line once; `Ok(Some(event))` when the state changed.
    ///
    /// A silent device (no reply within the read deadline) is not a change.
    pub fn poll(&mut self, dlp: &mut DlpIo8) -> Result<Option<LineEvent>> {
        match dlp.read_line(self.line)? {
            Some(raw) if self.last != Some(raw) => {
                self.last = Some(raw);
                Ok(Some(LineEvent {
                    line: self.line,
                    raw,
                    elapsed_ms: self.started.elapsed().as_millis() as u64,
                }))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_device::MockDevice;

    fn open_mock() -> (MockDevice, DlpIo8) {
        let dev = MockDevice::new();
        let dlp = DlpIo8::from_transport(Box::new(dev.clone()), Duration::from_millis(20))
            .expect("handshake against mock device");
        (dev, dlp)
    }

    #[test]
    fn watcher_validates_line_index() {
        assert!(matches!(LineWatcher::new(0), Err(DlpError::InvalidLine(0))));
        assert!(matches!(LineWatcher::new(9), Err(DlpError::InvalidLine(9))));
    }

    #[test]
    fn watcher_reports_initial_state_then_changes_only() {
        let (dev, mut dlp) = open_mock();
        let mut watcher = LineWatcher::new(2).unwrap();

        let first = watcher.poll(&mut dlp).unwrap().expect("initial state");
        assert_eq!(first.line, 2);
        assert_eq!(first.raw, 0);

        assert!(watcher.poll(&mut dlp).unwrap().is_none());

        dev.set_line(2, true);
        let edge = watcher.poll(&mut dlp).unwrap().expect("rising edge");
        assert_eq!(edge.raw, 1);

        assert!(watcher.poll(&mut dlp).unwrap().is_none());

        dev.set_line(2, false);
        let edge = watcher.poll(&mut dlp).unwrap().expect("falling edge");
        assert_eq!(edge.raw, 0);
    }

    #[test]
    fn watcher_treats_silence_as_no_change() {
        let (dev, mut dlp) = open_mock();
        let mut watcher = LineWatcher::new(1).unwrap();
        dev.mute();
        assert!(watcher.poll(&mut dlp).unwrap().is_none());
    }

    #[test]
    fn line_event_serializes_to_json() {
        let event = LineEvent {
            line: 2,
            raw: 1,
            elapsed_ms: 1500,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"line":2,"raw":1,"elapsed_ms":1500}"#);
    }
}
