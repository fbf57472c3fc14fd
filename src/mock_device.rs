//! Simulated DLP-IO8-G used by the unit tests.
//!
//! Interprets the same single-byte commands as the hardware: answers pings
//! with `Q`, honors the reply-mode control bytes, tracks the 8 line states,
//! and queues one state byte per read command. Faults can be injected to
//! exercise the failure paths. Clones share the same device, so a test can
//! keep a handle while the driver owns the transport.

use crate::constants::{
    ASCII_MODE_CMD, BINARY_MODE_CMD, CLEAR_LINE_CMDS, PING_ACK, PING_CMD, READ_LINE_CMDS,
};
use crate::transport::Transport;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct Inner {
    lines: [bool; 8],
    binary_mode: bool,
    pending: VecDeque<u8>,
    written: Vec<u8>,
    answer_pings: bool,
    muted: bool,
    reply_budget: Option<usize>,
    fail_reads: Option<io::ErrorKind>,
    accept_limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct MockDevice {
    inner: Arc<Mutex<Inner>>,
}

impl MockDevice {
    pub fn new() -> Self {
        MockDevice {
            inner: Arc::new(Mutex::new(Inner {
                lines: [false; 8],
                binary_mode: false,
                pending: VecDeque::new(),
                written: Vec::new(),
                answer_pings: true,
                muted: false,
                reply_budget: None,
                fail_reads: None,
                accept_limit: None,
            })),
        }
    }

    /// Current state of lines 1-8.
    pub fn lines(&self) -> [bool; 8] {
        self.inner.lock().unwrap().lines
    }

    /// Drive one line externally, as a connected signal source would.
    pub fn set_line(&self, line: u8, high: bool) {
        assert!((1..=8).contains(&line), "mock line index out of range");
        self.inner.lock().unwrap().lines[(line - 1) as usize] = high;
    }

    /// Every byte the host has written so far.
    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().unwrap().written.clone()
    }

    pub fn binary_mode(&self) -> bool {
        self.inner.lock().unwrap().binary_mode
    }

    /// Queue bytes for the host to read, ahead of any command replies.
    pub fn queue_reply(&self, bytes: &[u8]) {
        self.inner.lock().unwrap().pending.extend(bytes);
    }

    /// Stop acknowledging pings (simulates absent hardware).
    pub fn silence_pings(&self) {
        self.inner.lock().unwrap().answer_pings = false;
    }

    /// Stop replying to every command.
    pub fn mute(&self) {
        self.inner.lock().unwrap().muted = true;
    }

    /// Only reply to the next `n` reply-producing commands.
    pub fn limit_replies(&self, n: usize) {
        self.inner.lock().unwrap().reply_budget = Some(n);
    }

    /// Fail every subsequent read with the given error kind.
    pub fn fail_reads(&self, kind: io::ErrorKind) {
        self.inner.lock().unwrap().fail_reads = Some(kind);
    }

    /// Accept only the next `n` written bytes, then report zero accepted.
    pub fn accept_writes(&self, n: usize) {
        self.inner.lock().unwrap().accept_limit = Some(n);
    }
}

impl Inner {
    fn push_reply(&mut self, byte: u8) {
        if self.muted {
            return;
        }
        if let Some(budget) = self.reply_budget.as_mut() {
            if *budget == 0 {
                return;
            }
            *budget -= 1;
        }
        self.pending.push_back(byte);
    }

    fn state_byte(&self, index: usize) -> u8 {
        let high = self.lines[index];
        if self.binary_mode {
            high as u8
        } else if high {
            b'1'
        } else {
            b'0'
        }
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            PING_CMD => {
                if self.answer_pings {
                    self.push_reply(PING_ACK);
                }
            }
            BINARY_MODE_CMD => self.binary_mode = true,
            ASCII_MODE_CMD => self.binary_mode = false,
            b'1'..=b'8' => self.lines[(byte - b'1') as usize] = true,
            _ => {
                if let Some(i) = READ_LINE_CMDS.iter().position(|&c| c == byte) {
                    let reply = self.state_byte(i);
                    self.push_reply(reply);
                } else if let Some(i) = CLEAR_LINE_CMDS.iter().position(|&c| c == byte) {
                    self.lines[i] = false;
                }
            }
        }
    }
}

impl Transport for MockDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(limit) = inner.accept_limit {
            if inner.written.len() >= limit {
                return Ok(0);
            }
        }
        for &b in buf {
            inner.written.push(b);
            inner.execute(b);
        }
        Ok(buf.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(kind) = inner.fail_reads {
            return Err(io::Error::new(kind, "injected read failure"));
        }
        let mut n = 0;
        while n < buf.len() {
            match inner.pending.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        if n == 0 {
            Err(io::Error::new(io::ErrorKind::TimedOut, "no reply"))
        } else {
            Ok(n)
        }
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.inner.lock().unwrap().pending.clear();
        Ok(())
    }

    fn clear_output(&mut self) -> io::Result<()> {
        Ok(())
    }
}
