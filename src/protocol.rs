use crate::constants::*;
use crate::error::{DlpError, Result};
use crate::transport::Transport;
use crate::types::{PortConfig, ReplyMode};
use log::{debug, trace};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation signal for the driver's blocking reads.
///
/// Cloned from [`DlpIo8::cancel_token`] and handed to whatever task handles
/// shutdown (a Ctrl-C handler, typically). Once cancelled, any in-flight or
/// later blocking read on the driver returns [`DlpError::Cancelled`]; the
/// owning task then calls [`DlpIo8::close`] itself, so the connection is
/// never torn down under a read that is still using it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Translate a set-line digit string into the device's clear alphabet.
///
/// Pure positional substitution `1=>Q, 2=>W, 3=>E, 4=>R, 5=>T, 6=>Y, 7=>U, 8=>I`.
/// Duplicates are preserved and every other character passes through
/// untouched; the device's own semantics govern what those do.
pub fn clear_sequence(lines: &str) -> String {
    lines
        .chars()
        .map(|c| match c {
            '1'..='8' => CLEAR_LINE_CMDS[(c as u8 - b'1') as usize] as char,
            other => other,
        })
        .collect()
}

/// Main DLP-IO8-G protocol interface.
///
/// Owns the serial connection for its lifetime. Every operation is one
/// blocking write followed by at most one bounded read; the `&mut self`
/// receivers keep the exchange strictly half-duplex per driver instance.
pub struct DlpIo8 {
    transport: Option<Box<dyn Transport>>,
    read_timeout: Duration,
    cancel: CancelToken,
}

impl std::fmt::Debug for DlpIo8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DlpIo8")
            .field("transport", &self.transport.as_ref().map(|_| "..."))
            .field("read_timeout", &self.read_timeout)
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl DlpIo8 {
    /// Open `port_name` at `baud_rate` with 8-N-1 framing and handshake
    /// with the device.
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with(port_name, &PortConfig::with_baud_rate(baud_rate))
    }

    /// Open with an explicit serial configuration and handshake with the
    /// device.
    ///
    /// The port is configured to poll in [`READ_POLL_INTERVAL_MS`] slices;
    /// the overall reply deadline is `config.read_timeout`.
    pub fn open_with(port_name: &str, config: &PortConfig) -> Result<Self> {
        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(config.framing.data_bits())
            .parity(config.framing.parity())
            .stop_bits(config.framing.stop_bits())
            .timeout(Duration::from_millis(READ_POLL_INTERVAL_MS))
            .open()
            .map_err(|source| DlpError::OpenFailed {
                port: port_name.to_string(),
                baud: config.baud_rate,
                source,
            })?;

        Self::from_transport(Box::new(port), config.read_timeout)
    }

    /// Handshake over an already-open transport.
    ///
    /// Sends the ping probe, requires a single `Q` in reply, then switches
    /// the device to binary reply mode. On failure the transport is dropped,
    /// which closes it; the connection is never handed back half-initialized.
    pub fn from_transport(transport: Box<dyn Transport>, read_timeout: Duration) -> Result<Self> {
        let mut dlp = DlpIo8 {
            transport: Some(transport),
            read_timeout,
            cancel: CancelToken::default(),
        };
        dlp.handshake()?;
        debug!("handshake complete, binary reply mode active");
        Ok(dlp)
    }

    /// List available serial ports.
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }

    /// A cancellation token observed by this driver's blocking reads.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether the driver still owns an open connection.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Release the underlying connection. Safe to call more than once;
    /// operations after the first call return [`DlpError::Closed`].
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            debug!("serial connection closed");
        }
    }

    /// Probe the device.
    ///
    /// `Ok(true)` iff the device answered with a single `Q` byte, `Ok(false)`
    /// when it stayed silent for the whole read deadline or answered with
    /// anything else. Errors are transport failures only: a silent device is
    /// a negative result, not a fault.
    pub fn ping(&mut self) -> Result<bool> {
        self.send(&[PING_CMD])?;
        let mut reply = [0u8; REPLY_BUFFER_LEN];
        let n = self.read_reply(&mut reply)?;
        Ok(n == 1 && reply[0] == PING_ACK)
    }

    /// Read the state of all 8 lines in one round trip.
    ///
    /// Returns exactly the bytes the device sent back, which can be fewer
    /// than 8; callers must check the length. Stale unread bytes from a
    /// previous cycle are flushed before the command goes out, otherwise
    /// replies desynchronize from requests.
    pub fn read_lines(&mut self) -> Result<Vec<u8>> {
        let transport = self.transport.as_mut().ok_or(DlpError::Closed)?;
        transport.clear_output()?;
        transport.clear_input()?;

        self.send(&READ_LINE_CMDS)?;
        let mut reply = [0u8; REPLY_BUFFER_LEN];
        let n = self.read_reply(&mut reply)?;
        debug!("read_lines: {} bytes: {:02X?}", n, &reply[..n]);
        Ok(reply[..n].to_vec())
    }

    /// Read the state of a single line (1-8).
    ///
    /// `Ok(None)` when the device returns nothing within the read deadline.
    pub fn read_line(&mut self, line: u8) -> Result<Option<u8>> {
        if !(1..=LINE_COUNT).contains(&line) {
            return Err(DlpError::InvalidLine(line));
        }
        let cmd = READ_LINE_CMDS[(line - 1) as usize];

        let transport = self.transport.as_mut().ok_or(DlpError::Closed)?;
        transport.clear_output()?;
        transport.clear_input()?;

        self.send(&[cmd])?;
        let mut reply = [0u8; REPLY_BUFFER_LEN];
        let n = self.read_reply(&mut reply)?;
        Ok(if n > 0 { Some(reply[0]) } else { None })
    }

    /// Assert the lines named in `lines`, e.g. `"13"` for lines 1 and 3.
    ///
    /// The string is sent verbatim: no dedup, no reordering, no validation.
    pub fn set_lines(&mut self, lines: &str) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(DlpError::Closed)?;
        transport.clear_output()?;
        self.send(lines.as_bytes())
    }

    /// Deassert the lines named in `lines`, e.g. `"13"` for lines 1 and 3.
    ///
    /// `lines` uses the same digit alphabet as [`set_lines`]; the
    /// translation to the device's clear alphabet is [`clear_sequence`].
    ///
    /// [`set_lines`]: DlpIo8::set_lines
    pub fn unset_lines(&mut self, lines: &str) -> Result<()> {
        let cmd = clear_sequence(lines);
        let transport = self.transport.as_mut().ok_or(DlpError::Closed)?;
        transport.clear_output()?;
        self.send(cmd.as_bytes())
    }

    /// Select ASCII or binary reply encoding on the device.
    ///
    /// The handshake already selects binary mode; this re-issues either
    /// control byte for callers that want human-readable replies.
    pub fn set_reply_mode(&mut self, mode: ReplyMode) -> Result<()> {
        let cmd = [mode.command()];
        trace!("tx: {:02X?}", cmd);
        let transport = self.transport.as_mut().ok_or(DlpError::Closed)?;
        let n = transport
            .write(&cmd)
            .map_err(|e| DlpError::ModeSwitchFailed { source: Some(e) })?;
        if n == 0 {
            return Err(DlpError::ModeSwitchFailed { source: None });
        }
        Ok(())
    }

    fn handshake(&mut self) -> Result<()> {
        self.send(&[PING_CMD])?;
        let mut reply = [0u8; REPLY_BUFFER_LEN];
        let n = match self.read_reply(&mut reply) {
            Ok(n) => n,
            Err(DlpError::Io(e)) => {
                return Err(DlpError::HandshakeFailed {
                    reply: Vec::new(),
                    source: Some(e),
                })
            }
            Err(e) => return Err(e),
        };
        if n != 1 || reply[0] != PING_ACK {
            return Err(DlpError::HandshakeFailed {
                reply: reply[..n].to_vec(),
                source: None,
            });
        }

        self.set_reply_mode(ReplyMode::Binary)
    }

    fn send(&mut self, cmd: &[u8]) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(DlpError::Closed)?;
        trace!("tx: {:02X?}", cmd);
        let mut written = 0;
        while written < cmd.len() {
            match transport.write(&cmd[written..]) {
                Ok(0) => {
                    return Err(DlpError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "device accepted no bytes",
                    )))
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// One bounded read of up to 8 reply bytes.
    ///
    /// The transport polls in short slices so the cancel token is observed
    /// while blocked. Returns the number of bytes received; 0 means the
    /// device stayed silent for the whole deadline.
    fn read_reply(&mut self, buf: &mut [u8; REPLY_BUFFER_LEN]) -> Result<usize> {
        let deadline = Instant::now() + self.read_timeout;
        let transport = self.transport.as_mut().ok_or(DlpError::Closed)?;
        loop {
            if self.cancel.is_cancelled() {
                return Err(DlpError::Cancelled);
            }
            match transport.read(&mut buf[..]) {
                Ok(n) if n > 0 => {
                    trace!("rx: {:02X?}", &buf[..n]);
                    return Ok(n);
                }
                Ok(_) => {}
                Err(e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
            if Instant::now() >= deadline {
                return Ok(0);
            }
        }
    }
}
