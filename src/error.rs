//! Error types for DLP-IO8-G protocol operations.

use thiserror::Error;

/// Result type alias for DLP-IO8-G operations.
pub type Result<T> = std::result::Result<T, DlpError>;

/// Error types for DLP-IO8-G communication.
#[derive(Error, Debug)]
pub enum DlpError {
    /// Transport could not open the device
    #[error("failed to open {port} at {baud} bps: {source}")]
    OpenFailed {
        /// Device path or port name that was requested
        port: String,
        /// Requested baud rate
        baud: u32,
        /// Underlying serial port error
        source: serialport::Error,
    },

    /// Ping did not return exactly one `Q` byte
    #[error("handshake failed: expected single 'Q' reply, got {reply:02X?}")]
    HandshakeFailed {
        /// The bytes actually returned (empty on silence or read failure)
        reply: Vec<u8>,
        /// Read error, when the probe failed at the transport level
        #[source]
        source: Option<std::io::Error>,
    },

    /// The reply-mode control byte was rejected
    #[error("mode switch rejected by device")]
    ModeSwitchFailed {
        /// Write error, when the rejection was a transport failure
        #[source]
        source: Option<std::io::Error>,
    },

    /// Read/write failure on an already-handshaken connection
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port enumeration or configuration error
    #[error("serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// Line index outside the valid 1-8 range
    #[error("line index out of range: {0} (lines are numbered 1-8)")]
    InvalidLine(u8),

    /// Operation attempted after the driver was closed
    #[error("port is closed")]
    Closed,

    /// Blocking read aborted by a cancel token
    #[error("operation cancelled")]
    Cancelled,
}
