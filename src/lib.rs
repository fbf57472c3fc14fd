//! # DLP-IO8-G Protocol Library
//!
//! A Rust library for driving the DLP-IO8-G digital I/O module over a serial
//! link. The device exposes 8 TTL lines addressed by single-byte ASCII
//! commands; this crate handles the open/handshake sequence, reply-mode
//! switching, and line read/set/clear operations.
//!
//! ## Features
//!
//! - Handshake-verified open with configurable framing (8-N-1 or 7-E-1)
//! - Read all 8 lines in one round trip, or poll a single line
//! - Assert/deassert any subset of lines via the device's digit/letter alphabets
//! - Explicit read deadlines and a cancellation token for signal-triggered shutdown
//! - Line-change watching with elapsed-time reporting
//!
//! ## Example
//!
//! ```no_run
//! use dlp_io8_protocol::DlpIo8;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut dlp = DlpIo8::open("/dev/ttyUSB0", 115_200)?;
//!     dlp.set_lines("13")?;
//!     let states = dlp.read_lines()?;
//!     println!("Line states: {:02X?}", states);
//!     dlp.unset_lines("13")?;
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;
pub mod monitor;
pub mod protocol;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_device;

pub use error::{DlpError, Result};
pub use monitor::{LineEvent, LineWatcher};
pub use protocol::{clear_sequence, CancelToken, DlpIo8};
pub use transport::Transport;
pub use types::{Framing, PortConfig, ReplyMode};
