//! Protocol constants for DLP-IO8-G communication.
//!
//! This module defines all the constants used in the DLP-IO8-G single-byte
//! command protocol, including command bytes, the per-line command alphabets,
//! and serial port defaults.

/// Handshake probe command (`'`); the device answers with [`PING_ACK`]
pub const PING_CMD: u8 = 0x27;

/// Acknowledge byte returned for a ping (`Q`)
pub const PING_ACK: u8 = 0x51;

/// Switch the device to human-readable ASCII replies
pub const ASCII_MODE_CMD: u8 = 0x60;

/// Switch the device to raw binary state replies
pub const BINARY_MODE_CMD: u8 = 0x5C;

/// Read commands, one per line 1-8; sending all 8 reads every line in one round trip
pub const READ_LINE_CMDS: [u8; 8] = *b"ASDFGHJK";

/// Set (assert) commands, one per line 1-8
pub const SET_LINE_CMDS: [u8; 8] = *b"12345678";

/// Clear (deassert) commands, one per line 1-8
pub const CLEAR_LINE_CMDS: [u8; 8] = *b"QWERTYUI";

/// Number of digital I/O lines on the device
pub const LINE_COUNT: u8 = 8;

/// Reply buffer size; the device never returns more than 8 bytes per request
pub const REPLY_BUFFER_LEN: usize = 8;

/// Default baud rate (115200 bps)
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default overall read deadline in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Transport poll interval in milliseconds; cancellation is checked between polls
pub const READ_POLL_INTERVAL_MS: u64 = 50;
