//! Narrow serial transport seam used by the driver.

use std::io;

use serialport::{ClearBuffer, SerialPort};

/// The capability set the driver needs from a serial connection.
///
/// `Box<dyn SerialPort>` implements this for real hardware; a simulated
/// device can be plugged in through [`crate::DlpIo8::from_transport`].
pub trait Transport: Send {
    /// Write bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Read into `buf`, returning how many bytes arrived. A poll that ends
    /// without data must report `ErrorKind::TimedOut` rather than block
    /// indefinitely; the driver turns repeated timeouts into its own
    /// deadline handling.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Discard any unread bytes waiting in the input buffer.
    fn clear_input(&mut self) -> io::Result<()>;

    /// Discard any unsent bytes waiting in the output buffer.
    fn clear_output(&mut self) -> io::Result<()>;
}

impl Transport for Box<dyn SerialPort> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(self, buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }

    fn clear_output(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Output).map_err(io::Error::from)
    }
}
