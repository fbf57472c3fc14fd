use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    ASCII_MODE_CMD, BINARY_MODE_CMD, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS,
};

/// Serial framing for the device link.
///
/// Two configurations are found in the wild for this device: 8-N-1 in the
/// library-style drivers and 7-E-1 in some standalone test tools. Neither is
/// guessed here; the caller picks one explicitly (the crate defaults to
/// 8-N-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framing {
    /// 8 data bits, no parity, one stop bit
    EightNone1,
    /// 7 data bits, even parity, one stop bit
    SevenEven1,
}

impl Framing {
    pub fn data_bits(self) -> serialport::DataBits {
        match self {
            Framing::EightNone1 => serialport::DataBits::Eight,
            Framing::SevenEven1 => serialport::DataBits::Seven,
        }
    }

    pub fn parity(self) -> serialport::Parity {
        match self {
            Framing::EightNone1 => serialport::Parity::None,
            Framing::SevenEven1 => serialport::Parity::Even,
        }
    }

    pub fn stop_bits(self) -> serialport::StopBits {
        serialport::StopBits::One
    }
}

impl Default for Framing {
    fn default() -> Self {
        Framing::EightNone1
    }
}

/// Device reply encoding.
///
/// This is device-side state: the driver selects binary mode during the
/// handshake and does not track the mode afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyMode {
    /// Human-readable ASCII replies
    Ascii,
    /// Raw state byte replies
    Binary,
}

impl ReplyMode {
    /// The control byte that selects this mode.
    pub fn command(self) -> u8 {
        match self {
            ReplyMode::Ascii => ASCII_MODE_CMD,
            ReplyMode::Binary => BINARY_MODE_CMD,
        }
    }
}

/// Serial connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortConfig {
    /// Transmission speed in bits per second
    pub baud_rate: u32,
    /// Data bits, parity and stop bits
    pub framing: Framing,
    /// Overall deadline for each reply read
    pub read_timeout: Duration,
}

impl PortConfig {
    /// Configuration at a specific baud rate, defaults for everything else.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        PortConfig {
            baud_rate,
            ..Default::default()
        }
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        PortConfig {
            baud_rate: DEFAULT_BAUD_RATE,
            framing: Framing::default(),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_maps_to_serial_settings() {
        assert_eq!(Framing::EightNone1.data_bits(), serialport::DataBits::Eight);
        assert_eq!(Framing::EightNone1.parity(), serialport::Parity::None);
        assert_eq!(Framing::SevenEven1.data_bits(), serialport::DataBits::Seven);
        assert_eq!(Framing::SevenEven1.parity(), serialport::Parity::Even);
        assert_eq!(Framing::EightNone1.stop_bits(), serialport::StopBits::One);
        assert_eq!(Framing::SevenEven1.stop_bits(), serialport::StopBits::One);
    }

    #[test]
    fn reply_mode_control_bytes() {
        assert_eq!(ReplyMode::Ascii.command(), 0x60);
        assert_eq!(ReplyMode::Binary.command(), 0x5C);
    }

    #[test]
    fn default_config_is_8n1_at_115200() {
        let cfg = PortConfig::default();
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.framing, Framing::EightNone1);
        assert_eq!(cfg.read_timeout, Duration::from_millis(1000));
    }
}
