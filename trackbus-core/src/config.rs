//! Receiver configuration
//!
//! Selects the sensed pin, its polarity and bias, and the bus timing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use trackbus_hal::Pull;

use crate::timing::{BitTiming, TimingError};

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Input is logically inverted (e.g. sensed through an optocoupler)
    pub inverted: bool,
    /// Internal bias
    pub pull: Pull,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull: Pull::None,
        }
    }

    /// Create an inverted pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull: Pull::None,
        }
    }

    /// Set the pin bias
    pub const fn with_pull(self, pull: Pull) -> Self {
        Self { pull, ..self }
    }

    /// Parse a pin string from config
    ///
    /// Supports formats:
    /// - "gpio2" -> pin 2
    /// - "!gpio2" -> pin 2, inverted
    /// - "^gpio2" -> pin 2, pull-up
    /// - "~gpio2" -> pin 2, pull-down
    ///
    /// Prefixes combine, inversion first ("!^gpio2"). Whether the pin
    /// exists is up to the board.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        let (s, inverted) = match s.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        let (s, pull) = if let Some(rest) = s.strip_prefix('^') {
            (rest, Pull::Up)
        } else if let Some(rest) = s.strip_prefix('~') {
            (rest, Pull::Down)
        } else {
            (s, Pull::None)
        };

        let pin = s.strip_prefix("gpio")?.parse().ok()?;

        Some(Self {
            pin,
            inverted,
            pull,
        })
    }
}

/// Everything needed to construct a receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverConfig {
    /// Sensed input
    pub pin: PinConfig,
    /// Bus timing
    pub timing: BitTiming,
}

impl ReceiverConfig {
    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), TimingError> {
        self.timing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::PulseWindow;

    #[test]
    fn test_pin_config_builders() {
        let pin = PinConfig::new(2);
        assert_eq!(pin.pin, 2);
        assert!(!pin.inverted);
        assert_eq!(pin.pull, Pull::None);

        let pin = PinConfig::inverted(3).with_pull(Pull::Up);
        assert_eq!(pin.pin, 3);
        assert!(pin.inverted);
        assert_eq!(pin.pull, Pull::Up);
    }

    #[test]
    fn test_parse_pin_string() {
        assert_eq!(PinConfig::parse("gpio2"), Some(PinConfig::new(2)));
        assert_eq!(PinConfig::parse(" gpio29 "), Some(PinConfig::new(29)));
        assert_eq!(PinConfig::parse("!gpio12"), Some(PinConfig::inverted(12)));
        assert_eq!(
            PinConfig::parse("^gpio4"),
            Some(PinConfig::new(4).with_pull(Pull::Up))
        );
        assert_eq!(
            PinConfig::parse("!~gpio5"),
            Some(PinConfig::inverted(5).with_pull(Pull::Down))
        );

        // Invalid
        assert_eq!(PinConfig::parse("^!gpio4"), None);
        assert_eq!(PinConfig::parse("pin11"), None);
        assert_eq!(PinConfig::parse("gpio"), None);
        assert_eq!(PinConfig::parse("gpio300"), None);
        assert_eq!(PinConfig::parse(""), None);
    }

    #[test]
    fn test_validate_delegates_to_timing() {
        let mut config = ReceiverConfig {
            pin: PinConfig::new(2),
            timing: BitTiming {
                bit0: PulseWindow::new(40, 60),
                bit1: PulseWindow::new(90, 110),
                sync_min_us: 300,
                word_bits: 13,
            },
        };
        assert_eq!(config.validate(), Ok(()));

        config.timing.sync_min_us = 100;
        assert_eq!(config.validate(), Err(TimingError::SyncTooShort));
    }
}
