//! GPIO configuration shared by all back-ends

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Internal bias applied to an input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pull {
    /// No internal resistor (externally driven line)
    #[default]
    None,
    /// Internal pull-up
    Up,
    /// Internal pull-down
    Down,
}
