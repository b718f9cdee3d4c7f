//! Bit timing classification
//!
//! The bus carries one bit in the time between two consecutive edges. A
//! longer interval marks the start of a new word. Anything else is noise.

use trackbus_hal::Edge;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Widest word the assembler can hold
pub const MAX_WORD_BITS: u8 = 16;

/// Errors in a timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// A window's minimum is above its maximum
    EmptyWindow,
    /// A window accepts zero-length intervals
    ZeroWidth,
    /// The BIT_0 and BIT_1 windows share intervals
    OverlappingWindows,
    /// SYNC threshold not above both bit windows
    SyncTooShort,
    /// Word width outside 1..=16
    InvalidWordBits,
}

/// Inclusive range of valid interval lengths in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PulseWindow {
    pub min_us: u32,
    pub max_us: u32,
}

impl PulseWindow {
    /// Create a window
    pub const fn new(min_us: u32, max_us: u32) -> Self {
        Self { min_us, max_us }
    }

    /// Check if an interval falls inside the window
    pub const fn contains(&self, interval_us: u32) -> bool {
        interval_us >= self.min_us && interval_us <= self.max_us
    }

    fn overlaps(&self, other: &PulseWindow) -> bool {
        self.min_us <= other.max_us && other.min_us <= self.max_us
    }
}

/// Protocol timing constants
///
/// These depend on the Control Unit's line timing and must come from its
/// documentation or captured traces; the library ships no defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitTiming {
    /// Intervals read as a 0 bit
    pub bit0: PulseWindow,
    /// Intervals read as a 1 bit
    pub bit1: PulseWindow,
    /// Shortest interval read as SYNC; any longer interval is SYNC too
    pub sync_min_us: u32,
    /// Number of bits in a word (1..=16)
    pub word_bits: u8,
}

impl BitTiming {
    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), TimingError> {
        for window in [&self.bit0, &self.bit1] {
            if window.min_us > window.max_us {
                return Err(TimingError::EmptyWindow);
            }
            if window.min_us == 0 {
                return Err(TimingError::ZeroWidth);
            }
        }

        if self.bit0.overlaps(&self.bit1) {
            return Err(TimingError::OverlappingWindows);
        }

        if self.sync_min_us <= self.bit0.max_us.max(self.bit1.max_us) {
            return Err(TimingError::SyncTooShort);
        }

        if self.word_bits == 0 || self.word_bits > MAX_WORD_BITS {
            return Err(TimingError::InvalidWordBits);
        }

        Ok(())
    }

    /// Classify one inter-edge interval
    pub fn classify(&self, interval_us: u32) -> Symbol {
        if interval_us >= self.sync_min_us {
            Symbol::Sync
        } else if self.bit0.contains(interval_us) {
            Symbol::Bit(false)
        } else if self.bit1.contains(interval_us) {
            Symbol::Bit(true)
        } else {
            Symbol::Glitch
        }
    }
}

/// Meaning of one inter-edge interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    /// Start of a new word
    Sync,
    /// One data bit
    Bit(bool),
    /// Interval outside every valid window
    Glitch,
}

/// Turns timestamped edges into symbols
///
/// Tracks the previous edge's time and direction. Two edges of the same
/// direction in a row mean a transition was lost, which is a glitch
/// whatever the interval.
#[derive(Debug, Clone)]
pub struct Classifier {
    timing: BitTiming,
    last_us: Option<u32>,
    last_edge: Option<Edge>,
}

impl Classifier {
    /// Create a classifier for the given timing
    pub const fn new(timing: BitTiming) -> Self {
        Self {
            timing,
            last_us: None,
            last_edge: None,
        }
    }

    /// Timing in use
    pub fn timing(&self) -> &BitTiming {
        &self.timing
    }

    /// Forget the previous edge
    pub fn reset(&mut self) {
        self.last_us = None;
        self.last_edge = None;
    }

    /// Feed one logical edge
    ///
    /// Returns `None` for the first edge after creation or reset, which
    /// only starts the clock.
    pub fn feed(&mut self, edge: Edge, now_us: u32) -> Option<Symbol> {
        let last_us = self.last_us.replace(now_us);
        let last_edge = self.last_edge.replace(edge);
        let last_us = last_us?;

        if last_edge == Some(edge) {
            return Some(Symbol::Glitch);
        }

        // Counter wraps every ~71 minutes
        Some(self.timing.classify(now_us.wrapping_sub(last_us)))
    }
}
