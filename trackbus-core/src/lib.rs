//! Board-agnostic receiver for the Control Unit track bus
//!
//! This crate contains everything between the sensed pin and a complete
//! data word, independent of the chip it runs on:
//!
//! - Bit timing classification (SYNC, bit, glitch)
//! - Word assembly between SYNC markers
//! - The interrupt-safe single-slot handoff to readers
//! - Receiver configuration types
//!
//! Platform back-ends implement [`trackbus_hal::EdgeTimer`] and feed edges
//! into [`ControlUnit`]. Words are decoded with `trackbus-protocol`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod assembler;
pub mod config;
pub mod receiver;
pub mod timing;

pub use assembler::WordAssembler;
pub use config::{PinConfig, Pull, ReceiverConfig};
pub use receiver::ControlUnit;
pub use timing::{BitTiming, Classifier, PulseWindow, Symbol, TimingError};

// Re-export so applications need only one dependency for the common path
pub use trackbus_protocol::{Packet, RawWord};
